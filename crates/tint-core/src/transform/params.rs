//! Parameter struct that defines the whole color-correct transform.
//!
//! `ColorCorrectParams` is the resolved, time-independent form of the
//! effect's controls. The host boundary samples each control at the render
//! time and fills one of these in; the kernel only ever reads it.

use serde::{Deserialize, Serialize};

/// Resolved control values for one render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorCorrectParams {
    /// Scalar gain applied to R, G and B after the per-channel gain. 1.0 = neutral.
    pub gain: f64,
    /// Power applied to each color channel. 1.0 = neutral.
    pub gamma: f64,
    /// Distance from Rec. 709 luma. 1.0 = neutral, 0.0 = grayscale.
    pub saturation: f64,
    /// Per-channel gain `[R, G, B]`. Default: `[1, 1, 1]`.
    pub rgb_gain: [f64; 3],
}

impl ColorCorrectParams {
    /// Every control sits at its neutral value.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for ColorCorrectParams {
    /// Produces an identity (no-op) transform.
    fn default() -> Self {
        Self {
            gain: 1.0,
            gamma: 1.0,
            saturation: 1.0,
            rgb_gain: [1.0, 1.0, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        assert!(ColorCorrectParams::default().is_identity());
        let params = ColorCorrectParams {
            gamma: 2.0,
            ..Default::default()
        };
        assert!(!params.is_identity());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let params: ColorCorrectParams =
            serde_json::from_str(r#"{ "gain": 2.0, "rgb_gain": [1.0, 0.5, 1.0] }"#)
                .expect("valid grade json");
        assert_eq!(params.gain, 2.0);
        assert_eq!(params.gamma, 1.0);
        assert_eq!(params.saturation, 1.0);
        assert_eq!(params.rgb_gain, [1.0, 0.5, 1.0]);
    }
}
