//! Gain and gamma adjustments.
//!
//! # Formula
//! For each channel `c` in `{R, G, B}`:
//! ```text
//!   x   = in[c] × rgb_gain[c] × gain
//!   out = pow(max(x, 0), gamma)        (only when gamma ≠ 1)
//! ```
//!
//! ```text
//!   Input ──→ ×RGB Gain ──→ ×Gain ──→ max(0) ──→ ^Gamma ──→ Output
//! ```
//!
//! Gamma is applied as a direct power: `gamma > 1` darkens midtones,
//! `gamma < 1` brightens them.

use glam::DVec3;

/// Apply the per-channel gain, then the scalar gain.
pub fn apply_gain(rgb: DVec3, rgb_gain: DVec3, gain: f64) -> DVec3 {
    rgb * rgb_gain * gain
}

/// Apply gamma as `pow(max(c, 0), gamma)` per channel.
///
/// Negative channels are clamped to zero before the power. This drops their
/// sign on purpose so the power never sees a negative base.
pub fn apply_gamma(rgb: DVec3, gamma: f64) -> DVec3 {
    if gamma == 1.0 {
        return rgb;
    }
    rgb.max(DVec3::ZERO).powf(gamma)
}
