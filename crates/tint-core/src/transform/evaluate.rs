//! Transform evaluation: applies the color-correct chain to one pixel.

use glam::DVec3;

use crate::grading::primaries::{apply_gain, apply_gamma};
use crate::grading::saturation::apply_saturation;
use crate::pixel::Component;
use crate::transform::params::ColorCorrectParams;

/// Applies the chain to a normalized RGBA pixel, clamped to `[0, 1]`:
/// 1. Per-channel RGB gain, then scalar gain
/// 2. Gamma (negative bases clamped to zero)
/// 3. Saturation around Rec. 709 luma
/// 4. Clamp
///
/// Alpha only goes through the clamp.
pub fn evaluate_transform(rgba: [f64; 4], params: &ColorCorrectParams) -> [f64; 4] {
    let mut rgb = DVec3::new(rgba[0], rgba[1], rgba[2]);

    rgb = apply_gain(rgb, DVec3::from_array(params.rgb_gain), params.gain);
    rgb = apply_gamma(rgb, params.gamma);
    rgb = apply_saturation(rgb, params.saturation);

    [rgb.x, rgb.y, rgb.z, rgba[3]].map(clamp_unit)
}

/// Clamp to `[0, 1]`. NaN becomes 0.
#[inline]
fn clamp_unit(c: f64) -> f64 {
    c.max(0.0).min(1.0)
}

/// Same chain on a stored pixel: normalize, evaluate, denormalize.
///
/// This is the only place the storage type appears, so every bit depth runs
/// exactly the same normalized-domain math.
#[inline]
pub fn process_pixel<C: Component>(pixel: [C; 4], params: &ColorCorrectParams) -> [C; 4] {
    let normalized = pixel.map(Component::normalize);
    evaluate_transform(normalized, params).map(C::denormalize)
}
