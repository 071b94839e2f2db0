//! Saturation around Rec. 709 luma.

use glam::DVec3;

/// Rec. 709 luminance weights.
pub const LUMA_REC709: DVec3 = DVec3::new(0.2126, 0.7152, 0.0722);

/// Rec. 709 luma of a normalized RGB triple.
pub fn luma(rgb: DVec3) -> f64 {
    rgb.dot(LUMA_REC709)
}

/// Scale each channel's distance from luma.
///
/// ```text
/// luma = dot(rgb, rec709_weights)
/// out  = luma + saturation × (rgb − luma)
/// ```
///
/// `saturation = 1.0` is a no-op, `0.0` collapses to grayscale, values above
/// 1 oversaturate and negative values invert the chroma around luma. The
/// result is not clamped.
pub fn apply_saturation(rgb: DVec3, saturation: f64) -> DVec3 {
    if saturation == 1.0 {
        return rgb;
    }

    let luma = DVec3::splat(luma(rgb));
    luma + (rgb - luma) * saturation
}
