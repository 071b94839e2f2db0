//! Runtime configuration for the `tint` command.

use tint_core::BitDepth;

/// Log filter used when neither `RUST_LOG` nor `--verbose` is given.
const DEFAULT_LOG_FILTER: &str = "info";

/// Settings that can come from the environment before flags are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Working depth for the render. `None` keeps the depth the input decoded to.
    pub depth: Option<BitDepth>,
    /// `tracing` filter directive.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            depth: std::env::var("TINT_DEPTH")
                .ok()
                .and_then(|s| parse_depth(&s).ok()),
            log_filter: std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        }
    }
}

/// Parse a depth given in bits per component: `8`, `16` or `32`.
pub fn parse_depth(s: &str) -> Result<BitDepth, String> {
    match s.trim() {
        "8" => Ok(BitDepth::U8),
        "16" => Ok(BitDepth::U16),
        "32" | "32f" => Ok(BitDepth::F32),
        other => Err(format!("unsupported depth {other:?}, expected 8, 16 or 32")),
    }
}

/// Depth an image decoded to, mapped onto the depths the effect renders.
pub fn native_depth(color: image::ColorType) -> BitDepth {
    match color {
        image::ColorType::L16
        | image::ColorType::La16
        | image::ColorType::Rgb16
        | image::ColorType::Rgba16 => BitDepth::U16,
        image::ColorType::Rgb32F | image::ColorType::Rgba32F => BitDepth::F32,
        _ => BitDepth::U8,
    }
}
