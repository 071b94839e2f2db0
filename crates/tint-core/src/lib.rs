//! Tint Core: domain layer for the color-correct effect.
//!
//! This crate contains the grading math, the bit-depth generic pixel kernel,
//! host-memory pixel buffer descriptors and render coordination. No host or
//! plugin-API dependencies.

pub mod error;
pub mod grading;
pub mod image;
pub mod pixel;
pub mod render;
pub mod transform;

// Re-exports for convenience.
pub use error::RenderError;
pub use image::{BitDepth, PixelBuffer, Rect};
pub use pixel::Component;
pub use render::{AbortSignal, NeverAbort, RenderRequest, render};
pub use transform::evaluate::{evaluate_transform, process_pixel};
pub use transform::params::ColorCorrectParams;
