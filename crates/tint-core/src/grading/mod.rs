//! Grading steps in the normalized domain: gain, gamma, saturation.

pub mod primaries;
pub mod saturation;
