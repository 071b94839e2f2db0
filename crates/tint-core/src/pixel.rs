//! Storage types for a single color component.
//!
//! Each supported [`BitDepth`] has exactly one [`Component`] implementation.
//! The grading math never sees these types: it works on normalized `f64`
//! values and only the load/store edges differ per depth.
//!
//! Integer depths round half to even when converting back from the
//! normalized domain (`0.5 / 255` lands on 0, `1.5 / 255` on 2). Hosts
//! disagree on this; Tint keeps the rule fixed for every integer depth.
#![allow(unsafe_code)]

use crate::image::BitDepth;

/// One stored component of an RGBA pixel.
pub trait Component: bytemuck::Pod {
    /// Depth tag this type stores.
    const BIT_DEPTH: BitDepth;
    /// Stored value representing normalized 1.0.
    const MAX_VALUE: f64;

    /// Normalize to the `[0, 1]` domain (values outside stay outside).
    fn normalize(self) -> f64;

    /// Convert a normalized value already clamped to `[0, 1]` back to storage.
    fn denormalize(value: f64) -> Self;

    /// Read one RGBA pixel.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `4 * size_of::<Self>()` bytes.
    #[inline]
    unsafe fn load(ptr: *const u8) -> [Self; 4] {
        // SAFETY: caller guarantees the range is readable; unaligned reads
        // tolerate hosts that hand out odd row strides.
        unsafe { ptr.cast::<[Self; 4]>().read_unaligned() }
    }

    /// Write one RGBA pixel.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for writes of `4 * size_of::<Self>()` bytes.
    #[inline]
    unsafe fn store(ptr: *mut u8, pixel: [Self; 4]) {
        // SAFETY: caller guarantees the range is writable.
        unsafe { ptr.cast::<[Self; 4]>().write_unaligned(pixel) }
    }
}

impl Component for u8 {
    const BIT_DEPTH: BitDepth = BitDepth::U8;
    const MAX_VALUE: f64 = 255.0;

    #[inline]
    fn normalize(self) -> f64 {
        f64::from(self) / Self::MAX_VALUE
    }

    #[inline]
    fn denormalize(value: f64) -> Self {
        (value * Self::MAX_VALUE).round_ties_even() as u8
    }
}

impl Component for u16 {
    const BIT_DEPTH: BitDepth = BitDepth::U16;
    const MAX_VALUE: f64 = 65535.0;

    #[inline]
    fn normalize(self) -> f64 {
        f64::from(self) / Self::MAX_VALUE
    }

    #[inline]
    fn denormalize(value: f64) -> Self {
        (value * Self::MAX_VALUE).round_ties_even() as u16
    }
}

impl Component for f32 {
    const BIT_DEPTH: BitDepth = BitDepth::F32;
    const MAX_VALUE: f64 = 1.0;

    #[inline]
    fn normalize(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn denormalize(value: f64) -> Self {
        value as f32
    }
}
