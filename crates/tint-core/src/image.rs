//! Pixel storage descriptors for host-owned image memory.
//!
//! Images are always 4 interleaved components (R, G, B, A). The memory itself
//! belongs to the host; [`PixelBuffer`] only describes where it lives and how
//! to address a pixel inside it.
//!
//! Row strides must be strictly positive. Vertically flipped buffers (negative
//! row bytes, as some hosts hand out) are rejected at construction.
#![allow(unsafe_code)]

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Components per pixel. Fixed RGBA layout.
pub const COMPONENTS: usize = 4;

/// Per-component storage representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitDepth {
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 16-bit floating point. Hosts may advertise it; the kernel has no
    /// instantiation for it.
    F16,
    /// 32-bit floating point.
    F32,
}

impl BitDepth {
    /// Bytes used by one component.
    pub const fn bytes_per_component(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 | Self::F16 => 2,
            Self::F32 => 4,
        }
    }

    /// Bytes used by one RGBA pixel.
    pub const fn bytes_per_pixel(self) -> usize {
        self.bytes_per_component() * COMPONENTS
    }

    /// Normalization divisor: the stored value that represents 1.0.
    pub const fn max_value(self) -> f64 {
        match self {
            Self::U8 => 255.0,
            Self::U16 => 65535.0,
            Self::F16 | Self::F32 => 1.0,
        }
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8 => write!(f, "8-bit"),
            Self::U16 => write!(f, "16-bit"),
            Self::F16 => write!(f, "16-bit float"),
            Self::F32 => write!(f, "32-bit float"),
        }
    }
}

/// Integer pixel rectangle, `x1`/`y1` inclusive and `x2`/`y2` exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build from the `[x1, y1, x2, y2]` order hosts use on the wire.
    pub const fn from_array(v: [i32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }

    pub const fn to_array(self) -> [i32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Corners are ordered (`x1 <= x2`, `y1 <= y2`). Empty rectangles are well formed.
    pub const fn is_well_formed(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    pub const fn width(&self) -> u32 {
        self.x2.abs_diff(self.x1)
    }

    pub const fn height(&self) -> u32 {
        self.y2.abs_diff(self.y1)
    }

    pub const fn is_empty(&self) -> bool {
        self.x1 >= self.x2 || self.y1 >= self.y2
    }

    /// `other` lies entirely inside `self`.
    pub const fn contains(&self, other: &Rect) -> bool {
        other.x1 >= self.x1 && other.y1 >= self.y1 && other.x2 <= self.x2 && other.y2 <= self.y2
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})-({}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Non-owning view over a strided RGBA region in host memory.
///
/// The view never reads or writes on its own; it only computes addresses.
/// Callers check the render window against [`PixelBuffer::bounds`] once per
/// request, after which [`PixelBuffer::address`] is used unchecked per pixel.
#[derive(Debug)]
pub struct PixelBuffer<'a> {
    base: NonNull<u8>,
    bounds: Rect,
    row_bytes: usize,
    depth: BitDepth,
    _memory: PhantomData<&'a mut [u8]>,
}

impl<'a> PixelBuffer<'a> {
    /// Describe host memory starting at `base`.
    ///
    /// # Safety
    ///
    /// `base` must point to at least `row_bytes * (height - 1) + width * bytes_per_pixel`
    /// bytes that stay valid, and are not accessed through other references,
    /// for `'a`.
    pub unsafe fn from_raw_parts(
        base: *mut u8,
        bounds: Rect,
        row_bytes: i64,
        depth: BitDepth,
    ) -> Result<Self, RenderError> {
        let row_bytes = validate_geometry(bounds, row_bytes, depth)?;
        let base = NonNull::new(base)
            .ok_or_else(|| RenderError::InvalidArgument("image data pointer is null".into()))?;
        Ok(Self {
            base,
            bounds,
            row_bytes,
            depth,
            _memory: PhantomData,
        })
    }

    /// Describe a byte slice the caller owns.
    pub fn from_bytes(
        bytes: &'a mut [u8],
        bounds: Rect,
        row_bytes: i64,
        depth: BitDepth,
    ) -> Result<Self, RenderError> {
        let stride = validate_geometry(bounds, row_bytes, depth)?;
        let needed = required_len(bounds, stride, depth);
        if bytes.len() < needed {
            return Err(RenderError::InvalidArgument(format!(
                "buffer holds {} bytes, {bounds} at stride {stride} needs {needed}",
                bytes.len()
            )));
        }
        // SAFETY: the slice is exclusively borrowed for 'a and covers every
        // addressable pixel, checked just above.
        unsafe { Self::from_raw_parts(bytes.as_mut_ptr(), bounds, row_bytes, depth) }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.depth
    }

    /// Address of the first component of pixel `(x, y)`.
    ///
    /// Only meaningful for coordinates inside [`PixelBuffer::bounds`]; this is
    /// not checked here.
    #[inline]
    pub fn address(&self, x: i32, y: i32) -> *mut u8 {
        let row = (y as isize - self.bounds.y1 as isize) * self.row_bytes as isize;
        let col = (x as isize - self.bounds.x1 as isize) * self.depth.bytes_per_pixel() as isize;
        self.base.as_ptr().wrapping_offset(row + col)
    }
}

/// Checks the bounds and that each row fits in a positive stride. Returns the stride as `usize`.
fn validate_geometry(bounds: Rect, row_bytes: i64, depth: BitDepth) -> Result<usize, RenderError> {
    if !bounds.is_well_formed() {
        return Err(RenderError::InvalidArgument(format!(
            "image bounds {bounds} are not well formed"
        )));
    }
    if row_bytes <= 0 {
        return Err(RenderError::InvalidArgument(format!(
            "row bytes must be positive, got {row_bytes}"
        )));
    }
    let row_bytes = usize::try_from(row_bytes)
        .map_err(|_| RenderError::InvalidArgument(format!("row bytes {row_bytes} overflow")))?;
    let packed = bounds.width() as usize * depth.bytes_per_pixel();
    if row_bytes < packed {
        return Err(RenderError::InvalidArgument(format!(
            "row bytes {row_bytes} smaller than {packed} bytes of {depth} pixels"
        )));
    }
    Ok(row_bytes)
}

fn required_len(bounds: Rect, row_bytes: usize, depth: BitDepth) -> usize {
    if bounds.is_empty() {
        return 0;
    }
    row_bytes * (bounds.height() as usize - 1) + bounds.width() as usize * depth.bytes_per_pixel()
}
