//! Render coordination: validate a request, pick the kernel for its bit
//! depth, and run it over the render window row by row.
#![allow(unsafe_code)]

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::RenderError;
use crate::image::{BitDepth, PixelBuffer, Rect};
use crate::pixel::Component;
use crate::transform::evaluate::process_pixel;
use crate::transform::params::ColorCorrectParams;

/// Everything one render call needs.
#[derive(Debug)]
pub struct RenderRequest<'a> {
    /// Sub-rectangle to process, in the same coordinates as both buffers' bounds.
    pub window: Rect,
    /// Time the parameters were resolved at.
    pub time: f64,
    pub params: ColorCorrectParams,
    pub source: PixelBuffer<'a>,
    pub destination: PixelBuffer<'a>,
}

/// Host-raised cancellation, polled once per row.
pub trait AbortSignal {
    fn is_aborted(&self) -> bool;
}

/// Never aborts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverAbort;

impl AbortSignal for NeverAbort {
    fn is_aborted(&self) -> bool {
        false
    }
}

impl AbortSignal for AtomicBool {
    fn is_aborted(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Check the window against both buffers and that their depths match.
pub fn validate(request: &RenderRequest<'_>) -> Result<(), RenderError> {
    let window = request.window;
    if !window.is_well_formed() {
        return Err(RenderError::InvalidArgument(format!(
            "render window {window} is not well formed"
        )));
    }

    let src_depth = request.source.bit_depth();
    let dst_depth = request.destination.bit_depth();
    if src_depth != dst_depth {
        return Err(RenderError::InvalidArgument(format!(
            "source is {src_depth} but destination is {dst_depth}"
        )));
    }

    for (name, buffer) in [("source", &request.source), ("destination", &request.destination)] {
        if !buffer.bounds().contains(&window) {
            return Err(RenderError::InvalidArgument(format!(
                "render window {window} exceeds {name} bounds {}",
                buffer.bounds()
            )));
        }
    }
    Ok(())
}

/// Process every pixel of the request's window into the destination.
///
/// Returns only after the whole window is written. On error nothing is
/// rolled back; rows already processed keep their new values and the rest of
/// the window is left as it was.
pub fn render(request: &mut RenderRequest<'_>, abort: &dyn AbortSignal) -> Result<(), RenderError> {
    validate(request)?;

    let depth = request.source.bit_depth();
    tracing::debug!(
        "render {} at t={} ({depth}): {:?}",
        request.window,
        request.time,
        request.params
    );

    match depth {
        BitDepth::U8 => process_window::<u8>(request, abort),
        BitDepth::U16 => process_window::<u16>(request, abort),
        BitDepth::F32 => process_window::<f32>(request, abort),
        BitDepth::F16 => Err(RenderError::Unsupported(format!(
            "no kernel for {depth} pixels"
        ))),
    }
}

fn process_window<C: Component>(
    request: &mut RenderRequest<'_>,
    abort: &dyn AbortSignal,
) -> Result<(), RenderError> {
    debug_assert_eq!(request.source.bit_depth(), C::BIT_DEPTH);

    let window = request.window;
    let params = request.params;
    let step = C::BIT_DEPTH.bytes_per_pixel();
    let rows_total = window.height();

    for (rows_done, y) in (window.y1..window.y2).enumerate() {
        if abort.is_aborted() {
            tracing::warn!("render aborted at row {y} of {window}");
            return Err(RenderError::Aborted {
                rows_done: rows_done as u32,
                rows_total,
            });
        }

        let src_row = request.source.address(window.x1, y);
        let dst_row = request.destination.address(window.x1, y);
        for i in 0..window.width() as usize {
            // SAFETY: `validate` checked the window against both buffers'
            // bounds, and each buffer's constructor guarantees every pixel
            // inside its bounds is addressable. Source and destination may
            // alias; each pixel is fully read before it is written.
            unsafe {
                let pixel = C::load(src_row.add(i * step));
                C::store(dst_row.add(i * step), process_pixel(pixel, &params));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Aborts once it has been polled more than `limit` times.
    struct AbortAfter {
        polls: Cell<u32>,
        limit: u32,
    }

    impl AbortSignal for AbortAfter {
        fn is_aborted(&self) -> bool {
            self.polls.set(self.polls.get() + 1);
            self.polls.get() > self.limit
        }
    }

    fn gradient_u8(width: usize, height: usize) -> Vec<u8> {
        let mut v = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            for x in 0..width {
                v.extend_from_slice(&[(x * 40) as u8, (y * 60) as u8, 128, 200]);
            }
        }
        v
    }

    #[test]
    fn test_identity_render_copies_source_u8() {
        let mut src = gradient_u8(4, 3);
        let expected = src.clone();
        let mut dst = vec![0u8; src.len()];
        let bounds = Rect::new(0, 0, 4, 3);
        let mut request = RenderRequest {
            window: bounds,
            time: 0.0,
            params: ColorCorrectParams::default(),
            source: PixelBuffer::from_bytes(&mut src, bounds, 16, BitDepth::U8).unwrap(),
            destination: PixelBuffer::from_bytes(&mut dst, bounds, 16, BitDepth::U8).unwrap(),
        };
        render(&mut request, &NeverAbort).unwrap();
        assert_eq!(dst, expected);
    }

    #[test]
    fn test_only_window_is_written() {
        let mut src = vec![100u8; 4 * 4 * 4];
        let mut dst = vec![7u8; 4 * 4 * 4];
        let bounds = Rect::new(0, 0, 4, 4);
        let mut request = RenderRequest {
            window: Rect::new(1, 1, 3, 2),
            time: 0.0,
            params: ColorCorrectParams {
                gain: 2.0,
                ..Default::default()
            },
            source: PixelBuffer::from_bytes(&mut src, bounds, 16, BitDepth::U8).unwrap(),
            destination: PixelBuffer::from_bytes(&mut dst, bounds, 16, BitDepth::U8).unwrap(),
        };
        render(&mut request, &NeverAbort).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                let px = &dst[(y * 4 + x) * 4..][..4];
                if y == 1 && (1..3).contains(&x) {
                    assert_eq!(px, &[200, 200, 200, 100], "pixel ({x}, {y})");
                } else {
                    assert_eq!(px, &[7, 7, 7, 7], "pixel ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_offset_bounds_and_padded_stride_u16() {
        // Source at origin (10, 10), destination at (8, 9); window shared.
        let mut src = vec![0u16; 24 * 4];
        let mut dst = vec![0u16; 24 * 4];
        for (i, v) in src.iter_mut().enumerate() {
            *v = i as u16 * 600;
        }
        let src_bounds = Rect::new(10, 10, 12, 13);
        let dst_bounds = Rect::new(8, 9, 12, 13);
        let mut request = RenderRequest {
            window: Rect::new(10, 11, 12, 13),
            time: 0.0,
            params: ColorCorrectParams::default(),
            source: PixelBuffer::from_bytes(bytemuck::cast_slice_mut(&mut src), src_bounds, 32, BitDepth::U16)
                .unwrap(),
            destination: PixelBuffer::from_bytes(bytemuck::cast_slice_mut(&mut dst), dst_bounds, 32, BitDepth::U16)
                .unwrap(),
        };
        render(&mut request, &NeverAbort).unwrap();

        // Source row 1 (y = 11) starts 32 bytes = 16 components in.
        let src_px = &src[16..20];
        // Destination (10, 11): row 2, column 2 → 2 * 16 + 2 * 4 components.
        let dst_px = &dst[40..44];
        assert_eq!(src_px, dst_px);
    }

    #[test]
    fn test_window_outside_bounds_is_invalid() {
        let mut src = vec![0u8; 16];
        let mut dst = vec![0u8; 16];
        let bounds = Rect::new(0, 0, 2, 2);
        let mut request = RenderRequest {
            window: Rect::new(0, 0, 3, 2),
            time: 0.0,
            params: ColorCorrectParams::default(),
            source: PixelBuffer::from_bytes(&mut src, bounds, 8, BitDepth::U8).unwrap(),
            destination: PixelBuffer::from_bytes(&mut dst, bounds, 8, BitDepth::U8).unwrap(),
        };
        let err = render(&mut request, &NeverAbort).unwrap_err();
        assert!(matches!(err, RenderError::InvalidArgument(_)), "{err}");
    }

    #[test]
    fn test_inverted_window_is_invalid() {
        let mut src = vec![0u8; 16];
        let mut dst = vec![0u8; 16];
        let bounds = Rect::new(0, 0, 2, 2);
        let mut request = RenderRequest {
            window: Rect::new(2, 0, 0, 2),
            time: 0.0,
            params: ColorCorrectParams::default(),
            source: PixelBuffer::from_bytes(&mut src, bounds, 8, BitDepth::U8).unwrap(),
            destination: PixelBuffer::from_bytes(&mut dst, bounds, 8, BitDepth::U8).unwrap(),
        };
        assert!(matches!(
            render(&mut request, &NeverAbort),
            Err(RenderError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_mismatched_depths_are_invalid() {
        let mut src = vec![0u8; 16];
        let mut dst = vec![0u16; 16];
        let bounds = Rect::new(0, 0, 2, 2);
        let mut request = RenderRequest {
            window: bounds,
            time: 0.0,
            params: ColorCorrectParams::default(),
            source: PixelBuffer::from_bytes(&mut src, bounds, 8, BitDepth::U8).unwrap(),
            destination: PixelBuffer::from_bytes(bytemuck::cast_slice_mut(&mut dst), bounds, 16, BitDepth::U16)
                .unwrap(),
        };
        assert!(matches!(
            render(&mut request, &NeverAbort),
            Err(RenderError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_half_float_is_unsupported() {
        let mut src = vec![0u8; 32];
        let mut dst = vec![0u8; 32];
        let bounds = Rect::new(0, 0, 2, 2);
        let mut request = RenderRequest {
            window: bounds,
            time: 0.0,
            params: ColorCorrectParams::default(),
            source: PixelBuffer::from_bytes(&mut src, bounds, 16, BitDepth::F16).unwrap(),
            destination: PixelBuffer::from_bytes(&mut dst, bounds, 16, BitDepth::F16).unwrap(),
        };
        assert!(matches!(
            render(&mut request, &NeverAbort),
            Err(RenderError::Unsupported(_))
        ));
    }

    #[test]
    fn test_abort_is_polled_per_row() {
        let mut src = vec![0.5f32; 3 * 4 * 4];
        let mut dst = vec![-1.0f32; 3 * 4 * 4];
        let bounds = Rect::new(0, 0, 3, 4);
        let abort = AbortAfter {
            polls: Cell::new(0),
            limit: 2,
        };
        let mut request = RenderRequest {
            window: bounds,
            time: 0.0,
            params: ColorCorrectParams::default(),
            source: PixelBuffer::from_bytes(bytemuck::cast_slice_mut(&mut src), bounds, 48, BitDepth::F32)
                .unwrap(),
            destination: PixelBuffer::from_bytes(bytemuck::cast_slice_mut(&mut dst), bounds, 48, BitDepth::F32)
                .unwrap(),
        };
        let err = render(&mut request, &abort).unwrap_err();
        assert_eq!(
            err,
            RenderError::Aborted {
                rows_done: 2,
                rows_total: 4
            }
        );
        assert_eq!(abort.polls.get(), 3, "one poll per row, not per pixel");
        assert!(dst[..24].iter().all(|&v| v == 0.5));
        assert!(dst[24..].iter().all(|&v| v == -1.0));
    }

    #[test]
    fn test_raised_flag_stops_before_first_row() {
        let mut src = vec![200u8; 2 * 2 * 4];
        let mut dst = vec![7u8; 2 * 2 * 4];
        let bounds = Rect::new(0, 0, 2, 2);
        let flag = AtomicBool::new(true);

        let mut run = |flag: &AtomicBool| {
            let mut request = RenderRequest {
                window: bounds,
                time: 0.0,
                params: ColorCorrectParams::default(),
                source: PixelBuffer::from_bytes(&mut src, bounds, 8, BitDepth::U8).unwrap(),
                destination: PixelBuffer::from_bytes(&mut dst, bounds, 8, BitDepth::U8).unwrap(),
            };
            let result = render(&mut request, flag);
            drop(request);
            (result, dst.clone())
        };

        let (result, out) = run(&flag);
        assert_eq!(
            result.unwrap_err(),
            RenderError::Aborted {
                rows_done: 0,
                rows_total: 2
            }
        );
        assert!(out.iter().all(|&v| v == 7), "nothing written after abort");

        flag.store(false, Ordering::Relaxed);
        let (result, out) = run(&flag);
        result.unwrap();
        assert!(out.iter().all(|&v| v == 200));
    }

    #[test]
    fn test_in_place_render() {
        let mut pixels = vec![0.5f32, 0.25, 0.75, 1.0];
        let bounds = Rect::new(0, 0, 1, 1);
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut pixels);
        let ptr = bytes.as_mut_ptr();
        // SAFETY: both views cover the same live 16-byte pixel; the kernel reads
        // the whole pixel before writing it back.
        let (source, destination) = unsafe {
            (
                PixelBuffer::from_raw_parts(ptr, bounds, 16, BitDepth::F32).unwrap(),
                PixelBuffer::from_raw_parts(ptr, bounds, 16, BitDepth::F32).unwrap(),
            )
        };
        let mut request = RenderRequest {
            window: bounds,
            time: 0.0,
            params: ColorCorrectParams {
                gain: 2.0,
                ..Default::default()
            },
            source,
            destination,
        };
        render(&mut request, &NeverAbort).unwrap();
        assert_eq!(pixels, vec![1.0, 0.5, 1.0, 1.0]);
    }
}
