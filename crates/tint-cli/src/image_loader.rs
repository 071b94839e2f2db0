//! Moving pictures between disk and host-owned RGBA buffers.
//!
//! Rows are stored in file order (top row first) with packed strides.

use std::path::Path;

use image::{DynamicImage, ImageBuffer, Rgba};
use tint_core::{BitDepth, Rect};
use tint_ofx::{HostImage, OfxError};

/// Decode `path` and convert it to RGBA at `depth`.
///
/// `None` keeps whatever depth the file decodes to.
pub fn load_image(path: &Path, depth: Option<BitDepth>) -> Result<HostImage, ImageLoadError> {
    let img = image::open(path).map_err(ImageLoadError::Decode)?;
    let depth = depth.unwrap_or_else(|| crate::config::native_depth(img.color()));
    tracing::debug!(
        "decoded {} ({}x{}, {:?}) as {depth}",
        path.display(),
        img.width(),
        img.height(),
        img.color()
    );
    to_host_image(&img, depth)
}

/// Convert a decoded image into a host buffer at `depth`.
pub fn to_host_image(img: &DynamicImage, depth: BitDepth) -> Result<HostImage, ImageLoadError> {
    let bounds = bounds_of(img.width(), img.height())?;
    let bytes = match depth {
        BitDepth::U8 => img.to_rgba8().into_raw(),
        BitDepth::U16 => bytemuck::cast_slice::<u16, u8>(&img.to_rgba16().into_raw()).to_vec(),
        BitDepth::F32 => bytemuck::cast_slice::<f32, u8>(&img.to_rgba32f().into_raw()).to_vec(),
        BitDepth::F16 => return Err(ImageLoadError::Depth(depth)),
    };
    let row_bytes = img.width() as usize * depth.bytes_per_pixel();
    Ok(HostImage::from_bytes(bytes, bounds, row_bytes, depth)?)
}

/// Rebuild a decoded image from a rendered host buffer.
pub fn from_host_image(image: &HostImage) -> Result<DynamicImage, ImageLoadError> {
    let bounds = image.bounds();
    let (width, height) = (bounds.width(), bounds.height());
    let packed = bounds.width() as usize * image.bit_depth().bytes_per_pixel();

    // Drop any row padding before handing the samples to `image`.
    let mut bytes = Vec::with_capacity(packed * bounds.height() as usize);
    for row in image.bytes().chunks_exact(image.row_bytes()) {
        bytes.extend_from_slice(&row[..packed]);
    }

    let img = match image.bit_depth() {
        BitDepth::U8 => ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, bytes)
            .map(DynamicImage::ImageRgba8),
        BitDepth::U16 => ImageBuffer::<Rgba<u16>, _>::from_raw(width, height, samples_of(&bytes))
            .map(DynamicImage::ImageRgba16),
        BitDepth::F32 => ImageBuffer::<Rgba<f32>, _>::from_raw(width, height, samples_of(&bytes))
            .map(DynamicImage::ImageRgba32F),
        depth @ BitDepth::F16 => return Err(ImageLoadError::Depth(depth)),
    };
    img.ok_or(ImageLoadError::Size { width, height })
}

/// Encode `img` to `path`, narrowing float data for formats without float support.
pub fn save_image(img: DynamicImage, path: &Path) -> Result<(), ImageLoadError> {
    let format = image::ImageFormat::from_path(path).map_err(ImageLoadError::Encode)?;
    let img = match img {
        DynamicImage::ImageRgba32F(_) if format != image::ImageFormat::OpenExr => {
            tracing::debug!("{format:?} has no float storage, writing 16-bit");
            DynamicImage::ImageRgba16(img.to_rgba16())
        }
        other => other,
    };
    img.save_with_format(path, format).map_err(ImageLoadError::Encode)
}

fn bounds_of(width: u32, height: u32) -> Result<Rect, ImageLoadError> {
    match (i32::try_from(width), i32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok(Rect::new(0, 0, w, h)),
        _ => Err(ImageLoadError::Size { width, height }),
    }
}

fn samples_of<T: bytemuck::Pod>(bytes: &[u8]) -> Vec<T> {
    bytes
        .chunks_exact(size_of::<T>())
        .map(bytemuck::pod_read_unaligned)
        .collect()
}

/// Errors that can occur while loading or saving images.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(image::ImageError),
    #[error("image of {width}x{height} does not fit a pixel rectangle")]
    Size { width: u32, height: u32 },
    #[error("no file representation for {0} pixels")]
    Depth(BitDepth),
    #[error(transparent)]
    Host(#[from] OfxError),
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    fn checker() -> DynamicImage {
        let mut buf = ImageBuffer::<Rgba<u8>, Vec<u8>>::new(2, 2);
        buf.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        buf.put_pixel(1, 0, Rgba([0, 255, 0, 128]));
        buf.put_pixel(0, 1, Rgba([0, 0, 255, 0]));
        buf.put_pixel(1, 1, Rgba([51, 102, 153, 204]));
        DynamicImage::ImageRgba8(buf)
    }

    #[test]
    fn test_u8_host_image_keeps_samples() {
        let host = to_host_image(&checker(), BitDepth::U8).unwrap();
        assert_eq!(host.bounds(), Rect::new(0, 0, 2, 2));
        assert_eq!(host.row_bytes(), 8);
        assert_eq!(&host.bytes()[12..16], &[51, 102, 153, 204]);
    }

    #[test]
    fn test_f32_host_image_is_normalized() {
        let host = to_host_image(&checker(), BitDepth::F32).unwrap();
        let samples: Vec<f32> = samples_of(host.bytes());
        assert_eq!(samples.len(), 16);
        assert!((samples[0] - 1.0).abs() < EPSILON);
        assert!((samples[7] - 128.0 / 255.0).abs() < EPSILON);
        assert!((samples[12] - 0.2).abs() < EPSILON);
    }

    #[test]
    fn test_u16_back_to_dynamic_image() {
        let host = to_host_image(&checker(), BitDepth::U16).unwrap();
        let img = from_host_image(&host).unwrap();
        let DynamicImage::ImageRgba16(buf) = &img else {
            panic!("expected 16-bit RGBA, got {:?}", img.color());
        };
        assert_eq!(buf.get_pixel(1, 0).0, [0, 65535, 0, 32896]);
    }

    #[test]
    fn test_padded_rows_are_repacked() {
        let bytes = vec![
            1, 2, 3, 4, 9, 9, 9, 9, //
            5, 6, 7, 8, 9, 9, 9, 9,
        ];
        let host = HostImage::from_bytes(bytes, Rect::new(0, 0, 1, 2), 8, BitDepth::U8).unwrap();
        let img = from_host_image(&host).unwrap();
        assert_eq!(img.to_rgba8().into_raw(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_half_float_has_no_file_form() {
        assert!(matches!(
            to_host_image(&checker(), BitDepth::F16),
            Err(ImageLoadError::Depth(BitDepth::F16))
        ));
    }
}
