//! Reading image instances handed out by the host.

use tint_core::{BitDepth, Rect};

use crate::error::OfxError;
use crate::keys::{effect, image};
use crate::property::{PropertySet, RawPointer};

/// Depth string for `depth`.
pub const fn depth_name(depth: BitDepth) -> &'static str {
    match depth {
        BitDepth::U8 => image::DEPTH_BYTE,
        BitDepth::U16 => image::DEPTH_SHORT,
        BitDepth::F16 => image::DEPTH_HALF,
        BitDepth::F32 => image::DEPTH_FLOAT,
    }
}

/// Parse a depth string. `OfxBitDepthNone` and unknown names are unsupported.
pub fn depth_from_name(name: &str) -> Result<BitDepth, OfxError> {
    match name {
        image::DEPTH_BYTE => Ok(BitDepth::U8),
        image::DEPTH_SHORT => Ok(BitDepth::U16),
        image::DEPTH_HALF => Ok(BitDepth::F16),
        image::DEPTH_FLOAT => Ok(BitDepth::F32),
        other => Err(OfxError::Unsupported(format!("pixel depth {other:?}"))),
    }
}

/// Buffer description read from an image's property set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageLayout {
    pub data: RawPointer,
    pub bounds: Rect,
    pub row_bytes: i64,
    pub depth: BitDepth,
}

impl ImageLayout {
    /// Read data pointer, bounds, stride and depth. Only RGBA images are accepted.
    pub fn from_properties(props: &PropertySet) -> Result<Self, OfxError> {
        let components = props.get_str(effect::COMPONENTS, 0)?;
        if components != image::COMPONENT_RGBA {
            return Err(OfxError::Unsupported(format!(
                "image components {components:?}, only RGBA is processed"
            )));
        }

        Ok(Self {
            data: props.get(image::DATA, 0)?,
            bounds: Rect::from_array(props.get_array(image::BOUNDS)?),
            row_bytes: i64::from(props.get::<i32>(image::ROW_BYTES, 0)?),
            depth: depth_from_name(props.get_str(effect::PIXEL_DEPTH, 0)?)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    #[test]
    fn test_depth_names_round_trip() {
        for depth in [BitDepth::U8, BitDepth::U16, BitDepth::F16, BitDepth::F32] {
            assert_eq!(depth_from_name(depth_name(depth)).unwrap(), depth);
        }
        assert!(matches!(
            depth_from_name(image::DEPTH_NONE),
            Err(OfxError::Unsupported(_))
        ));
    }

    #[test]
    fn test_layout_from_image_properties() {
        let props = schema::image_instance(
            RawPointer::null(),
            Rect::new(-4, 2, 12, 10),
            256,
            BitDepth::F32,
        );
        let layout = ImageLayout::from_properties(&props).unwrap();
        assert_eq!(layout.bounds, Rect::new(-4, 2, 12, 10));
        assert_eq!(layout.row_bytes, 256);
        assert_eq!(layout.depth, BitDepth::F32);
    }

    #[test]
    fn test_non_rgba_image_is_unsupported() {
        let mut props =
            schema::image_instance(RawPointer::null(), Rect::new(0, 0, 2, 2), 32, BitDepth::U8);
        props
            .set_str(effect::COMPONENTS, 0, image::COMPONENT_ALPHA)
            .unwrap();
        assert!(matches!(
            ImageLayout::from_properties(&props),
            Err(OfxError::Unsupported(_))
        ));
    }
}
