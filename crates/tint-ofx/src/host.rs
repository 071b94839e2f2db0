//! The host context handed to every instance action, plus the objects the
//! plugin fills in while describing itself.
#![allow(unsafe_code)]

use std::collections::BTreeMap;

use serde::Serialize;
use tint_core::{AbortSignal, PixelBuffer};

use crate::error::OfxError;
use crate::image::ImageLayout;
use crate::param::{ParamSet, ParamValue};
use crate::property::PropertySet;
use crate::schema;

/// Services a host provides to a live effect instance.
///
/// Passed explicitly into every instance action; the plugin keeps no global
/// host state.
///
/// # Safety
///
/// The plugin reads and writes pixel memory straight from the properties
/// returned by [`ImageEffectHost::clip_get_image`]. Implementors must make
/// sure that, unless `OfxImagePropData` is null, it points to live memory of
/// at least `row_bytes * (height - 1) + width * bytes_per_pixel` bytes for the
/// bounds, row bytes and pixel depth in the same set. That memory must stay
/// valid, and must not be accessed by anyone else, until the set is passed back
/// to [`ImageEffectHost::clip_release_image`]. The only exception is a source
/// and output clip that share one image, which the render loop allows.
pub unsafe trait ImageEffectHost {
    /// Instance-level properties, including the context it was created in.
    fn effect_properties(&self) -> &PropertySet;

    fn clip_properties(&self, clip: &str) -> Result<&PropertySet, OfxError>;

    /// Static descriptor properties of parameter `name`.
    fn param_properties(&self, name: &str) -> Result<&PropertySet, OfxError>;

    /// Value of parameter `name` resolved by the host at `time`.
    fn param_value_at_time(&self, name: &str, time: f64) -> Result<ParamValue, OfxError>;

    /// Fetch the image of `clip` at `time`. Must be handed back through
    /// [`ImageEffectHost::clip_release_image`]; prefer [`ClipImage`].
    fn clip_get_image(&self, clip: &str, time: f64) -> Result<PropertySet, OfxError>;

    fn clip_release_image(&self, image: PropertySet) -> Result<(), OfxError>;

    /// Whether the host wants the current render to stop.
    fn abort(&self) -> bool;
}

/// A clip image held for the duration of a render. Released on drop.
pub struct ClipImage<'h> {
    host: &'h dyn ImageEffectHost,
    clip: String,
    properties: Option<PropertySet>,
}

impl<'h> ClipImage<'h> {
    pub fn fetch(host: &'h dyn ImageEffectHost, clip: &str, time: f64) -> Result<Self, OfxError> {
        let properties = host.clip_get_image(clip, time)?;
        Ok(Self {
            host,
            clip: clip.to_owned(),
            properties: Some(properties),
        })
    }

    pub fn clip(&self) -> &str {
        &self.clip
    }

    pub fn properties(&self) -> Result<&PropertySet, OfxError> {
        self.properties
            .as_ref()
            .ok_or_else(|| OfxError::HostFailure(format!("image of {:?} already released", self.clip)))
    }

    pub fn layout(&self) -> Result<ImageLayout, OfxError> {
        ImageLayout::from_properties(self.properties()?)
    }

    /// Pixel view of the image memory, valid while the guard is held.
    pub fn pixel_buffer(&self) -> Result<PixelBuffer<'_>, OfxError> {
        let layout = self.layout()?;
        // SAFETY: `ImageEffectHost` implementors guarantee that the memory
        // described by `layout` is live and exclusively ours until the image is
        // released. That happens only when `self` drops, and the returned view
        // borrows `self`.
        let buffer = unsafe {
            PixelBuffer::from_raw_parts(
                layout.data.as_ptr().cast::<u8>(),
                layout.bounds,
                layout.row_bytes,
                layout.depth,
            )
        }?;
        Ok(buffer)
    }
}

impl Drop for ClipImage<'_> {
    fn drop(&mut self) {
        if let Some(properties) = self.properties.take()
            && let Err(err) = self.host.clip_release_image(properties)
        {
            tracing::warn!("releasing image of clip {:?} failed: {err}", self.clip);
        }
    }
}

/// Adapts a host's abort query to the render loop.
pub struct HostAbort<'h>(pub &'h dyn ImageEffectHost);

impl AbortSignal for HostAbort<'_> {
    fn is_aborted(&self) -> bool {
        self.0.abort()
    }
}

/// Everything the plugin declares about itself: effect properties, clips and
/// parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectDescriptor {
    properties: PropertySet,
    clips: BTreeMap<String, PropertySet>,
    params: ParamSet,
}

impl Default for EffectDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectDescriptor {
    pub fn new() -> Self {
        Self {
            properties: schema::effect_descriptor(),
            clips: BTreeMap::new(),
            params: ParamSet::new(),
        }
    }

    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertySet {
        &mut self.properties
    }

    /// Declare a clip and return its property set.
    pub fn define_clip(&mut self, name: &str) -> Result<&mut PropertySet, OfxError> {
        if self.clips.contains_key(name) {
            return Err(OfxError::InvalidArgument(format!(
                "clip {name:?} is already defined"
            )));
        }
        Ok(self
            .clips
            .entry(name.to_owned())
            .or_insert_with(|| schema::clip_descriptor(name)))
    }

    pub fn clip(&self, name: &str) -> Result<&PropertySet, OfxError> {
        self.clips.get(name).ok_or_else(|| OfxError::not_found(name))
    }

    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.clips.keys().map(String::as_str)
    }

    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{EffectHandle, main_entry};
    use crate::error::OfxStatus;
    use crate::keys::{action, clip, effect, prop};
    use crate::property::RawPointer;
    use crate::standalone::{HostImage, StandaloneHost};
    use tint_core::{BitDepth, Rect};

    /// Hands out image sets without pixel memory behind them.
    struct DetachedHost(StandaloneHost);

    // SAFETY: every image set carries a null data pointer, which the plugin
    // rejects before touching memory.
    unsafe impl ImageEffectHost for DetachedHost {
        fn effect_properties(&self) -> &PropertySet {
            self.0.effect_properties()
        }

        fn clip_properties(&self, clip: &str) -> Result<&PropertySet, OfxError> {
            self.0.clip_properties(clip)
        }

        fn param_properties(&self, name: &str) -> Result<&PropertySet, OfxError> {
            self.0.param_properties(name)
        }

        fn param_value_at_time(&self, name: &str, time: f64) -> Result<ParamValue, OfxError> {
            self.0.param_value_at_time(name, time)
        }

        fn clip_get_image(&self, clip: &str, time: f64) -> Result<PropertySet, OfxError> {
            self.0.clip_get_image(clip, time)?;
            Ok(schema::image_instance(
                RawPointer::null(),
                Rect::new(0, 0, 1, 1),
                4,
                BitDepth::U8,
            ))
        }

        fn clip_release_image(&self, image: PropertySet) -> Result<(), OfxError> {
            self.0.clip_release_image(image)
        }

        fn abort(&self) -> bool {
            self.0.abort()
        }
    }

    fn detached() -> DetachedHost {
        let bounds = Rect::new(0, 0, 1, 1);
        let mut host = StandaloneHost::describe(effect::CONTEXT_FILTER).unwrap();
        host.attach_image(clip::SOURCE, HostImage::new(bounds, BitDepth::U8).unwrap())
            .unwrap();
        host.attach_image(clip::OUTPUT, HostImage::new(bounds, BitDepth::U8).unwrap())
            .unwrap();
        DetachedHost(host)
    }

    #[test]
    fn test_null_image_data_is_rejected() {
        let host = detached();
        let image = ClipImage::fetch(&host, clip::SOURCE, 0.0).unwrap();
        assert!(matches!(
            image.pixel_buffer(),
            Err(OfxError::Render(tint_core::RenderError::InvalidArgument(_)))
        ));
        drop(image);
        assert_eq!(host.0.outstanding_images(), 0);
    }

    #[test]
    fn test_render_without_pixel_memory_is_bad_value() {
        let host = detached();
        let args = schema::render_args(0.0, Rect::new(0, 0, 1, 1));
        assert_eq!(
            main_entry(action::RENDER, EffectHandle::Instance(&host), Some(&args)),
            OfxStatus::BadValue
        );
        assert_eq!(host.0.outstanding_images(), 0);
    }

    #[test]
    fn test_clips_are_defined_once() {
        let mut descriptor = EffectDescriptor::new();
        descriptor.define_clip(clip::SOURCE).unwrap();
        descriptor.define_clip(clip::OUTPUT).unwrap();
        assert!(matches!(
            descriptor.define_clip(clip::SOURCE),
            Err(OfxError::InvalidArgument(_))
        ));
        assert_eq!(
            descriptor.clip(clip::OUTPUT).unwrap().get_str(prop::NAME, 0).unwrap(),
            "Output"
        );
        assert!(matches!(
            descriptor.clip("Matte"),
            Err(OfxError::NotFound { .. })
        ));
        let names: Vec<_> = descriptor.clip_names().collect();
        assert_eq!(names, ["Output", "Source"]);
    }
}
