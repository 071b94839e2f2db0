//! An in-process host that owns its image memory and holds constant
//! parameter values. It drives the effect through the same entry point a real
//! host would, which lets the CLI and the tests run the plugin end to end.
#![allow(unsafe_code)]

use std::collections::BTreeMap;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;
use tint_core::{BitDepth, ColorCorrectParams, Rect};

use crate::action::{EffectHandle, main_entry};
use crate::error::OfxError;
use crate::host::{EffectDescriptor, ImageEffectHost};
use crate::keys::{action, object, prop};
use crate::param::ParamValue;
use crate::plugin::{PARAM_GAIN, PARAM_GAMMA, PARAM_RGB_GAIN, PARAM_SATURATION};
use crate::property::{PropertySet, RawPointer};
use crate::schema;

/// Host-owned RGBA pixel memory for one clip.
#[derive(Debug)]
pub struct HostImage {
    data: NonNull<[u8]>,
    bounds: Rect,
    row_bytes: usize,
    depth: BitDepth,
}

// SAFETY: `HostImage` uniquely owns its allocation, like a `Box<[u8]>`.
unsafe impl Send for HostImage {}

impl HostImage {
    /// Zero-filled image with tightly packed rows.
    pub fn new(bounds: Rect, depth: BitDepth) -> Result<Self, OfxError> {
        let row_bytes = bounds.width() as usize * depth.bytes_per_pixel();
        let len = row_bytes * bounds.height() as usize;
        Self::from_bytes(vec![0; len], bounds, row_bytes, depth)
    }

    /// Take ownership of `bytes`, laid out as `bounds.height()` rows of `row_bytes`.
    pub fn from_bytes(
        bytes: Vec<u8>,
        bounds: Rect,
        row_bytes: usize,
        depth: BitDepth,
    ) -> Result<Self, OfxError> {
        if !bounds.is_well_formed() || bounds.is_empty() {
            return Err(OfxError::InvalidArgument(format!(
                "image bounds {bounds} are empty or inverted"
            )));
        }
        let packed = bounds.width() as usize * depth.bytes_per_pixel();
        if row_bytes < packed || i32::try_from(row_bytes).is_err() {
            return Err(OfxError::InvalidArgument(format!(
                "row bytes {row_bytes} do not fit {packed} bytes of {depth} pixels"
            )));
        }
        let needed = row_bytes * bounds.height() as usize;
        if bytes.len() != needed {
            return Err(OfxError::InvalidArgument(format!(
                "{} bytes given, {bounds} at stride {row_bytes} needs {needed}",
                bytes.len()
            )));
        }

        let data = NonNull::from(Box::leak(bytes.into_boxed_slice()));
        Ok(Self {
            data,
            bounds,
            row_bytes,
            depth,
        })
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

    pub fn bytes(&self) -> &[u8] {
        // SAFETY: the allocation is owned by `self` and live; writes only
        // happen through pointers handed to the plugin while the owning host
        // is shared, never while this borrow exists.
        unsafe { self.data.as_ref() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        let this = std::mem::ManuallyDrop::new(self);
        // SAFETY: `data` came from `Box::leak` in `from_bytes`, and `this`
        // will not run `Drop`, so ownership moves back exactly once.
        unsafe { Box::from_raw(this.data.as_ptr()) }.into_vec()
    }

    fn properties(&self) -> PropertySet {
        schema::image_instance(
            RawPointer::new(self.data.as_ptr().cast::<u8>()),
            self.bounds,
            self.row_bytes as i32,
            self.depth,
        )
    }
}

impl Drop for HostImage {
    fn drop(&mut self) {
        // SAFETY: `data` came from `Box::leak` in `from_bytes` and is freed
        // only here.
        drop(unsafe { Box::from_raw(self.data.as_ptr()) });
    }
}

/// A minimal host for one effect instance.
pub struct StandaloneHost {
    descriptor: EffectDescriptor,
    instance: PropertySet,
    values: RwLock<BTreeMap<String, ParamValue>>,
    images: BTreeMap<String, HostImage>,
    aborted: AtomicBool,
    outstanding: AtomicUsize,
}

impl StandaloneHost {
    /// Load the plugin and describe it in `context`.
    pub fn describe(context: &str) -> Result<Self, OfxError> {
        main_entry(action::LOAD, EffectHandle::None, None).check(action::LOAD)?;

        let mut descriptor = EffectDescriptor::new();
        main_entry(action::DESCRIBE, EffectHandle::Descriptor(&mut descriptor), None)
            .check(action::DESCRIBE)?;

        let args = schema::describe_in_context_args(context);
        main_entry(
            action::DESCRIBE_IN_CONTEXT,
            EffectHandle::Descriptor(&mut descriptor),
            Some(&args),
        )
        .check(action::DESCRIBE_IN_CONTEXT)?;

        Self::new(descriptor, context)
    }

    /// Host for an already described effect. Parameter values start at their
    /// declared defaults.
    pub fn new(descriptor: EffectDescriptor, context: &str) -> Result<Self, OfxError> {
        let values = descriptor
            .params()
            .iter()
            .map(|p| Ok((p.name().to_owned(), p.default_value()?)))
            .collect::<Result<BTreeMap<_, _>, OfxError>>()?;
        let label = descriptor.properties().get_str(prop::LABEL, 0)?.to_owned();

        Ok(Self {
            instance: schema::effect_instance(context, &label),
            descriptor,
            values: RwLock::new(values),
            images: BTreeMap::new(),
            aborted: AtomicBool::new(false),
            outstanding: AtomicUsize::new(0),
        })
    }

    pub fn descriptor(&self) -> &EffectDescriptor {
        &self.descriptor
    }

    /// Replace the constant value of parameter `name`.
    pub fn set_param(&self, name: &str, value: ParamValue) -> Result<(), OfxError> {
        let kind = self.descriptor.params().get(name)?.kind();
        if !value.fits(kind) {
            return Err(OfxError::ParamKindMismatch {
                name: name.to_owned(),
                kind: kind.ofx_name(),
                requested: "a value of another kind",
            });
        }
        self.values.write().insert(name.to_owned(), value);
        Ok(())
    }

    /// Set all four color controls at once.
    pub fn set_grade(&self, params: &ColorCorrectParams) -> Result<(), OfxError> {
        self.set_param(PARAM_GAIN, ParamValue::Double(params.gain))?;
        self.set_param(PARAM_GAMMA, ParamValue::Double(params.gamma))?;
        self.set_param(PARAM_SATURATION, ParamValue::Double(params.saturation))?;
        self.set_param(PARAM_RGB_GAIN, ParamValue::Double3D(params.rgb_gain))
    }

    /// Connect `image` to a declared clip, returning the image it replaces.
    pub fn attach_image(&mut self, clip: &str, image: HostImage) -> Result<Option<HostImage>, OfxError> {
        self.descriptor.clip(clip)?;
        Ok(self.images.insert(clip.to_owned(), image))
    }

    pub fn image(&mut self, clip: &str) -> Option<&HostImage> {
        self.images.get(clip)
    }

    pub fn take_image(&mut self, clip: &str) -> Option<HostImage> {
        self.images.remove(clip)
    }

    pub fn request_abort(&self) {
        self.aborted.store(true, Ordering::Relaxed);
    }

    pub fn clear_abort(&self) {
        self.aborted.store(false, Ordering::Relaxed);
    }

    /// Images fetched and not yet released.
    pub fn outstanding_images(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    pub fn create_instance(&self) -> Result<(), OfxError> {
        main_entry(action::CREATE_INSTANCE, EffectHandle::Instance(self), None)
            .check(action::CREATE_INSTANCE)
    }

    /// Tell the instance that parameter `name` was edited.
    pub fn param_changed(&self, name: &str, time: f64) -> Result<(), OfxError> {
        let args = schema::param_changed_args(name, time);
        main_entry(action::INSTANCE_CHANGED, EffectHandle::Instance(self), Some(&args))
            .check(action::INSTANCE_CHANGED)
    }

    pub fn render(&self, time: f64, window: Rect) -> Result<(), OfxError> {
        let args = schema::render_args(time, window);
        main_entry(action::RENDER, EffectHandle::Instance(self), Some(&args)).check(action::RENDER)
    }

    pub fn destroy_instance(&self) -> Result<(), OfxError> {
        main_entry(action::DESTROY_INSTANCE, EffectHandle::Instance(self), None)
            .check(action::DESTROY_INSTANCE)
    }

    pub fn unload(&self) -> Result<(), OfxError> {
        main_entry(action::UNLOAD, EffectHandle::None, None).check(action::UNLOAD)
    }
}

// SAFETY: image sets describe `HostImage` allocations owned by `self.images`.
// Those images cannot be replaced or taken while a shared borrow of the host is
// held by an action. Their bytes are only reachable through `&mut self`
// otherwise.
unsafe impl ImageEffectHost for StandaloneHost {
    fn effect_properties(&self) -> &PropertySet {
        &self.instance
    }

    fn clip_properties(&self, clip: &str) -> Result<&PropertySet, OfxError> {
        self.descriptor.clip(clip)
    }

    fn param_properties(&self, name: &str) -> Result<&PropertySet, OfxError> {
        Ok(self.descriptor.params().get(name)?.properties())
    }

    fn param_value_at_time(&self, name: &str, _time: f64) -> Result<ParamValue, OfxError> {
        self.values
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| OfxError::not_found(name))
    }

    fn clip_get_image(&self, clip: &str, _time: f64) -> Result<PropertySet, OfxError> {
        self.descriptor.clip(clip)?;
        let image = self
            .images
            .get(clip)
            .ok_or_else(|| OfxError::HostFailure(format!("no image attached to clip {clip:?}")))?;
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        Ok(image.properties())
    }

    fn clip_release_image(&self, image: PropertySet) -> Result<(), OfxError> {
        if image.get_str(prop::TYPE, 0)? != object::IMAGE {
            return Err(OfxError::InvalidArgument("released set is not an image".into()));
        }
        self.outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .map(|_| ())
            .map_err(|_| OfxError::HostFailure("image released twice".into()))
    }

    fn abort(&self) -> bool {
        self.aborted.load(Ordering::Relaxed)
    }
}
