//! Property schemas for every object that crosses the host boundary.
//!
//! Each builder declares the full key set an object carries, with its
//! dimension and default, so later reads and writes never need to define keys
//! on the fly.

use tint_core::{BitDepth, Rect};

use crate::image::depth_name;
use crate::keys::{change, clip, effect, image, object, param, prop};
use crate::param::ParamKind;
use crate::property::{PropertySet, PropertyType, PropertyValue, RawPointer};

/// Slots reserved for list properties such as supported contexts or depths.
pub const LIST_SLOTS: usize = 4;

fn entry(key: &'static str, value: impl Into<PropertyValue>) -> (&'static str, PropertyValue) {
    (key, value.into())
}

fn string_list(key: &'static str) -> (&'static str, PropertyValue) {
    (key, PropertyValue::zeroed(PropertyType::String, LIST_SLOTS))
}

/// Effect descriptor written by `describe`.
pub fn effect_descriptor() -> PropertySet {
    PropertySet::from_schema([
        entry(prop::TYPE, object::IMAGE_EFFECT),
        entry(prop::LABEL, ""),
        entry(prop::SHORT_LABEL, ""),
        entry(prop::LONG_LABEL, ""),
        entry(prop::VERSION, [0, 0]),
        entry(prop::VERSION_LABEL, ""),
        entry(prop::PLUGIN_DESCRIPTION, ""),
        entry(effect::GROUPING, ""),
        string_list(effect::SUPPORTED_CONTEXTS),
        string_list(effect::SUPPORTED_PIXEL_DEPTHS),
        entry(effect::SUPPORTS_TILES, true),
        entry(effect::SUPPORTS_MULTI_RESOLUTION, true),
        entry(effect::SUPPORTS_MULTIPLE_CLIP_DEPTHS, false),
        entry(effect::TEMPORAL_CLIP_ACCESS, false),
        entry(effect::RENDER_THREAD_SAFETY, effect::RENDER_INSTANCE_SAFE),
    ])
}

/// Properties of a live effect instance.
pub fn effect_instance(context: &str, label: &str) -> PropertySet {
    PropertySet::from_schema([
        entry(prop::TYPE, object::IMAGE_EFFECT_INSTANCE),
        entry(prop::LABEL, label),
        entry(effect::CONTEXT, context),
    ])
}

/// Clip descriptor created by `define_clip`.
pub fn clip_descriptor(name: &str) -> PropertySet {
    PropertySet::from_schema([
        entry(prop::TYPE, object::CLIP),
        entry(prop::NAME, name),
        entry(prop::LABEL, name),
        string_list(clip::SUPPORTED_COMPONENTS),
        entry(clip::OPTIONAL, false),
    ])
}

/// Parameter descriptor for `kind`. Range keys exist only for ranged kinds.
pub fn param_descriptor(name: &str, kind: ParamKind) -> PropertySet {
    let n = kind.dimension();
    let mut schema = vec![
        entry(prop::TYPE, object::PARAMETER),
        entry(prop::NAME, name),
        entry(prop::LABEL, name),
        entry(param::SCRIPT_NAME, name),
        entry(param::TYPE, kind.ofx_name()),
        entry(param::HINT, ""),
        entry(param::ANIMATES, kind != ParamKind::String),
        (param::DEFAULT, PropertyValue::zeroed(kind.value_type(), n)),
    ];
    if kind.is_ranged() {
        let (min, max) = match kind.value_type() {
            PropertyType::Double => (
                PropertyValue::Double(vec![f64::MIN; n]),
                PropertyValue::Double(vec![f64::MAX; n]),
            ),
            _ => (
                PropertyValue::Int(vec![i32::MIN; n]),
                PropertyValue::Int(vec![i32::MAX; n]),
            ),
        };
        schema.push((param::MIN, min.clone()));
        schema.push((param::MAX, max.clone()));
        schema.push((param::DISPLAY_MIN, min));
        schema.push((param::DISPLAY_MAX, max));
    }

    PropertySet::from_schema(schema)
}

/// In-args of `describe-in-context`.
pub fn describe_in_context_args(context: &str) -> PropertySet {
    PropertySet::from_schema([entry(effect::CONTEXT, context)])
}

/// In-args of `render`.
pub fn render_args(time: f64, window: Rect) -> PropertySet {
    PropertySet::from_schema([
        entry(prop::TIME, time),
        entry(effect::RENDER_WINDOW, window.to_array()),
        entry(effect::RENDER_SCALE, [1.0, 1.0]),
    ])
}

/// In-args of `instance-changed` for a parameter edited by the user.
pub fn param_changed_args(name: &str, time: f64) -> PropertySet {
    PropertySet::from_schema([
        entry(prop::TYPE, object::PARAMETER),
        entry(prop::NAME, name),
        entry(change::REASON, change::USER_EDITED),
        entry(prop::TIME, time),
    ])
}

/// Property set of an image handed out by a clip.
pub fn image_instance(data: RawPointer, bounds: Rect, row_bytes: i32, depth: BitDepth) -> PropertySet {
    PropertySet::from_schema([
        entry(prop::TYPE, object::IMAGE),
        entry(image::DATA, data),
        entry(image::BOUNDS, bounds.to_array()),
        entry(image::ROW_BYTES, row_bytes),
        entry(effect::PIXEL_DEPTH, depth_name(depth)),
        entry(effect::COMPONENTS, image::COMPONENT_RGBA),
    ])
}
