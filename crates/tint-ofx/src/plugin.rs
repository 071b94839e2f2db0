//! The color-correct effect: identity, declared clips and parameters, and the
//! action handlers the dispatcher calls.

use tint_core::{ColorCorrectParams, Rect, RenderRequest};

use crate::error::{OfxError, OfxStatus};
use crate::host::{ClipImage, EffectDescriptor, HostAbort, ImageEffectHost};
use crate::image::depth_name;
use crate::keys::{clip, effect, image, object, prop};
use crate::param::{ParamBinding, ParamKind, ParamValue};
use crate::property::PropertySet;

pub const PLUGIN_API: &str = "OfxImageEffectPluginAPI";
pub const PLUGIN_API_VERSION: i32 = 1;
pub const PLUGIN_IDENTIFIER: &str = "com.example.ofx.ColorCorrection";
pub const PLUGIN_VERSION_MAJOR: u32 = 1;
pub const PLUGIN_VERSION_MINOR: u32 = 0;
pub const PLUGIN_LABEL: &str = "ColorCorrection";
pub const PLUGIN_GROUPING: &str = "Color";
pub const PLUGIN_DESCRIPTION: &str = "Basic color correction with gain, gamma, and saturation controls";

pub const PARAM_GAIN: &str = "gain";
pub const PARAM_GAMMA: &str = "gamma";
pub const PARAM_SATURATION: &str = "saturation";
pub const PARAM_RGB_GAIN: &str = "rgbGain";

/// Static parameter declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub hint: &'static str,
    pub kind: ParamKind,
    pub default: ParamValue,
    pub range: (f64, f64),
    pub display_range: (f64, f64),
}

/// Controls declared in `describe-in-context`, in UI order.
pub const PARAMS: [ParamSpec; 4] = [
    ParamSpec {
        name: PARAM_GAIN,
        label: "Gain",
        hint: "Multiplies the image intensity",
        kind: ParamKind::Double,
        default: ParamValue::Double(1.0),
        range: (0.0, 4.0),
        display_range: (0.0, 2.0),
    },
    ParamSpec {
        name: PARAM_GAMMA,
        label: "Gamma",
        hint: "Applies gamma correction",
        kind: ParamKind::Double,
        default: ParamValue::Double(1.0),
        range: (0.1, 4.0),
        display_range: (0.2, 3.0),
    },
    ParamSpec {
        name: PARAM_SATURATION,
        label: "Saturation",
        hint: "Adjusts color saturation",
        kind: ParamKind::Double,
        default: ParamValue::Double(1.0),
        range: (0.0, 4.0),
        display_range: (0.0, 2.0),
    },
    ParamSpec {
        name: PARAM_RGB_GAIN,
        label: "RGB Gain",
        hint: "Individual gain for Red, Green, Blue channels",
        kind: ParamKind::Rgb,
        default: ParamValue::Double3D([1.0, 1.0, 1.0]),
        range: (0.0, 4.0),
        display_range: (0.0, 2.0),
    },
];

/// Registration record a host reads before loading the plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginInfo {
    pub api: &'static str,
    pub api_version: i32,
    pub identifier: &'static str,
    pub version_major: u32,
    pub version_minor: u32,
}

static PLUGINS: [PluginInfo; 1] = [PluginInfo {
    api: PLUGIN_API,
    api_version: PLUGIN_API_VERSION,
    identifier: PLUGIN_IDENTIFIER,
    version_major: PLUGIN_VERSION_MAJOR,
    version_minor: PLUGIN_VERSION_MINOR,
}];

/// Number of effects in this binary.
pub fn plugin_count() -> usize {
    PLUGINS.len()
}

/// Registration record of effect `nth`, if there is one.
pub fn plugin(nth: usize) -> Option<&'static PluginInfo> {
    PLUGINS.get(nth)
}

pub(crate) fn load() -> Result<OfxStatus, OfxError> {
    tracing::info!("loaded {PLUGIN_IDENTIFIER} v{PLUGIN_VERSION_MAJOR}.{PLUGIN_VERSION_MINOR}");
    Ok(OfxStatus::Ok)
}

pub(crate) fn unload() -> Result<OfxStatus, OfxError> {
    tracing::debug!("unloaded {PLUGIN_IDENTIFIER}");
    Ok(OfxStatus::Ok)
}

pub(crate) fn describe(descriptor: &mut EffectDescriptor) -> Result<OfxStatus, OfxError> {
    let props = descriptor.properties_mut();
    props.set_str(prop::LABEL, 0, PLUGIN_LABEL)?;
    props.set_str(prop::SHORT_LABEL, 0, PLUGIN_LABEL)?;
    props.set_str(prop::LONG_LABEL, 0, PLUGIN_LABEL)?;
    props.set_n::<i32>(
        prop::VERSION,
        &[PLUGIN_VERSION_MAJOR as i32, PLUGIN_VERSION_MINOR as i32],
    )?;
    props.set_str(
        prop::VERSION_LABEL,
        0,
        &format!("{PLUGIN_VERSION_MAJOR}.{PLUGIN_VERSION_MINOR}"),
    )?;
    props.set_str(effect::GROUPING, 0, PLUGIN_GROUPING)?;
    props.set_str(prop::PLUGIN_DESCRIPTION, 0, PLUGIN_DESCRIPTION)?;

    props.set_str(effect::SUPPORTED_CONTEXTS, 0, effect::CONTEXT_FILTER)?;
    let depths = [
        tint_core::BitDepth::U8,
        tint_core::BitDepth::U16,
        tint_core::BitDepth::F32,
    ];
    for (slot, depth) in depths.into_iter().enumerate() {
        props.set_str(effect::SUPPORTED_PIXEL_DEPTHS, slot, depth_name(depth))?;
    }

    props.set_bool(effect::SUPPORTS_TILES, 0, true)?;
    props.set_bool(effect::SUPPORTS_MULTI_RESOLUTION, 0, true)?;
    props.set_bool(effect::TEMPORAL_CLIP_ACCESS, 0, false)?;
    props.set_str(effect::RENDER_THREAD_SAFETY, 0, effect::RENDER_FULLY_SAFE)?;

    tracing::info!("described {PLUGIN_LABEL} ({PLUGIN_GROUPING})");
    Ok(OfxStatus::Ok)
}

pub(crate) fn describe_in_context(
    descriptor: &mut EffectDescriptor,
    in_args: &PropertySet,
) -> Result<OfxStatus, OfxError> {
    let context = in_args.get_str(effect::CONTEXT, 0)?;
    if context != effect::CONTEXT_FILTER {
        return Err(OfxError::Unsupported(format!("context {context:?}")));
    }

    for name in [clip::SOURCE, clip::OUTPUT] {
        let clip_props = descriptor.define_clip(name)?;
        clip_props.set_str(clip::SUPPORTED_COMPONENTS, 0, image::COMPONENT_RGBA)?;
    }

    let params = descriptor.params_mut();
    for spec in PARAMS {
        let param = params.define(spec.name, spec.kind)?;
        param.set_label(spec.label)?;
        param.set_hint(spec.hint)?;
        param.set_default(spec.default)?;
        param.set_range(spec.range.0, spec.range.1)?;
        param.set_display_range(spec.display_range.0, spec.display_range.1)?;
        param.set_animates(true)?;
    }

    tracing::info!(
        "described {PLUGIN_LABEL} in {context}: {} clips, {} params",
        descriptor.clip_names().count(),
        descriptor.params().len()
    );
    Ok(OfxStatus::Ok)
}

pub(crate) fn create_instance(host: &dyn ImageEffectHost) -> Result<OfxStatus, OfxError> {
    for name in [clip::SOURCE, clip::OUTPUT] {
        host.clip_properties(name)?;
    }
    for spec in &PARAMS {
        let binding = ParamBinding::fetch(host, spec.name)?;
        if binding.kind() != spec.kind {
            return Err(OfxError::ParamKindMismatch {
                name: spec.name.to_owned(),
                kind: binding.kind().ofx_name(),
                requested: spec.kind.ofx_name(),
            });
        }
    }
    let context = host.effect_properties().get_str(effect::CONTEXT, 0)?;
    tracing::info!("created {PLUGIN_LABEL} instance in {context}");
    Ok(OfxStatus::Ok)
}

pub(crate) fn destroy_instance(_host: &dyn ImageEffectHost) -> Result<OfxStatus, OfxError> {
    tracing::debug!("destroyed {PLUGIN_LABEL} instance");
    Ok(OfxStatus::Ok)
}

pub(crate) fn instance_changed(
    host: &dyn ImageEffectHost,
    in_args: &PropertySet,
) -> Result<OfxStatus, OfxError> {
    let kind = in_args.get_str(prop::TYPE, 0)?;
    let name = in_args.get_str(prop::NAME, 0)?;
    if kind == object::PARAMETER {
        let time = in_args.get::<f64>(prop::TIME, 0)?;
        let value = ParamBinding::fetch(host, name)?.value_at_time(time)?;
        tracing::debug!("parameter {name:?} changed to {value:?} at t={time}");
    } else {
        tracing::debug!("{kind} {name:?} changed");
    }
    Ok(OfxStatus::Ok)
}

/// Sample every control at `time`.
pub fn resolve_params(host: &dyn ImageEffectHost, time: f64) -> Result<ColorCorrectParams, OfxError> {
    Ok(ColorCorrectParams {
        gain: ParamBinding::fetch(host, PARAM_GAIN)?.double_at(time)?,
        gamma: ParamBinding::fetch(host, PARAM_GAMMA)?.double_at(time)?,
        saturation: ParamBinding::fetch(host, PARAM_SATURATION)?.double_at(time)?,
        rgb_gain: ParamBinding::fetch(host, PARAM_RGB_GAIN)?.rgb_at(time)?,
    })
}

pub(crate) fn render(host: &dyn ImageEffectHost, in_args: &PropertySet) -> Result<OfxStatus, OfxError> {
    let time = in_args.get::<f64>(prop::TIME, 0)?;
    let window = Rect::from_array(in_args.get_array(effect::RENDER_WINDOW)?);
    let params = resolve_params(host, time)?;

    let source = ClipImage::fetch(host, clip::SOURCE, time)?;
    let output = ClipImage::fetch(host, clip::OUTPUT, time)?;

    let mut request = RenderRequest {
        window,
        time,
        params,
        source: source.pixel_buffer()?,
        destination: output.pixel_buffer()?,
    };
    tint_core::render(&mut request, &HostAbort(host))?;
    Ok(OfxStatus::Ok)
}
