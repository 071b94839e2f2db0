//! Well-known property keys and string values.
//!
//! The strings match the OpenFX headers so property sets can be mirrored to a
//! C host without translation.

/// Object type tags stored under [`prop::TYPE`].
pub mod object {
    pub const IMAGE_EFFECT: &str = "OfxTypeImageEffect";
    pub const IMAGE_EFFECT_INSTANCE: &str = "OfxTypeImageEffectInstance";
    pub const CLIP: &str = "OfxTypeClip";
    pub const IMAGE: &str = "OfxTypeImage";
    pub const PARAMETER: &str = "OfxTypeParameter";
}

/// Generic object properties.
pub mod prop {
    pub const TYPE: &str = "OfxPropType";
    pub const NAME: &str = "OfxPropName";
    pub const LABEL: &str = "OfxPropLabel";
    pub const SHORT_LABEL: &str = "OfxPropShortLabel";
    pub const LONG_LABEL: &str = "OfxPropLongLabel";
    pub const VERSION: &str = "OfxPropVersion";
    pub const VERSION_LABEL: &str = "OfxPropVersionLabel";
    pub const PLUGIN_DESCRIPTION: &str = "OfxPropPluginDescription";
    pub const TIME: &str = "OfxPropTime";
}

/// Image effect descriptor and render in-args.
pub mod effect {
    pub const GROUPING: &str = "OfxImageEffectPluginPropGrouping";
    pub const SUPPORTED_CONTEXTS: &str = "OfxImageEffectPropSupportedContexts";
    pub const SUPPORTED_PIXEL_DEPTHS: &str = "OfxImageEffectPropSupportedPixelDepths";
    pub const SUPPORTS_TILES: &str = "OfxImageEffectPropSupportsTiles";
    pub const SUPPORTS_MULTI_RESOLUTION: &str = "OfxImageEffectPropSupportsMultiResolution";
    pub const SUPPORTS_MULTIPLE_CLIP_DEPTHS: &str = "OfxImageEffectPropSupportsMultipleClipDepths";
    pub const TEMPORAL_CLIP_ACCESS: &str = "OfxImageEffectPropTemporalClipAccess";
    pub const RENDER_THREAD_SAFETY: &str = "OfxImageEffectPropRenderThreadSafety";
    pub const CONTEXT: &str = "OfxImageEffectPropContext";
    pub const PIXEL_DEPTH: &str = "OfxImageEffectPropPixelDepth";
    pub const COMPONENTS: &str = "OfxImageEffectPropComponents";
    pub const RENDER_WINDOW: &str = "OfxImageEffectPropRenderWindow";
    pub const RENDER_SCALE: &str = "OfxImageEffectPropRenderScale";

    pub const CONTEXT_FILTER: &str = "OfxImageEffectContextFilter";
    pub const CONTEXT_GENERAL: &str = "OfxImageEffectContextGeneral";

    pub const RENDER_INSTANCE_SAFE: &str = "OfxImageEffectRenderInstanceSafe";
    pub const RENDER_FULLY_SAFE: &str = "OfxImageEffectRenderFullySafe";
}

/// Clip descriptors.
pub mod clip {
    pub const SUPPORTED_COMPONENTS: &str = "OfxImageClipPropSupportedComponents";
    pub const OPTIONAL: &str = "OfxImageClipPropOptional";

    pub const SOURCE: &str = "Source";
    pub const OUTPUT: &str = "Output";
}

/// Image instances handed out by a clip.
pub mod image {
    pub const DATA: &str = "OfxImagePropData";
    pub const BOUNDS: &str = "OfxImagePropBounds";
    pub const ROW_BYTES: &str = "OfxImagePropRowBytes";

    pub const COMPONENT_RGBA: &str = "OfxImageComponentRGBA";
    pub const COMPONENT_RGB: &str = "OfxImageComponentRGB";
    pub const COMPONENT_ALPHA: &str = "OfxImageComponentAlpha";

    pub const DEPTH_BYTE: &str = "OfxBitDepthByte";
    pub const DEPTH_SHORT: &str = "OfxBitDepthShort";
    pub const DEPTH_HALF: &str = "OfxBitDepthHalf";
    pub const DEPTH_FLOAT: &str = "OfxBitDepthFloat";
    pub const DEPTH_NONE: &str = "OfxBitDepthNone";
}

/// Parameter descriptors.
pub mod param {
    pub const TYPE: &str = "OfxParamPropType";
    pub const SCRIPT_NAME: &str = "OfxParamPropScriptName";
    pub const HINT: &str = "OfxParamPropHint";
    pub const DEFAULT: &str = "OfxParamPropDefault";
    pub const MIN: &str = "OfxParamPropMin";
    pub const MAX: &str = "OfxParamPropMax";
    pub const DISPLAY_MIN: &str = "OfxParamPropDisplayMin";
    pub const DISPLAY_MAX: &str = "OfxParamPropDisplayMax";
    pub const ANIMATES: &str = "OfxParamPropAnimates";

    pub const TYPE_INTEGER: &str = "OfxParamTypeInteger";
    pub const TYPE_DOUBLE: &str = "OfxParamTypeDouble";
    pub const TYPE_BOOLEAN: &str = "OfxParamTypeBoolean";
    pub const TYPE_CHOICE: &str = "OfxParamTypeChoice";
    pub const TYPE_RGB: &str = "OfxParamTypeRGB";
    pub const TYPE_RGBA: &str = "OfxParamTypeRGBA";
    pub const TYPE_DOUBLE_2D: &str = "OfxParamTypeDouble2D";
    pub const TYPE_DOUBLE_3D: &str = "OfxParamTypeDouble3D";
    pub const TYPE_INTEGER_2D: &str = "OfxParamTypeInteger2D";
    pub const TYPE_INTEGER_3D: &str = "OfxParamTypeInteger3D";
    pub const TYPE_STRING: &str = "OfxParamTypeString";
}

/// Lifecycle action names.
pub mod action {
    pub const LOAD: &str = "OfxActionLoad";
    pub const UNLOAD: &str = "OfxActionUnload";
    pub const DESCRIBE: &str = "OfxActionDescribe";
    pub const DESCRIBE_IN_CONTEXT: &str = "OfxActionDescribeInContext";
    pub const CREATE_INSTANCE: &str = "OfxActionCreateInstance";
    pub const DESTROY_INSTANCE: &str = "OfxActionDestroyInstance";
    pub const BEGIN_INSTANCE_CHANGED: &str = "OfxActionBeginInstanceChanged";
    pub const INSTANCE_CHANGED: &str = "OfxActionInstanceChanged";
    pub const END_INSTANCE_CHANGED: &str = "OfxActionEndInstanceChanged";
    pub const BEGIN_INSTANCE_EDIT: &str = "OfxActionBeginInstanceEdit";
    pub const END_INSTANCE_EDIT: &str = "OfxActionEndInstanceEdit";
    pub const PURGE_CACHES: &str = "OfxActionPurgeCaches";
    pub const SYNC_PRIVATE_DATA: &str = "OfxActionSyncPrivateData";
    pub const RENDER: &str = "OfxImageEffectActionRender";
    pub const GET_REGION_OF_DEFINITION: &str = "OfxImageEffectActionGetRegionOfDefinition";
    pub const GET_REGIONS_OF_INTEREST: &str = "OfxImageEffectActionGetRegionsOfInterest";
    pub const GET_CLIP_PREFERENCES: &str = "OfxImageEffectActionGetClipPreferences";
    pub const IS_IDENTITY: &str = "OfxImageEffectActionIsIdentity";
}

/// Instance-changed in-args.
pub mod change {
    pub const REASON: &str = "OfxPropChangeReason";
    pub const USER_EDITED: &str = "OfxChangeUserEdited";
}
