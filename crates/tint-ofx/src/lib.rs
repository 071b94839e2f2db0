//! Tint OFX: host boundary for the color-correct effect.
//!
//! Everything the host and the effect exchange travels through typed
//! [`PropertySet`]s. Hosts call [`main_entry`] with an action name and an
//! [`EffectHandle`]; instance actions reach the host only through the
//! [`ImageEffectHost`] passed in with the handle.

pub mod action;
pub mod error;
pub mod host;
pub mod image;
pub mod keys;
pub mod param;
pub mod plugin;
pub mod property;
pub mod schema;
pub mod standalone;

// Re-exports for convenience.
pub use action::{Action, EffectHandle, dispatch, main_entry};
pub use error::{OfxError, OfxStatus};
pub use host::{ClipImage, EffectDescriptor, HostAbort, ImageEffectHost};
pub use image::ImageLayout;
pub use param::{ParamBinding, ParamDescriptor, ParamKind, ParamSet, ParamValue};
pub use plugin::{PluginInfo, plugin, plugin_count, resolve_params};
pub use property::{PropertyElement, PropertySet, PropertyType, PropertyValue, RawPointer};
pub use standalone::{HostImage, StandaloneHost};
