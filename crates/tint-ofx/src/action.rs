//! Lifecycle actions and the entry point that dispatches them.
//!
//! Dispatch is a flat table from action name to handler. No state is kept
//! between calls; each action gets everything it needs through its handle and
//! in-args.

use std::fmt;

use tint_core::RenderError;

use crate::error::{OfxError, OfxStatus};
use crate::host::{EffectDescriptor, ImageEffectHost};
use crate::keys::action;
use crate::plugin;
use crate::property::PropertySet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Load,
    Unload,
    Describe,
    DescribeInContext,
    CreateInstance,
    DestroyInstance,
    BeginInstanceChanged,
    InstanceChanged,
    EndInstanceChanged,
    BeginInstanceEdit,
    EndInstanceEdit,
    PurgeCaches,
    SyncPrivateData,
    Render,
    GetRegionOfDefinition,
    GetRegionsOfInterest,
    GetClipPreferences,
    IsIdentity,
}

impl Action {
    pub const ALL: [Action; 18] = [
        Self::Load,
        Self::Unload,
        Self::Describe,
        Self::DescribeInContext,
        Self::CreateInstance,
        Self::DestroyInstance,
        Self::BeginInstanceChanged,
        Self::InstanceChanged,
        Self::EndInstanceChanged,
        Self::BeginInstanceEdit,
        Self::EndInstanceEdit,
        Self::PurgeCaches,
        Self::SyncPrivateData,
        Self::Render,
        Self::GetRegionOfDefinition,
        Self::GetRegionsOfInterest,
        Self::GetClipPreferences,
        Self::IsIdentity,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Load => action::LOAD,
            Self::Unload => action::UNLOAD,
            Self::Describe => action::DESCRIBE,
            Self::DescribeInContext => action::DESCRIBE_IN_CONTEXT,
            Self::CreateInstance => action::CREATE_INSTANCE,
            Self::DestroyInstance => action::DESTROY_INSTANCE,
            Self::BeginInstanceChanged => action::BEGIN_INSTANCE_CHANGED,
            Self::InstanceChanged => action::INSTANCE_CHANGED,
            Self::EndInstanceChanged => action::END_INSTANCE_CHANGED,
            Self::BeginInstanceEdit => action::BEGIN_INSTANCE_EDIT,
            Self::EndInstanceEdit => action::END_INSTANCE_EDIT,
            Self::PurgeCaches => action::PURGE_CACHES,
            Self::SyncPrivateData => action::SYNC_PRIVATE_DATA,
            Self::Render => action::RENDER,
            Self::GetRegionOfDefinition => action::GET_REGION_OF_DEFINITION,
            Self::GetRegionsOfInterest => action::GET_REGIONS_OF_INTEREST,
            Self::GetClipPreferences => action::GET_CLIP_PREFERENCES,
            Self::IsIdentity => action::IS_IDENTITY,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The object an action is invoked on.
pub enum EffectHandle<'a> {
    /// Plugin-wide actions (load, unload).
    None,
    /// Describe actions fill in a descriptor.
    Descriptor(&'a mut EffectDescriptor),
    /// Instance actions talk to the host that owns the instance.
    Instance(&'a dyn ImageEffectHost),
}

impl<'a> EffectHandle<'a> {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::None => "null",
            Self::Descriptor(_) => "descriptor",
            Self::Instance(_) => "instance",
        }
    }

    fn bad(&self, action: Action) -> OfxError {
        OfxError::BadHandle {
            action: action.name(),
            handle: self.kind(),
        }
    }

    fn expect_none(self, action: Action) -> Result<(), OfxError> {
        match self {
            Self::None => Ok(()),
            other => Err(other.bad(action)),
        }
    }

    fn descriptor(self, action: Action) -> Result<&'a mut EffectDescriptor, OfxError> {
        match self {
            Self::Descriptor(d) => Ok(d),
            other => Err(other.bad(action)),
        }
    }

    fn instance(self, action: Action) -> Result<&'a dyn ImageEffectHost, OfxError> {
        match self {
            Self::Instance(host) => Ok(host),
            other => Err(other.bad(action)),
        }
    }
}

fn required_args(action: Action, in_args: Option<&PropertySet>) -> Result<&PropertySet, OfxError> {
    in_args.ok_or_else(|| OfxError::InvalidArgument(format!("{action} needs in-args")))
}

/// Entry point for every action a host sends.
///
/// Unknown action names are answered with `ReplyDefault` so the host falls
/// back to its own behaviour.
pub fn main_entry(name: &str, handle: EffectHandle<'_>, in_args: Option<&PropertySet>) -> OfxStatus {
    let Some(action) = Action::from_name(name) else {
        tracing::warn!("unhandled action {name:?}");
        return OfxStatus::ReplyDefault;
    };

    match dispatch(action, handle, in_args) {
        Ok(status) => status,
        Err(OfxError::Render(err @ RenderError::Aborted { .. })) => {
            tracing::warn!("{action}: {err}");
            OfxStatus::Failed
        }
        Err(err) => {
            let status = err.status();
            tracing::error!("{action} failed with {status:?}: {err}");
            status
        }
    }
}

/// Run `action` with a typed action value.
pub fn dispatch(
    action: Action,
    handle: EffectHandle<'_>,
    in_args: Option<&PropertySet>,
) -> Result<OfxStatus, OfxError> {
    match action {
        Action::Load => {
            handle.expect_none(action)?;
            plugin::load()
        }
        Action::Unload => {
            handle.expect_none(action)?;
            plugin::unload()
        }
        Action::Describe => plugin::describe(handle.descriptor(action)?),
        Action::DescribeInContext => {
            let descriptor = handle.descriptor(action)?;
            plugin::describe_in_context(descriptor, required_args(action, in_args)?)
        }
        Action::CreateInstance => plugin::create_instance(handle.instance(action)?),
        Action::DestroyInstance => plugin::destroy_instance(handle.instance(action)?),
        Action::InstanceChanged => {
            let host = handle.instance(action)?;
            plugin::instance_changed(host, required_args(action, in_args)?)
        }
        Action::Render => {
            let host = handle.instance(action)?;
            plugin::render(host, required_args(action, in_args)?)
        }
        Action::GetRegionOfDefinition | Action::GetRegionsOfInterest | Action::IsIdentity => {
            handle.instance(action)?;
            Ok(OfxStatus::ReplyDefault)
        }
        Action::GetClipPreferences
        | Action::BeginInstanceChanged
        | Action::EndInstanceChanged
        | Action::BeginInstanceEdit
        | Action::EndInstanceEdit
        | Action::PurgeCaches
        | Action::SyncPrivateData => {
            handle.instance(action)?;
            Ok(OfxStatus::Ok)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names_round_trip() {
        for action in Action::ALL {
            assert_eq!(Action::from_name(action.name()), Some(action));
        }
        assert_eq!(Action::from_name("OfxActionFrobnicate"), None);
    }

    #[test]
    fn test_unknown_action_replies_default() {
        assert_eq!(
            main_entry("OfxActionFrobnicate", EffectHandle::None, None),
            OfxStatus::ReplyDefault
        );
    }

    #[test]
    fn test_load_and_unload_are_ok() {
        assert_eq!(main_entry(action::LOAD, EffectHandle::None, None), OfxStatus::Ok);
        assert_eq!(main_entry(action::UNLOAD, EffectHandle::None, None), OfxStatus::Ok);
    }

    #[test]
    fn test_wrong_handle_is_bad_handle() {
        assert_eq!(
            main_entry(action::DESCRIBE, EffectHandle::None, None),
            OfxStatus::BadHandle
        );
        assert_eq!(
            main_entry(action::RENDER, EffectHandle::None, None),
            OfxStatus::BadHandle
        );
        let mut descriptor = EffectDescriptor::new();
        assert_eq!(
            main_entry(action::LOAD, EffectHandle::Descriptor(&mut descriptor), None),
            OfxStatus::BadHandle
        );
        assert_eq!(
            main_entry(
                action::IS_IDENTITY,
                EffectHandle::Descriptor(&mut descriptor),
                None
            ),
            OfxStatus::BadHandle
        );
    }

    #[test]
    fn test_describe_in_context_needs_args() {
        let mut descriptor = EffectDescriptor::new();
        assert_eq!(
            main_entry(
                action::DESCRIBE_IN_CONTEXT,
                EffectHandle::Descriptor(&mut descriptor),
                None
            ),
            OfxStatus::BadValue
        );
    }
}
