use tint_core::RenderError;

use crate::property::PropertyType;

/// Status codes returned across the host boundary.
///
/// Numeric values match the OpenFX core header so they can be handed to a
/// C host unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum OfxStatus {
    Ok = 0,
    Failed = 1,
    FatalError = 2,
    Unsupported = 5,
    BadHandle = 7,
    OutOfMemory = 8,
    BadValue = 9,
    ReplyDefault = 12,
    BadIndex = 13,
}

impl OfxStatus {
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok | Self::ReplyDefault)
    }

    /// `Err` unless the status is `Ok` or `ReplyDefault`.
    pub fn check(self, action: &str) -> Result<(), OfxError> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(OfxError::ActionFailed {
                action: action.to_owned(),
                status: self,
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OfxError {
    #[error("no property, parameter or clip named {key:?}")]
    NotFound { key: String },
    #[error("{key:?} holds {found} values, {expected} requested")]
    TypeMismatch {
        key: String,
        expected: PropertyType,
        found: PropertyType,
    },
    #[error("parameter {name:?} is {kind}, not {requested}")]
    ParamKindMismatch {
        name: String,
        kind: &'static str,
        requested: &'static str,
    },
    #[error("index {index} out of range for {key:?} (dimension {dimension})")]
    OutOfRange {
        key: String,
        index: usize,
        dimension: usize,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("action {action} called with a {handle} handle")]
    BadHandle {
        action: &'static str,
        handle: &'static str,
    },
    #[error("host failure: {0}")]
    HostFailure(String),
    #[error("{action} returned {status:?}")]
    ActionFailed {
        action: String,
        status: OfxStatus,
    },
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl OfxError {
    pub(crate) fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Boundary status for this error.
    ///
    /// Undefined keys map to `Unsupported` because the closed status set has
    /// no "unknown" code; both kind mismatches map to `BadValue`.
    pub fn status(&self) -> OfxStatus {
        match self {
            Self::NotFound { .. } => OfxStatus::Unsupported,
            Self::TypeMismatch { .. } | Self::ParamKindMismatch { .. } => OfxStatus::BadValue,
            Self::OutOfRange { .. } => OfxStatus::BadIndex,
            Self::InvalidArgument(_) => OfxStatus::BadValue,
            Self::Unsupported(_) => OfxStatus::Unsupported,
            Self::BadHandle { .. } => OfxStatus::BadHandle,
            Self::HostFailure(_) => OfxStatus::Failed,
            Self::ActionFailed { status, .. } => *status,
            Self::Render(err) => match err {
                RenderError::InvalidArgument(_) => OfxStatus::BadValue,
                RenderError::Unsupported(_) => OfxStatus::Unsupported,
                RenderError::Aborted { .. } => OfxStatus::Failed,
            },
        }
    }
}
