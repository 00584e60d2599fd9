//! Error types for the bootstrapper.
//!
//! Platform failures carry the raw `HRESULT` as `i32` so callers can match on it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Expected at least {min} argument fields, found {found}", min = crate::REQUIRED_FIELDS)]
    MalformedArguments { found: usize },

    #[error("CLR meta host unavailable: {context} failed with {hresult:#010X}")]
    MetaHostUnavailable { context: &'static str, hresult: i32 },

    #[error("Runtime {version} not installed: GetRuntime failed with {hresult:#010X}")]
    RuntimeNotInstalled { version: String, hresult: i32 },

    #[error("Runtime {version} cannot be loaded into this process")]
    RuntimeNotLoadable { version: String },

    #[error("IsLoadable({version}) failed with {hresult:#010X}")]
    LoadabilityCheckFailed { version: String, hresult: i32 },

    #[error("Failed to obtain runtime host: {hresult:#010X}")]
    RuntimeHostUnavailable { hresult: i32 },

    #[error("Failed to start runtime: {hresult:#010X}")]
    StartFailed { hresult: i32 },

    #[error("ExecuteInDefaultAppDomain failed with {hresult:#010X}")]
    InvocationFailed { hresult: i32 },
}

/// Coarse grouping of [`Error`] variants by the stage that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The argument string could not be turned into a request.
    MalformedInput,
    /// Discovering, loading or starting the runtime failed.
    RuntimeAcquisition,
    /// The managed method could not be executed.
    Invocation,
}

impl Error {
    pub fn class(&self) -> FailureClass {
        match self {
            Error::MalformedArguments { .. } => FailureClass::MalformedInput,
            Error::MetaHostUnavailable { .. }
            | Error::RuntimeNotInstalled { .. }
            | Error::RuntimeNotLoadable { .. }
            | Error::LoadabilityCheckFailed { .. }
            | Error::RuntimeHostUnavailable { .. }
            | Error::StartFailed { .. } => FailureClass::RuntimeAcquisition,
            Error::InvocationFailed { .. } => FailureClass::Invocation,
        }
    }

    /// The platform failure code, if this error came from a hosting call.
    pub fn hresult(&self) -> Option<i32> {
        match self {
            Error::MetaHostUnavailable { hresult, .. }
            | Error::RuntimeNotInstalled { hresult, .. }
            | Error::LoadabilityCheckFailed { hresult, .. }
            | Error::RuntimeHostUnavailable { hresult }
            | Error::StartFailed { hresult }
            | Error::InvocationFailed { hresult } => Some(*hresult),
            Error::MalformedArguments { .. } | Error::RuntimeNotLoadable { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
