//! Shared core of the SharpNeedle bootstrapper.
//!
//! The bootstrapper DLL receives one wide string of the form
//! `assemblyPath*typeName*methodName*payload`, brings up the .NET Framework
//! runtime in the current process and calls the named static method in the
//! default AppDomain. This crate holds everything that does not touch the
//! platform:
//!
//! - [`InvocationRequest`] - the parsed argument string
//! - [`MetaHost`], [`RuntimeInfo`], [`RuntimeHost`] - the hosting API as traits
//! - [`bootstrap`] - the parse → acquire → invoke chain

pub mod bootstrap;
pub mod error;
pub mod request;
pub mod runtime;

pub use bootstrap::bootstrap;
pub use error::{Error, FailureClass, Result};
pub use request::{InvocationRequest, split_fields};
pub use runtime::{HostOf, MetaHost, RuntimeHost, RuntimeInfo, invoke, start_runtime};

/// Separator between fields of the argument string (`*` as a UTF-16 unit).
pub const ARGUMENT_DELIMITER: u16 = b'*' as u16;

/// Number of fields a request needs; extra fields are ignored.
pub const REQUIRED_FIELDS: usize = 4;

/// Runtime version the entry point asks for.
pub const DEFAULT_RUNTIME_VERSION: &str = "v4.0.30319";
