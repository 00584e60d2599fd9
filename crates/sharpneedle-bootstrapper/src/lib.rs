//! DLL that gets injected into a process to host the .NET Framework CLR.
//!
//! The injector calls [`AdapterEntryPoint`] with a wide string of the form
//! `assemblyPath*typeName*methodName*payload`. The runtime is brought up in
//! the current process and the named static method runs in the default
//! AppDomain. Failures are logged and otherwise swallowed.

#![cfg(windows)]

mod clr;
mod clr_host;

pub use clr::{ClrMetaHost, ClrRuntimeHost, ClrRuntimeInfo};

use log::{debug, error};
use sharpneedle_shared::{DEFAULT_RUNTIME_VERSION, Result, bootstrap};
use std::ffi::c_void;
use windows::core::PCWSTR;

/// DLL entry point for Windows. All work happens in [`AdapterEntryPoint`].
#[unsafe(no_mangle)]
pub unsafe extern "system" fn DllMain(
    _hinst_dll: *mut c_void,
    _fdw_reason: u32,
    _lpv_reserved: *mut c_void,
) -> i32 {
    1 // TRUE
}

/// Exported entry point called by the injector.
///
/// # Safety
/// `adapter_dll_arg` must be null or point to a null-terminated UTF-16 string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn AdapterEntryPoint(adapter_dll_arg: *const u16) {
    let outcome = std::panic::catch_unwind(move || unsafe { run(adapter_dll_arg) });

    match outcome {
        // The exit code has no consumer past this point.
        Ok(Ok(code)) => debug!("Managed entry point returned {}", code),
        Ok(Err(e)) => error!("Aborted ({:?}): {}", e.class(), e),
        Err(_) => error!("Panic while bootstrapping the runtime"),
    }
}

unsafe fn run(adapter_dll_arg: *const u16) -> Result<u32> {
    let input = unsafe { argument_units(adapter_dll_arg) };
    bootstrap(input, DEFAULT_RUNTIME_VERSION, ClrMetaHost::create)
}

/// Borrow the UTF-16 units of the injector's argument, without the null.
///
/// A null pointer reads as an empty string. Units are not validated.
unsafe fn argument_units<'a>(arg: *const u16) -> &'a [u16] {
    if arg.is_null() {
        return &[];
    }
    unsafe { PCWSTR(arg).as_wide() }
}
