//! mscoree-backed implementation of the hosting traits.
//!
//! Each wrapper owns exactly one COM reference and releases it on drop.

use crate::clr_host::*;
use log::debug;
use sharpneedle_shared::{Error, InvocationRequest, MetaHost, Result, RuntimeHost, RuntimeInfo};
use std::ffi::c_void;
use std::ptr::{self, NonNull};
use windows::Win32::Foundation::E_POINTER;
use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};
use windows::core::{HRESULT, PCWSTR, s, w};

/// Owned COM interface pointer.
pub(crate) struct ComPtr<T>(NonNull<T>);

impl<T> ComPtr<T> {
    /// Take ownership of one reference held by `raw`. Returns `None` for null.
    ///
    /// # Safety
    /// `raw` must be null or a live COM interface whose vtable starts with
    /// `IUnknown`, and the caller must not release it separately.
    unsafe fn from_raw(raw: *mut T) -> Option<Self> {
        NonNull::new(raw).map(Self)
    }

    fn as_raw(&self) -> *mut T {
        self.0.as_ptr()
    }
}

impl<T> Drop for ComPtr<T> {
    fn drop(&mut self) {
        unsafe {
            let raw = self.0.as_ptr() as *mut c_void;
            let vtbl = *(raw as *const *const IUnknownVtbl);
            ((*vtbl).release)(raw);
        }
    }
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Copy UTF-16 units into a null-terminated buffer, without re-encoding.
fn null_terminated(units: &[u16]) -> Vec<u16> {
    units.iter().copied().chain(std::iter::once(0)).collect()
}

/// `ICLRRuntimeHost::Start` returns `S_FALSE` when the runtime is already
/// running; any success code counts.
fn start_result(hr: HRESULT) -> Result<()> {
    if hr.is_err() {
        return Err(Error::StartFailed { hresult: hr.0 });
    }
    Ok(())
}

/// `ICLRMetaHost` obtained from `mscoree.dll`.
pub struct ClrMetaHost(ComPtr<ICLRMetaHost>);

impl ClrMetaHost {
    /// Load `mscoree.dll` and create the meta host through `CLRCreateInstance`.
    ///
    /// mscoree stays loaded for the lifetime of the process; the CLR cannot
    /// be unloaded once started.
    pub fn create() -> Result<Self> {
        let mscoree = unsafe { LoadLibraryW(w!("mscoree.dll")) }.map_err(|e| {
            Error::MetaHostUnavailable {
                context: "LoadLibraryW(mscoree.dll)",
                hresult: e.code().0,
            }
        })?;

        let clr_create_instance = unsafe { GetProcAddress(mscoree, s!("CLRCreateInstance")) }
            .ok_or_else(|| Error::MetaHostUnavailable {
                context: "GetProcAddress(CLRCreateInstance)",
                hresult: windows::core::Error::from_win32().code().0,
            })?;
        let clr_create_instance: CLRCreateInstanceFn =
            unsafe { std::mem::transmute(clr_create_instance) };

        let mut meta_host: *mut ICLRMetaHost = ptr::null_mut();
        let hr = unsafe {
            clr_create_instance(
                &CLSID_CLR_META_HOST,
                &IID_ICLR_META_HOST,
                &mut meta_host as *mut _ as *mut *mut c_void,
            )
        };
        let unavailable = |hresult: i32| Error::MetaHostUnavailable {
            context: "CLRCreateInstance",
            hresult,
        };
        if hr.is_err() {
            return Err(unavailable(hr.0));
        }

        unsafe { ComPtr::from_raw(meta_host) }
            .map(Self)
            .ok_or_else(|| unavailable(E_POINTER.0))
    }
}

impl MetaHost for ClrMetaHost {
    type Info = ClrRuntimeInfo;

    fn runtime(&self, version: &str) -> Result<ClrRuntimeInfo> {
        let not_installed = |hresult: i32| Error::RuntimeNotInstalled {
            version: version.to_owned(),
            hresult,
        };

        let version_wide = to_wide(version);
        let this = self.0.as_raw();
        let mut runtime_info: *mut ICLRRuntimeInfo = ptr::null_mut();
        let hr = unsafe {
            ((*(*this).vtbl).get_runtime)(
                this,
                PCWSTR(version_wide.as_ptr()),
                &IID_ICLR_RUNTIME_INFO,
                &mut runtime_info as *mut _ as *mut *mut c_void,
            )
        };
        if hr.is_err() {
            return Err(not_installed(hr.0));
        }

        let inner = unsafe { ComPtr::from_raw(runtime_info) }
            .ok_or_else(|| not_installed(E_POINTER.0))?;
        Ok(ClrRuntimeInfo {
            inner,
            version: version.to_owned(),
        })
    }
}

/// `ICLRRuntimeInfo` for one installed runtime version.
pub struct ClrRuntimeInfo {
    inner: ComPtr<ICLRRuntimeInfo>,
    version: String,
}

impl RuntimeInfo for ClrRuntimeInfo {
    type Host = ClrRuntimeHost;

    fn is_loadable(&self) -> Result<bool> {
        let this = self.inner.as_raw();
        let mut loadable: i32 = 0;
        let hr = unsafe { ((*(*this).vtbl).is_loadable)(this, &mut loadable) };
        if hr.is_err() {
            return Err(Error::LoadabilityCheckFailed {
                version: self.version.clone(),
                hresult: hr.0,
            });
        }

        debug!("IsLoadable({}) = {}", self.version, loadable != 0);
        Ok(loadable != 0)
    }

    fn runtime_host(&self) -> Result<ClrRuntimeHost> {
        let this = self.inner.as_raw();
        let mut runtime_host: *mut ICLRRuntimeHost = ptr::null_mut();
        let hr = unsafe {
            ((*(*this).vtbl).get_interface)(
                this,
                &CLSID_CLR_RUNTIME_HOST,
                &IID_ICLR_RUNTIME_HOST,
                &mut runtime_host as *mut _ as *mut *mut c_void,
            )
        };
        if hr.is_err() {
            return Err(Error::RuntimeHostUnavailable { hresult: hr.0 });
        }

        unsafe { ComPtr::from_raw(runtime_host) }
            .map(ClrRuntimeHost)
            .ok_or_else(|| Error::RuntimeHostUnavailable {
                hresult: E_POINTER.0,
            })
    }
}

/// `ICLRRuntimeHost` of a loaded runtime.
pub struct ClrRuntimeHost(ComPtr<ICLRRuntimeHost>);

impl RuntimeHost for ClrRuntimeHost {
    fn start(&self) -> Result<()> {
        let this = self.0.as_raw();
        let hr = unsafe { ((*(*this).vtbl).start)(this) };
        start_result(hr)
    }

    fn execute_in_default_app_domain(&self, request: &InvocationRequest) -> Result<u32> {
        let assembly_path = null_terminated(&request.assembly_path);
        let type_name = null_terminated(&request.type_name);
        let method_name = null_terminated(&request.method_name);
        let payload = null_terminated(&request.payload);

        let this = self.0.as_raw();
        let mut return_value: u32 = 0;
        let hr = unsafe {
            ((*(*this).vtbl).execute_in_default_app_domain)(
                this,
                PCWSTR(assembly_path.as_ptr()),
                PCWSTR(type_name.as_ptr()),
                PCWSTR(method_name.as_ptr()),
                PCWSTR(payload.as_ptr()),
                &mut return_value,
            )
        };
        if hr.is_err() {
            return Err(Error::InvocationFailed { hresult: hr.0 });
        }

        Ok(return_value)
    }
}
