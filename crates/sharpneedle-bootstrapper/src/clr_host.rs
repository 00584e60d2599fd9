//! CLR hosting interfaces for .NET Framework 4.
//!
//! These interfaces are not included in the windows crate, so we define them manually.
//! Only a few vtable slots are called; the rest keep the layout.

#![allow(dead_code)]

use std::ffi::c_void;
use windows::core::{GUID, HRESULT, PCWSTR};

// GUIDs for CLR hosting
pub const CLSID_CLR_META_HOST: GUID = GUID::from_u128(0x9280188d_0e8e_4867_b30c_7fa83884e8de);
pub const IID_ICLR_META_HOST: GUID = GUID::from_u128(0xD332DB9E_B9B3_4125_8207_A14884F53216);
pub const IID_ICLR_RUNTIME_INFO: GUID = GUID::from_u128(0xBD39D1D2_BA2F_486a_89B0_B4B0CB466891);
pub const CLSID_CLR_RUNTIME_HOST: GUID = GUID::from_u128(0x90F1A06E_7712_4762_86B5_7A5EBA6BDB02);
pub const IID_ICLR_RUNTIME_HOST: GUID = GUID::from_u128(0x90F1A06C_7712_4762_86B5_7A5EBA6BDB02);

// mscoree.dll export
pub type CLRCreateInstanceFn = unsafe extern "system" fn(
    clsid: *const GUID,
    riid: *const GUID,
    ppinterface: *mut *mut c_void,
) -> HRESULT;

// IUnknown vtable, shared prefix of every interface below
#[repr(C)]
pub struct IUnknownVtbl {
    pub query_interface:
        unsafe extern "system" fn(*mut c_void, *const GUID, *mut *mut c_void) -> HRESULT,
    pub add_ref: unsafe extern "system" fn(*mut c_void) -> u32,
    pub release: unsafe extern "system" fn(*mut c_void) -> u32,
}

// ICLRMetaHost interface
#[repr(C)]
pub struct ICLRMetaHostVtbl {
    pub base: IUnknownVtbl,
    pub get_runtime: unsafe extern "system" fn(
        *mut ICLRMetaHost,
        PCWSTR,
        *const GUID,
        *mut *mut c_void,
    ) -> HRESULT,
    pub get_version_from_file:
        unsafe extern "system" fn(*mut ICLRMetaHost, PCWSTR, *mut u16, *mut u32) -> HRESULT,
    pub enumerate_installed_runtimes:
        unsafe extern "system" fn(*mut ICLRMetaHost, *mut *mut c_void) -> HRESULT,
    pub enumerate_loaded_runtimes:
        unsafe extern "system" fn(*mut ICLRMetaHost, *mut c_void, *mut *mut c_void) -> HRESULT,
    pub request_runtime_loaded_notification:
        unsafe extern "system" fn(*mut ICLRMetaHost, *mut c_void) -> HRESULT,
    pub query_legacy_v2_runtime_binding:
        unsafe extern "system" fn(*mut ICLRMetaHost, *const GUID, *mut *mut c_void) -> HRESULT,
    pub exit_process: unsafe extern "system" fn(*mut ICLRMetaHost, i32) -> HRESULT,
}

#[repr(C)]
pub struct ICLRMetaHost {
    pub vtbl: *const ICLRMetaHostVtbl,
}

// ICLRRuntimeInfo interface
#[repr(C)]
pub struct ICLRRuntimeInfoVtbl {
    pub base: IUnknownVtbl,
    pub get_version_string:
        unsafe extern "system" fn(*mut ICLRRuntimeInfo, *mut u16, *mut u32) -> HRESULT,
    pub get_runtime_directory:
        unsafe extern "system" fn(*mut ICLRRuntimeInfo, *mut u16, *mut u32) -> HRESULT,
    pub is_loaded:
        unsafe extern "system" fn(*mut ICLRRuntimeInfo, *mut c_void, *mut i32) -> HRESULT,
    pub load_error_string:
        unsafe extern "system" fn(*mut ICLRRuntimeInfo, u32, *mut u16, *mut u32, i32) -> HRESULT,
    pub load_library:
        unsafe extern "system" fn(*mut ICLRRuntimeInfo, PCWSTR, *mut *mut c_void) -> HRESULT,
    pub get_proc_address:
        unsafe extern "system" fn(*mut ICLRRuntimeInfo, *const i8, *mut *mut c_void) -> HRESULT,
    pub get_interface: unsafe extern "system" fn(
        *mut ICLRRuntimeInfo,
        *const GUID,
        *const GUID,
        *mut *mut c_void,
    ) -> HRESULT,
    pub is_loadable: unsafe extern "system" fn(*mut ICLRRuntimeInfo, *mut i32) -> HRESULT,
    pub set_default_startup_flags:
        unsafe extern "system" fn(*mut ICLRRuntimeInfo, u32, PCWSTR) -> HRESULT,
    pub get_default_startup_flags:
        unsafe extern "system" fn(*mut ICLRRuntimeInfo, *mut u32, *mut u16, *mut u32) -> HRESULT,
    pub bind_as_legacy_v2_runtime: unsafe extern "system" fn(*mut ICLRRuntimeInfo) -> HRESULT,
    pub is_started: unsafe extern "system" fn(*mut ICLRRuntimeInfo, *mut i32, *mut u32) -> HRESULT,
}

#[repr(C)]
pub struct ICLRRuntimeInfo {
    pub vtbl: *const ICLRRuntimeInfoVtbl,
}

// ICLRRuntimeHost interface
#[repr(C)]
pub struct ICLRRuntimeHostVtbl {
    pub base: IUnknownVtbl,
    pub start: unsafe extern "system" fn(*mut ICLRRuntimeHost) -> HRESULT,
    pub stop: unsafe extern "system" fn(*mut ICLRRuntimeHost) -> HRESULT,
    pub set_host_control: unsafe extern "system" fn(*mut ICLRRuntimeHost, *mut c_void) -> HRESULT,
    pub get_clr_control:
        unsafe extern "system" fn(*mut ICLRRuntimeHost, *mut *mut c_void) -> HRESULT,
    pub unload_app_domain: unsafe extern "system" fn(*mut ICLRRuntimeHost, u32, i32) -> HRESULT,
    pub execute_in_app_domain: unsafe extern "system" fn(
        *mut ICLRRuntimeHost,
        u32,
        *mut c_void,
        *mut c_void,
    ) -> HRESULT,
    pub get_current_app_domain_id:
        unsafe extern "system" fn(*mut ICLRRuntimeHost, *mut u32) -> HRESULT,
    pub execute_application: unsafe extern "system" fn(
        *mut ICLRRuntimeHost,
        PCWSTR,
        u32,
        *const PCWSTR,
        u32,
        *const PCWSTR,
        *mut i32,
    ) -> HRESULT,
    pub execute_in_default_app_domain: unsafe extern "system" fn(
        *mut ICLRRuntimeHost,
        PCWSTR, // pwzAssemblyPath
        PCWSTR, // pwzTypeName
        PCWSTR, // pwzMethodName
        PCWSTR, // pwzArgument
        *mut u32,
    ) -> HRESULT,
}

#[repr(C)]
pub struct ICLRRuntimeHost {
    pub vtbl: *const ICLRRuntimeHostVtbl,
}
