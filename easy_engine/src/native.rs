/*
 * The boundary between the marshaling core and the native transfer engine.
 *
 * Everything above this trait deals in owned host values; everything below
 * it deals in raw pointers with C lifetime rules. Two engines implement it:
 * the dynamically loaded libcurl and an in-memory scripted engine.
 */

use std::ffi::CStr;
use std::os::raw::{c_char, c_void};

use easy_abi::{
    CurlBlob, CurlEasyOption, CurlHandle, CurlMime, CurlMimePart, CurlSlist, InfoSlot,
    WriteCallback,
};
use easy_core::{Code, SslSet};

/// One argument for the native set-option call, already reduced to the
/// variant the option's category demands.
#[derive(Debug, Clone, Copy)]
pub enum NativeArg {
    Long(i64),
    OffT(i64),
    Pointer(*const c_void),
    Function(Option<WriteCallback>),
    Blob(*const CurlBlob),
}

impl NativeArg {
    pub fn null() -> Self {
        NativeArg::Pointer(std::ptr::null())
    }
}

/// Required entry points of the native engine.
///
/// The engine is shared by every handle created from it, so it must be
/// `Send + Sync`; individual native handles are never touched from two
/// threads at once.
///
/// # Safety
///
/// Methods marked `unsafe` take raw native pointers. Callers guarantee that
/// each pointer was produced by the same engine and has not been released.
pub trait NativeEngine: Send + Sync + 'static {
    fn global_init(&self, flags: i64) -> Code;
    fn global_cleanup(&self);
    fn global_sslset(&self, backend_id: i32, name: Option<&CStr>) -> SslSet;
    fn version(&self) -> String;
    fn strerror(&self, code: Code) -> String;

    fn option_by_name(&self, name: &CStr) -> *const CurlEasyOption;
    fn option_by_id(&self, id: u32) -> *const CurlEasyOption;

    fn create_handle(&self) -> *mut CurlHandle;
    unsafe fn destroy_handle(&self, handle: *mut CurlHandle);
    unsafe fn reset_handle(&self, handle: *mut CurlHandle);

    unsafe fn set_option(&self, handle: *mut CurlHandle, id: u32, arg: NativeArg) -> Code;
    unsafe fn perform(&self, handle: *mut CurlHandle) -> Code;
    unsafe fn get_info(&self, handle: *mut CurlHandle, id: u32, slot: &mut InfoSlot) -> Code;

    unsafe fn slist_append(&self, list: *mut CurlSlist, line: &CStr) -> *mut CurlSlist;
    unsafe fn slist_free_all(&self, list: *mut CurlSlist);

    unsafe fn mime_init(&self, handle: *mut CurlHandle) -> *mut CurlMime;
    unsafe fn mime_add_part(&self, mime: *mut CurlMime) -> *mut CurlMimePart;
    unsafe fn mime_name(&self, part: *mut CurlMimePart, name: &CStr) -> Code;
    unsafe fn mime_filename(&self, part: *mut CurlMimePart, filename: &CStr) -> Code;
    unsafe fn mime_type(&self, part: *mut CurlMimePart, mime_type: &CStr) -> Code;
    unsafe fn mime_data(&self, part: *mut CurlMimePart, data: &[u8]) -> Code;
    /// With `take_ownership` the part frees `headers` itself.
    unsafe fn mime_headers(
        &self,
        part: *mut CurlMimePart,
        headers: *mut CurlSlist,
        take_ownership: bool,
    ) -> Code;
    /// On success the part owns `subparts`.
    unsafe fn mime_subparts(&self, part: *mut CurlMimePart, subparts: *mut CurlMime) -> Code;
    unsafe fn mime_free(&self, mime: *mut CurlMime);

    unsafe fn escape(&self, handle: *mut CurlHandle, input: &[u8]) -> *mut c_char;
    unsafe fn free(&self, ptr: *mut c_void);

    /// Installs a native-callable receive function for a callback option.
    unsafe fn install_trampoline(
        &self,
        handle: *mut CurlHandle,
        option_id: u32,
        function: Option<WriteCallback>,
    ) -> Code {
        self.set_option(handle, option_id, NativeArg::Function(function))
    }
}
