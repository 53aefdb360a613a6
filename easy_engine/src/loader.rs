//! Dynamically loaded libcurl.
//!
//! Every symbol is resolved once at load time into a typed function pointer.
//! The `Library` lives inside the engine, and every handle holds an `Arc` of
//! the engine, so no pointer outlives the mapping it came from.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_long, c_void};
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::Arc;

use easy_abi::{
    CurlEasyOption, CurlHandle, CurlMime, CurlMimePart, CurlSlist, CurlSslBackend, InfoSlot,
};
use easy_core::{Code, SslSet};
use libc::size_t;
use libloading::{Library, Symbol};
use once_cell::sync::OnceCell;
use liblogger::{log_info, log_warn};
use liblogger_macros::log_errors;

use crate::error::{EasyError, Result};
use crate::native::{NativeArg, NativeEngine};

#[cfg(target_os = "linux")]
pub const DEFAULT_LIBRARY_NAMES: &[&str] = &["libcurl.so.4", "libcurl.so", "libcurl-gnutls.so.4"];
#[cfg(target_os = "macos")]
pub const DEFAULT_LIBRARY_NAMES: &[&str] = &["libcurl.4.dylib", "libcurl.dylib"];
#[cfg(windows)]
pub const DEFAULT_LIBRARY_NAMES: &[&str] = &["libcurl.dll", "libcurl-4.dll", "libcurl-x64.dll"];
#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
pub const DEFAULT_LIBRARY_NAMES: &[&str] = &["libcurl.so.4", "libcurl.so"];

static SHARED: OnceCell<Arc<LibcurlEngine>> = OnceCell::new();

type GlobalInitFn = unsafe extern "C" fn(c_long) -> c_int;
type GlobalCleanupFn = unsafe extern "C" fn();
type GlobalSslsetFn =
    unsafe extern "C" fn(c_int, *const c_char, *mut *const *const CurlSslBackend) -> c_int;
type VersionFn = unsafe extern "C" fn() -> *const c_char;
type StrerrorFn = unsafe extern "C" fn(c_int) -> *const c_char;
type OptionByNameFn = unsafe extern "C" fn(*const c_char) -> *const CurlEasyOption;
type OptionByIdFn = unsafe extern "C" fn(c_int) -> *const CurlEasyOption;
type InitFn = unsafe extern "C" fn() -> *mut CurlHandle;
type HandleFn = unsafe extern "C" fn(*mut CurlHandle);
type SetoptFn = unsafe extern "C" fn(*mut CurlHandle, c_int, ...) -> c_int;
type PerformFn = unsafe extern "C" fn(*mut CurlHandle) -> c_int;
type GetinfoFn = unsafe extern "C" fn(*mut CurlHandle, c_int, ...) -> c_int;
type SlistAppendFn = unsafe extern "C" fn(*mut CurlSlist, *const c_char) -> *mut CurlSlist;
type SlistFreeAllFn = unsafe extern "C" fn(*mut CurlSlist);
type MimeInitFn = unsafe extern "C" fn(*mut CurlHandle) -> *mut CurlMime;
type MimeAddpartFn = unsafe extern "C" fn(*mut CurlMime) -> *mut CurlMimePart;
type MimeTextFn = unsafe extern "C" fn(*mut CurlMimePart, *const c_char) -> c_int;
type MimeDataFn = unsafe extern "C" fn(*mut CurlMimePart, *const c_char, size_t) -> c_int;
type MimeHeadersFn = unsafe extern "C" fn(*mut CurlMimePart, *mut CurlSlist, c_int) -> c_int;
type MimeSubpartsFn = unsafe extern "C" fn(*mut CurlMimePart, *mut CurlMime) -> c_int;
type MimeFreeFn = unsafe extern "C" fn(*mut CurlMime);
type EscapeFn = unsafe extern "C" fn(*mut CurlHandle, *const c_char, c_int) -> *mut c_char;
type FreeFn = unsafe extern "C" fn(*mut c_void);

struct Symbols {
    global_init: GlobalInitFn,
    global_cleanup: GlobalCleanupFn,
    global_sslset: GlobalSslsetFn,
    version: VersionFn,
    strerror: StrerrorFn,
    option_by_name: OptionByNameFn,
    option_by_id: OptionByIdFn,
    init: InitFn,
    cleanup: HandleFn,
    reset: HandleFn,
    setopt: SetoptFn,
    perform: PerformFn,
    getinfo: GetinfoFn,
    slist_append: SlistAppendFn,
    slist_free_all: SlistFreeAllFn,
    mime_init: MimeInitFn,
    mime_addpart: MimeAddpartFn,
    mime_name: MimeTextFn,
    mime_filename: MimeTextFn,
    mime_type: MimeTextFn,
    mime_data: MimeDataFn,
    mime_headers: MimeHeadersFn,
    mime_subparts: MimeSubpartsFn,
    mime_free: MimeFreeFn,
    escape: EscapeFn,
    free: FreeFn,
}

macro_rules! symbol {
    ($lib:expr, $name:literal, $ty:ty) => {{
        let symbol: Symbol<$ty> = $lib
            .get(concat!($name, "\0").as_bytes())
            .map_err(|e| EasyError::Library(format!("Missing symbol {}: {}", $name, e)))?;
        *symbol
    }};
}

impl Symbols {
    unsafe fn resolve(lib: &Library) -> Result<Self> {
        Ok(Symbols {
            global_init: symbol!(lib, "curl_global_init", GlobalInitFn),
            global_cleanup: symbol!(lib, "curl_global_cleanup", GlobalCleanupFn),
            global_sslset: symbol!(lib, "curl_global_sslset", GlobalSslsetFn),
            version: symbol!(lib, "curl_version", VersionFn),
            strerror: symbol!(lib, "curl_easy_strerror", StrerrorFn),
            option_by_name: symbol!(lib, "curl_easy_option_by_name", OptionByNameFn),
            option_by_id: symbol!(lib, "curl_easy_option_by_id", OptionByIdFn),
            init: symbol!(lib, "curl_easy_init", InitFn),
            cleanup: symbol!(lib, "curl_easy_cleanup", HandleFn),
            reset: symbol!(lib, "curl_easy_reset", HandleFn),
            setopt: symbol!(lib, "curl_easy_setopt", SetoptFn),
            perform: symbol!(lib, "curl_easy_perform", PerformFn),
            getinfo: symbol!(lib, "curl_easy_getinfo", GetinfoFn),
            slist_append: symbol!(lib, "curl_slist_append", SlistAppendFn),
            slist_free_all: symbol!(lib, "curl_slist_free_all", SlistFreeAllFn),
            mime_init: symbol!(lib, "curl_mime_init", MimeInitFn),
            mime_addpart: symbol!(lib, "curl_mime_addpart", MimeAddpartFn),
            mime_name: symbol!(lib, "curl_mime_name", MimeTextFn),
            mime_filename: symbol!(lib, "curl_mime_filename", MimeTextFn),
            mime_type: symbol!(lib, "curl_mime_type", MimeTextFn),
            mime_data: symbol!(lib, "curl_mime_data", MimeDataFn),
            mime_headers: symbol!(lib, "curl_mime_headers", MimeHeadersFn),
            mime_subparts: symbol!(lib, "curl_mime_subparts", MimeSubpartsFn),
            mime_free: symbol!(lib, "curl_mime_free", MimeFreeFn),
            escape: symbol!(lib, "curl_easy_escape", EscapeFn),
            free: symbol!(lib, "curl_free", FreeFn),
        })
    }
}

pub struct LibcurlEngine {
    symbols: Symbols,
    path: PathBuf,
    // Dropped last; the symbol table points into it.
    _library: Library,
}

impl std::fmt::Debug for LibcurlEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibcurlEngine").field("path", &self.path).finish()
    }
}

impl LibcurlEngine {
    /// Loads libcurl from an explicit path or library name.
    #[log_errors]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        unsafe {
            let library = Library::new(&path)
                .map_err(|e| EasyError::Library(format!("Failed to load {}: {}", path.display(), e)))?;
            let symbols = Symbols::resolve(&library)?;
            let engine = LibcurlEngine {
                symbols,
                path,
                _library: library,
            };
            log_info!(&format!("Loaded {} from {}", engine.version(), engine.path.display()));
            Ok(engine)
        }
    }

    /// Tries the platform's usual library names in order.
    pub fn load_default() -> Result<Self> {
        let mut failures = Vec::new();
        for name in DEFAULT_LIBRARY_NAMES {
            match Self::load(name) {
                Ok(engine) => return Ok(engine),
                Err(e) => failures.push(e.to_string()),
            }
        }
        Err(EasyError::Library(format!(
            "No libcurl found ({})",
            failures.join("; ")
        )))
    }

    /// Process-wide engine, loaded from the platform defaults on first use.
    pub fn shared() -> Result<Arc<LibcurlEngine>> {
        SHARED
            .get_or_try_init(|| Self::load_default().map(Arc::new))
            .cloned()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Backend names the library reports as selectable.
    fn available_backends(list: *const *const CurlSslBackend) -> Vec<String> {
        let mut names = Vec::new();
        if list.is_null() {
            return names;
        }
        unsafe {
            let mut cursor = list;
            while let Some(entry) = (*cursor).as_ref() {
                if !entry.name.is_null() {
                    names.push(CStr::from_ptr(entry.name).to_string_lossy().into_owned());
                }
                cursor = cursor.add(1);
            }
        }
        names
    }
}

unsafe fn owned_text(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

impl NativeEngine for LibcurlEngine {
    fn global_init(&self, flags: i64) -> Code {
        Code::from(unsafe { (self.symbols.global_init)(flags as c_long) })
    }

    fn global_cleanup(&self) {
        unsafe { (self.symbols.global_cleanup)() }
    }

    fn global_sslset(&self, backend_id: i32, name: Option<&CStr>) -> SslSet {
        let mut avail: *const *const CurlSslBackend = ptr::null();
        let raw = unsafe {
            (self.symbols.global_sslset)(
                backend_id,
                name.map_or(ptr::null(), CStr::as_ptr),
                &mut avail,
            )
        };
        let result = SslSet::from_raw(raw);
        if result == SslSet::UnknownBackend {
            log_warn!(&format!(
                "TLS backend not available; library offers: {}",
                Self::available_backends(avail).join(", ")
            ));
        }
        result
    }

    fn version(&self) -> String {
        unsafe { owned_text((self.symbols.version)()) }
    }

    fn strerror(&self, code: Code) -> String {
        unsafe { owned_text((self.symbols.strerror)(code.0)) }
    }

    fn option_by_name(&self, name: &CStr) -> *const CurlEasyOption {
        unsafe { (self.symbols.option_by_name)(name.as_ptr()) }
    }

    fn option_by_id(&self, id: u32) -> *const CurlEasyOption {
        unsafe { (self.symbols.option_by_id)(id as c_int) }
    }

    fn create_handle(&self) -> *mut CurlHandle {
        unsafe { (self.symbols.init)() }
    }

    unsafe fn destroy_handle(&self, handle: *mut CurlHandle) {
        (self.symbols.cleanup)(handle)
    }

    unsafe fn reset_handle(&self, handle: *mut CurlHandle) {
        (self.symbols.reset)(handle)
    }

    unsafe fn set_option(&self, handle: *mut CurlHandle, id: u32, arg: NativeArg) -> Code {
        let setopt = self.symbols.setopt;
        let id = id as c_int;
        let raw = match arg {
            NativeArg::Long(value) => setopt(handle, id, value as c_long),
            NativeArg::OffT(value) => setopt(handle, id, value),
            NativeArg::Pointer(ptr) => setopt(handle, id, ptr),
            NativeArg::Function(function) => {
                let ptr = function.map_or(ptr::null(), |f| f as *const c_void);
                setopt(handle, id, ptr)
            }
            NativeArg::Blob(record) => setopt(handle, id, record),
        };
        Code::from(raw)
    }

    unsafe fn perform(&self, handle: *mut CurlHandle) -> Code {
        Code::from((self.symbols.perform)(handle))
    }

    unsafe fn get_info(&self, handle: *mut CurlHandle, id: u32, slot: &mut InfoSlot) -> Code {
        Code::from((self.symbols.getinfo)(handle, id as c_int, slot.as_mut_ptr()))
    }

    unsafe fn slist_append(&self, list: *mut CurlSlist, line: &CStr) -> *mut CurlSlist {
        (self.symbols.slist_append)(list, line.as_ptr())
    }

    unsafe fn slist_free_all(&self, list: *mut CurlSlist) {
        (self.symbols.slist_free_all)(list)
    }

    unsafe fn mime_init(&self, handle: *mut CurlHandle) -> *mut CurlMime {
        (self.symbols.mime_init)(handle)
    }

    unsafe fn mime_add_part(&self, mime: *mut CurlMime) -> *mut CurlMimePart {
        (self.symbols.mime_addpart)(mime)
    }

    unsafe fn mime_name(&self, part: *mut CurlMimePart, name: &CStr) -> Code {
        Code::from((self.symbols.mime_name)(part, name.as_ptr()))
    }

    unsafe fn mime_filename(&self, part: *mut CurlMimePart, filename: &CStr) -> Code {
        Code::from((self.symbols.mime_filename)(part, filename.as_ptr()))
    }

    unsafe fn mime_type(&self, part: *mut CurlMimePart, mime_type: &CStr) -> Code {
        Code::from((self.symbols.mime_type)(part, mime_type.as_ptr()))
    }

    unsafe fn mime_data(&self, part: *mut CurlMimePart, data: &[u8]) -> Code {
        Code::from((self.symbols.mime_data)(part, data.as_ptr() as *const c_char, data.len()))
    }

    unsafe fn mime_headers(
        &self,
        part: *mut CurlMimePart,
        headers: *mut CurlSlist,
        take_ownership: bool,
    ) -> Code {
        Code::from((self.symbols.mime_headers)(part, headers, take_ownership as c_int))
    }

    unsafe fn mime_subparts(&self, part: *mut CurlMimePart, subparts: *mut CurlMime) -> Code {
        Code::from((self.symbols.mime_subparts)(part, subparts))
    }

    unsafe fn mime_free(&self, mime: *mut CurlMime) {
        (self.symbols.mime_free)(mime)
    }

    unsafe fn escape(&self, handle: *mut CurlHandle, input: &[u8]) -> *mut c_char {
        let Ok(len) = c_int::try_from(input.len()) else {
            return ptr::null_mut();
        };
        // An empty input with length 0 would be read up to a NUL instead.
        if len == 0 {
            let empty = CString::default();
            return (self.symbols.escape)(handle, empty.as_ptr(), 0);
        }
        (self.symbols.escape)(handle, input.as_ptr() as *const c_char, len)
    }

    unsafe fn free(&self, ptr: *mut c_void) {
        (self.symbols.free)(ptr)
    }
}

// Function pointers into a loaded library are freely shareable; libcurl's
// global functions are serialized by the GlobalGuard and handles are never
// shared between threads.
unsafe impl Send for LibcurlEngine {}
unsafe impl Sync for LibcurlEngine {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_library_is_a_library_error() {
        let err = LibcurlEngine::load("/nonexistent/libcurl-missing.so").unwrap_err();
        match err {
            EasyError::Library(message) => assert!(message.contains("libcurl-missing")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn backend_list_stops_at_null() {
        let openssl = CString::new("openssl").unwrap();
        let first = CurlSslBackend {
            id: 1,
            name: openssl.as_ptr(),
        };
        let list = [&first as *const CurlSslBackend, ptr::null()];
        assert_eq!(LibcurlEngine::available_backends(list.as_ptr()), vec!["openssl"]);
    }
}
