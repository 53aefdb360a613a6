// easy_abi/src/lib.rs

pub mod blob;
pub mod cert_info;
pub mod easy_option;
pub mod info_slot;
pub mod slist;
pub mod ssl_backend;
pub mod tls_session;

pub use blob::CurlBlob;
pub use cert_info::CurlCertInfo;
pub use easy_option::CurlEasyOption;
pub use info_slot::InfoSlot;
pub use slist::CurlSlist;
pub use ssl_backend::CurlSslBackend;
pub use tls_session::CurlTlsSessionInfo;

use libc::{c_char, c_void, size_t};

/// Opaque native transfer context (`CURL *`).
#[repr(C)]
pub struct CurlHandle {
    _private: [u8; 0],
}

/// Opaque native multipart form (`curl_mime *`).
#[repr(C)]
pub struct CurlMime {
    _private: [u8; 0],
}

/// Opaque native multipart part (`curl_mimepart *`).
#[repr(C)]
pub struct CurlMimePart {
    _private: [u8; 0],
}

/// Signature shared by the body (`WRITEFUNCTION`) and header (`HEADERFUNCTION`)
/// callbacks. Returning anything other than `size * nmemb` aborts the transfer.
pub type WriteCallback =
    extern "C" fn(data: *mut c_char, size: size_t, nmemb: size_t, userdata: *mut c_void) -> size_t;

/// Smallest error buffer the native library may write into.
pub const ERROR_SIZE: usize = 1024;

/// Status value every native call uses for success.
pub const CURLE_OK: i32 = 0;

/// Blob flag asking the native library to copy the payload immediately.
pub const CURL_BLOB_COPY: u32 = 1;
pub const CURL_BLOB_NOCOPY: u32 = 0;

/// Option descriptor flag marking a name kept only for compatibility.
pub const CURLOT_FLAG_ALIAS: u32 = 1 << 0;

/// Native option type codes (`curl_easytype`).
pub const CURLOT_LONG: u32 = 0;
pub const CURLOT_VALUES: u32 = 1;
pub const CURLOT_OFF_T: u32 = 2;
pub const CURLOT_OBJECT: u32 = 3;
pub const CURLOT_STRING: u32 = 4;
pub const CURLOT_SLIST: u32 = 5;
pub const CURLOT_CBPTR: u32 = 6;
pub const CURLOT_BLOB: u32 = 7;
pub const CURLOT_FUNCTION: u32 = 8;

/// Result-field id masks (`CURLINFO_*`). The low bits carry the field number.
pub const CURLINFO_STRING: u32 = 0x10_0000;
pub const CURLINFO_LONG: u32 = 0x20_0000;
pub const CURLINFO_DOUBLE: u32 = 0x30_0000;
pub const CURLINFO_SLIST: u32 = 0x40_0000;
pub const CURLINFO_PTR: u32 = 0x40_0000;
pub const CURLINFO_SOCKET: u32 = 0x50_0000;
pub const CURLINFO_OFF_T: u32 = 0x60_0000;
pub const CURLINFO_MASK: u32 = 0x0f_ffff;
pub const CURLINFO_TYPEMASK: u32 = 0xf0_0000;
