use libc::{c_int, c_void};

/// Record returned for `CURLINFO_TLS_SSL_PTR` (`struct curl_tlssessioninfo`).
///
/// Owned by the native handle; valid until the next transfer on it.
#[repr(C)]
#[derive(Debug)]
pub struct CurlTlsSessionInfo {
    /// `curl_sslbackend` id of the backend that owns `internals`.
    pub backend: c_int,

    /// Backend-specific session pointer (e.g. `SSL *` for OpenSSL).
    pub internals: *mut c_void,
}
