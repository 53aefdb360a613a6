use libc::{c_char, c_int};

/// Entry of the backend list reported by `curl_global_sslset`
/// (`struct curl_ssl_backend`).
#[repr(C)]
#[derive(Debug)]
pub struct CurlSslBackend {
    pub id: c_int,
    pub name: *const c_char,
}
