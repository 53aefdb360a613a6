use libc::c_char;

/// One entry of the native library's self-describing option table
/// (`struct curl_easyoption`), as returned by `curl_easy_option_by_name`
/// and `curl_easy_option_by_id`.
///
/// Entries are static data inside the loaded library; the binding only
/// reads them and never frees them.
#[repr(C)]
#[derive(Debug)]
pub struct CurlEasyOption {
    /// Upper-case option name without the `CURLOPT_` prefix.
    pub name: *const c_char,

    /// Numeric id to pass to `curl_easy_setopt`.
    pub id: u32,

    /// One of the `CURLOT_*` type codes.
    pub kind: u32,

    /// `CURLOT_FLAG_*` bits.
    pub flags: u32,
}
