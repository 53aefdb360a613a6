use libc::c_int;

use crate::CurlSlist;

/// Record returned for `CURLINFO_CERTINFO` (`struct curl_certinfo`).
///
/// `certinfo` points at `num_of_certs` lists, one per certificate in the
/// peer chain, each holding `"Field:value"` lines. The native handle owns the
/// record and all lists.
#[repr(C)]
#[derive(Debug)]
pub struct CurlCertInfo {
    pub num_of_certs: c_int,
    pub certinfo: *mut *mut CurlSlist,
}
