use libc::c_char;

/// Node of the native singly linked string list (`struct curl_slist`).
///
/// Lists are built with `curl_slist_append` and released as a whole with
/// `curl_slist_free_all`; individual nodes are never freed on their own.
#[repr(C)]
#[derive(Debug)]
pub struct CurlSlist {
    /// Null-terminated string owned by the list.
    pub data: *mut c_char,

    /// Next node, or null at the tail.
    pub next: *mut CurlSlist,
}
