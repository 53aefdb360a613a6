use libc::{c_void, size_t};

/// Binary payload passed by reference to blob-typed options (`struct curl_blob`).
///
/// The record itself only has to outlive the set-option call. The payload it
/// points to has to outlive the handle unless `flags` is [`crate::CURL_BLOB_COPY`].
#[repr(C)]
#[derive(Debug)]
pub struct CurlBlob {
    pub data: *mut c_void,
    pub len: size_t,
    pub flags: u32,
}

impl CurlBlob {
    pub fn new(data: &[u8], copy: bool) -> Self {
        Self {
            data: data.as_ptr() as *mut c_void,
            len: data.len(),
            flags: if copy { crate::CURL_BLOB_COPY } else { crate::CURL_BLOB_NOCOPY },
        }
    }

    pub fn copies(&self) -> bool {
        self.flags & crate::CURL_BLOB_COPY != 0
    }
}

// The record is moved into the handle that retains it; the payload pointer is
// only read by the native library on the thread driving that handle.
unsafe impl Send for CurlBlob {}
