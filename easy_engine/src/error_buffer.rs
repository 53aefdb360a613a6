use std::sync::{Arc, Mutex, MutexGuard};

use easy_abi::ERROR_SIZE;

/// Fixed-size buffer the native engine writes a diagnostic into when a call
/// fails.
///
/// The caller keeps one clone and registers another with a handle; both see
/// the same bytes. The handle holds the lock while a transfer runs, so
/// readers never observe a half-written message.
///
/// Reading the message from inside a transfer observer blocks until the
/// transfer ends, which on the transferring thread never happens. Handles
/// sharing one buffer run their transfers one at a time. `len` does not
/// take the lock.
#[derive(Clone)]
pub struct ErrorBuffer {
    inner: Arc<Mutex<Box<[u8]>>>,
    size: usize,
}

impl ErrorBuffer {
    pub fn new() -> Self {
        Self::with_size(ERROR_SIZE)
    }

    /// Buffers smaller than the native minimum can be built but are refused
    /// at registration.
    pub fn with_size(size: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(vec![0u8; size].into_boxed_slice())),
            size,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.lock().first().map_or(true, |b| *b == 0)
    }

    /// Text up to the first NUL, or `None` when nothing was written.
    pub fn message(&self) -> Option<String> {
        let bytes = self.lock();
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
        if end == 0 {
            return None;
        }
        Some(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    pub fn clear(&self) {
        self.lock().fill(0);
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Box<[u8]>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Address handed to the native engine. Stable for the buffer's life.
    pub(crate) fn as_mut_ptr(&self) -> *mut u8 {
        self.lock().as_mut_ptr()
    }

    pub(crate) fn same_buffer(&self, other: &ErrorBuffer) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for ErrorBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ErrorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorBuffer")
            .field("len", &self.len())
            .field("message", &self.message())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_stops_at_nul() {
        let buffer = ErrorBuffer::new();
        assert_eq!(buffer.len(), 1024);
        assert_eq!(buffer.message(), None);

        buffer.lock()[..5].copy_from_slice(b"oops\0");
        assert_eq!(buffer.message().as_deref(), Some("oops"));

        let shared = buffer.clone();
        shared.clear();
        assert!(buffer.is_empty());
        assert!(buffer.same_buffer(&shared));
    }

    #[test]
    fn len_is_available_while_locked() {
        let buffer = ErrorBuffer::with_size(2048);
        let shared = buffer.clone();
        let _guard = buffer.lock();
        assert_eq!(shared.len(), 2048);
    }
}
