use std::ffi::CStr;
use std::os::raw::c_char;

use easy_abi::{CurlCertInfo, CurlHandle, CurlSlist, CurlTlsSessionInfo, InfoSlot};
use easy_core::{Certificate, Info, InfoValue, ReturnCategory, SslBackend, TlsSession};

use crate::error::{EasyError, Result};
use crate::native::NativeEngine;

/// Reads one result field and decodes it by the field's return category.
///
/// # Safety
///
/// `handle` must be a live handle created by `engine`.
pub(crate) unsafe fn decode<E: NativeEngine>(
    engine: &E,
    handle: *mut CurlHandle,
    info: Info,
) -> Result<InfoValue> {
    let mut slot = InfoSlot::default();
    let code = engine.get_info(handle, info.id(), &mut slot);
    if !code.is_ok() {
        return Err(EasyError::NativeCallFailed {
            call: "curl_easy_getinfo",
            code,
            message: format!("{}: {}", info.name(), engine.strerror(code)),
        });
    }

    Ok(match info.category() {
        ReturnCategory::Text => InfoValue::Text(copy_c_str(slot.read_ptr())),
        ReturnCategory::Long => InfoValue::Long(slot.read_long()),
        ReturnCategory::Double => InfoValue::Double(slot.read_double()),
        ReturnCategory::OffT => InfoValue::OffT(slot.read_off_t()),
        ReturnCategory::StringList => {
            let head: *mut CurlSlist = slot.read_ptr();
            let items = walk_list(head);
            // The caller of getinfo owns the returned list.
            if !head.is_null() {
                engine.slist_free_all(head);
            }
            InfoValue::List(items)
        }
        ReturnCategory::TlsSession => {
            let record: *mut CurlTlsSessionInfo = slot.read_ptr();
            InfoValue::TlsSession(record.as_ref().map(|session| TlsSession {
                backend: SslBackend::from_id(session.backend),
                internals: session.internals as usize,
            }))
        }
        ReturnCategory::CertInfo => {
            // Owned by the handle; read but never freed here.
            let record: *mut CurlCertInfo = slot.read_ptr();
            InfoValue::CertInfo(record
                .as_ref()
                .map(|info| read_certificates(info))
                .unwrap_or_default())
        }
        ReturnCategory::Socket => InfoValue::Socket(read_socket(&slot)),
    })
}

unsafe fn copy_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

/// Copies every node's string, head to tail.
///
/// # Safety
///
/// `head` must be null or the head of a well-formed list.
pub(crate) unsafe fn walk_list(head: *const CurlSlist) -> Vec<String> {
    let mut items = Vec::new();
    let mut node = head;
    while let Some(current) = node.as_ref() {
        if let Some(text) = copy_c_str(current.data) {
            items.push(text);
        }
        node = current.next;
    }
    items
}

unsafe fn read_certificates(info: &CurlCertInfo) -> Vec<Certificate> {
    if info.certinfo.is_null() || info.num_of_certs <= 0 {
        return Vec::new();
    }
    (0..info.num_of_certs as usize)
        .map(|idx| Certificate {
            entries: walk_list(*info.certinfo.add(idx)),
        })
        .collect()
}

#[cfg(unix)]
fn read_socket(slot: &InfoSlot) -> Option<i64> {
    match slot.read_int() {
        -1 => None,
        fd => Some(i64::from(fd)),
    }
}

#[cfg(windows)]
fn read_socket(slot: &InfoSlot) -> Option<i64> {
    // INVALID_SOCKET is all ones.
    match slot.read_off_t() {
        -1 => None,
        socket => Some(socket),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn walking_a_hand_built_list() {
        let first = CString::new("one").unwrap();
        let second = CString::new("two").unwrap();
        let mut tail = CurlSlist {
            data: second.as_ptr() as *mut c_char,
            next: std::ptr::null_mut(),
        };
        let head = CurlSlist {
            data: first.as_ptr() as *mut c_char,
            next: &mut tail,
        };
        let items = unsafe { walk_list(&head) };
        assert_eq!(items, vec!["one".to_string(), "two".to_string()]);
        assert!(unsafe { walk_list(std::ptr::null()) }.is_empty());
    }

    #[test]
    fn certificate_records_are_read_per_chain_entry() {
        let line = CString::new("Subject:CN=test").unwrap();
        let mut node = CurlSlist {
            data: line.as_ptr() as *mut c_char,
            next: std::ptr::null_mut(),
        };
        let mut chain = [&mut node as *mut CurlSlist];
        let info = CurlCertInfo {
            num_of_certs: 1,
            certinfo: chain.as_mut_ptr(),
        };
        let certs = unsafe { read_certificates(&info) };
        assert_eq!(certs.len(), 1);
        assert_eq!(certs[0].get("Subject"), Some("CN=test"));
    }

    #[cfg(unix)]
    #[test]
    fn bad_socket_decodes_as_absent() {
        let mut slot = InfoSlot::default();
        slot.write_int(-1);
        assert_eq!(read_socket(&slot), None);
        slot.write_int(7);
        assert_eq!(read_socket(&slot), Some(7));
    }
}
