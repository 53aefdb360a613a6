/*
 * Owned native resources. Each type wraps exactly one native allocation and
 * releases it exactly once, in `Drop`. Ownership is transferred to the native
 * side with `into_raw` when the library takes over responsibility.
 */

use std::ffi::CString;
use std::os::raw::c_void;
use std::ptr::NonNull;
use std::sync::Arc;

use easy_abi::{CurlHandle, CurlMime, CurlSlist};
use easy_core::{Code, MimePart};

use crate::bridge::{body_trampoline, header_trampoline, Bridge, BodySink, HeaderSink};
use crate::error::{EasyError, Result};
use crate::native::{NativeArg, NativeEngine};

pub(crate) fn check<E: NativeEngine>(engine: &E, call: &'static str, code: Code) -> Result<()> {
    if code.is_ok() {
        Ok(())
    } else {
        Err(EasyError::NativeCallFailed {
            call,
            code,
            message: engine.strerror(code),
        })
    }
}

/// The native transfer context.
pub struct NativeHandle<E: NativeEngine> {
    engine: Arc<E>,
    ptr: NonNull<CurlHandle>,
}

impl<E: NativeEngine> NativeHandle<E> {
    pub fn create(engine: Arc<E>) -> Result<Self> {
        let ptr = NonNull::new(engine.create_handle())
            .ok_or(EasyError::NullNativeResult("curl_easy_init"))?;
        Ok(Self { engine, ptr })
    }

    pub fn as_ptr(&self) -> *mut CurlHandle {
        self.ptr.as_ptr()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn set(&self, id: u32, arg: NativeArg) -> Result<()> {
        let code = unsafe { self.engine.set_option(self.as_ptr(), id, arg) };
        check(&*self.engine, "curl_easy_setopt", code)
    }
}

impl<E: NativeEngine> Drop for NativeHandle<E> {
    fn drop(&mut self) {
        unsafe { self.engine.destroy_handle(self.ptr.as_ptr()) };
    }
}

// The engine is Send + Sync and the pointer is only used by the owning handle.
unsafe impl<E: NativeEngine> Send for NativeHandle<E> {}

/// A native singly linked string list.
pub struct NativeList<E: NativeEngine> {
    engine: Arc<E>,
    head: NonNull<CurlSlist>,
}

impl<E: NativeEngine> NativeList<E> {
    /// Appends every line in order. An empty input yields `None`, the null
    /// list. A failed append frees what was built so far.
    pub fn build(engine: &Arc<E>, lines: &[CString]) -> Result<Option<Self>> {
        let mut list: Option<NativeList<E>> = None;
        for line in lines {
            let current = list.as_ref().map_or(std::ptr::null_mut(), |l| l.head.as_ptr());
            let head = unsafe { engine.slist_append(current, line) };
            let head = NonNull::new(head).ok_or(EasyError::NullNativeResult("curl_slist_append"))?;
            match list.as_mut() {
                Some(existing) => existing.head = head,
                None => {
                    list = Some(NativeList {
                        engine: engine.clone(),
                        head,
                    })
                }
            }
        }
        Ok(list)
    }

    pub fn as_ptr(&self) -> *mut CurlSlist {
        self.head.as_ptr()
    }

    /// Hands the list to the native side, which will free it.
    pub fn into_raw(self) -> *mut CurlSlist {
        let head = self.head.as_ptr();
        std::mem::forget(self);
        head
    }
}

impl<E: NativeEngine> Drop for NativeList<E> {
    fn drop(&mut self) {
        unsafe { self.engine.slist_free_all(self.head.as_ptr()) };
    }
}

unsafe impl<E: NativeEngine> Send for NativeList<E> {}

/// A native multipart form and, transitively, all of its parts.
pub struct MimeForm<E: NativeEngine> {
    engine: Arc<E>,
    ptr: NonNull<CurlMime>,
}

impl<E: NativeEngine> MimeForm<E> {
    pub fn build(engine: &Arc<E>, handle: *mut CurlHandle, parts: &[MimePart]) -> Result<Self> {
        let ptr = NonNull::new(unsafe { engine.mime_init(handle) })
            .ok_or(EasyError::NullNativeResult("curl_mime_init"))?;
        let form = MimeForm {
            engine: engine.clone(),
            ptr,
        };
        for part in parts {
            form.add_part(handle, part)?;
        }
        Ok(form)
    }

    fn add_part(&self, handle: *mut CurlHandle, part: &MimePart) -> Result<()> {
        let engine = &*self.engine;
        let native = unsafe { engine.mime_add_part(self.ptr.as_ptr()) };
        if native.is_null() {
            return Err(EasyError::NullNativeResult("curl_mime_addpart"));
        }

        let name = text("mime part name", &part.name)?;
        check(engine, "curl_mime_name", unsafe { engine.mime_name(native, &name) })?;

        if let Some(filename) = &part.filename {
            let filename = text("mime filename", filename)?;
            check(engine, "curl_mime_filename", unsafe { engine.mime_filename(native, &filename) })?;
        }
        if let Some(content_type) = &part.content_type {
            let content_type = text("mime type", content_type)?;
            check(engine, "curl_mime_type", unsafe { engine.mime_type(native, &content_type) })?;
        }

        if part.subparts.is_empty() {
            let data = part.data.as_bytes();
            check(engine, "curl_mime_data", unsafe { engine.mime_data(native, data) })?;
        } else {
            let nested = MimeForm::build(&self.engine, handle, &part.subparts)?;
            let code = unsafe { engine.mime_subparts(native, nested.ptr.as_ptr()) };
            check(engine, "curl_mime_subparts", code)?;
            nested.into_raw();
        }

        let lines = part
            .header_lines()
            .into_iter()
            .map(|line| text("mime header", &line))
            .collect::<Result<Vec<_>>>()?;
        if let Some(headers) = NativeList::build(&self.engine, &lines)? {
            let code = unsafe { engine.mime_headers(native, headers.as_ptr(), true) };
            check(engine, "curl_mime_headers", code)?;
            headers.into_raw();
        }
        Ok(())
    }

    pub fn as_ptr(&self) -> *mut CurlMime {
        self.ptr.as_ptr()
    }

    fn into_raw(self) -> *mut CurlMime {
        let ptr = self.ptr.as_ptr();
        std::mem::forget(self);
        ptr
    }
}

impl<E: NativeEngine> Drop for MimeForm<E> {
    fn drop(&mut self) {
        unsafe { self.engine.mime_free(self.ptr.as_ptr()) };
    }
}

unsafe impl<E: NativeEngine> Send for MimeForm<E> {}

fn text(what: &str, value: &str) -> Result<CString> {
    CString::new(value)
        .map_err(|_| EasyError::InvalidArgument(format!("{} contains a NUL byte", what)))
}

/// Native option ids the trampolines are installed under.
#[derive(Debug, Clone, Copy)]
pub struct TrampolineIds {
    pub write_function: u32,
    pub write_data: u32,
    pub header_function: u32,
    pub header_data: u32,
}

/// The callback bridge as seen from the native side: two installed entry
/// points plus the heap-pinned sinks their userdata pointers address.
pub struct Trampolines {
    bridge: NonNull<Bridge>,
    ids: TrampolineIds,
}

impl Trampolines {
    pub fn new(ids: TrampolineIds) -> Self {
        let bridge = Box::into_raw(Box::<Bridge>::default());
        Self {
            // Box::into_raw never returns null.
            bridge: unsafe { NonNull::new_unchecked(bridge) },
            ids,
        }
    }

    /// Points the native callbacks at this bridge.
    pub fn install<E: NativeEngine>(&mut self, handle: &NativeHandle<E>) -> Result<()> {
        let bridge = self.bridge.as_ptr();
        let body: *mut BodySink = unsafe { std::ptr::addr_of_mut!((*bridge).body) };
        let header: *mut HeaderSink = unsafe { std::ptr::addr_of_mut!((*bridge).header) };

        handle.set(self.ids.write_data, NativeArg::Pointer(body as *const c_void))?;
        let code = unsafe {
            handle
                .engine()
                .install_trampoline(handle.as_ptr(), self.ids.write_function, Some(body_trampoline))
        };
        check(handle.engine(), "curl_easy_setopt", code)?;

        handle.set(self.ids.header_data, NativeArg::Pointer(header as *const c_void))?;
        let code = unsafe {
            handle.engine().install_trampoline(
                handle.as_ptr(),
                self.ids.header_function,
                Some(header_trampoline),
            )
        };
        check(handle.engine(), "curl_easy_setopt", code)
    }

    /// Detaches the native callbacks. Failures are ignored: the handle is
    /// about to be destroyed either way.
    pub fn uninstall<E: NativeEngine>(&mut self, handle: &NativeHandle<E>) {
        let _ = handle.set(self.ids.write_function, NativeArg::Function(None));
        let _ = handle.set(self.ids.write_data, NativeArg::null());
        let _ = handle.set(self.ids.header_function, NativeArg::Function(None));
        let _ = handle.set(self.ids.header_data, NativeArg::null());
    }

    pub fn bridge(&self) -> &Bridge {
        unsafe { self.bridge.as_ref() }
    }

    pub fn bridge_mut(&mut self) -> &mut Bridge {
        unsafe { self.bridge.as_mut() }
    }

    pub fn ids(&self) -> TrampolineIds {
        self.ids
    }
}

impl Drop for Trampolines {
    fn drop(&mut self) {
        drop(unsafe { Box::from_raw(self.bridge.as_ptr()) });
    }
}

// Observers are Send, and the bridge is only reached through its owning handle.
unsafe impl Send for Trampolines {}
