/*
 * EasyHandle: one reusable native transfer context together with every
 * native resource hanging off it.
 *
 * Lifecycle: constructed (native handle allocated, trampolines installed),
 * configured, performed any number of times, released. Release frees the
 * header lists, the multipart form, the trampolines and finally the native
 * handle, in that order, and runs at most once.
 */

use std::collections::HashMap;
use std::ffi::CStr;
use std::os::raw::c_void;
use std::sync::Arc;

use easy_abi::ERROR_SIZE;
use easy_core::{
    Certificate, Code, HeaderMap, HttpVersion, Info, InfoValue, MimePart, Observer, Opt,
    OptionValue, Timing, Timings, TlsSession,
};
use liblogger::{log_debug, log_warn};
use liblogger_macros::{log_entry_exit, measure_time};

use crate::bridge::Fault;
use crate::decoder;
use crate::encoder::{self, BlobPayload, Encoded};
use crate::error::{EasyError, Result};
use crate::error_buffer::ErrorBuffer;
use crate::native::{NativeArg, NativeEngine};
use crate::registry::{OptionDescriptor, OptionRegistry};
use crate::resources::{MimeForm, NativeHandle, NativeList, TrampolineIds, Trampolines};

/// Buffers the native side may still point into, kept per option id until
/// replaced or released. Never read back; holding them is the point.
#[allow(dead_code)]
enum Retained {
    Text(std::ffi::CString),
    Data(Vec<u8>),
    Blob(BlobPayload),
}

/// Host-side state that outlives a single native call.
struct Live<E: NativeEngine> {
    native: NativeHandle<E>,
    trampolines: Trampolines,
    lists: HashMap<u32, NativeList<E>>,
    mime: Option<MimeForm<E>>,
    retained: HashMap<u32, Retained>,
    error_buffer: Option<ErrorBuffer>,
    errorbuffer_id: u32,
    mimepost_id: u32,
}

/// Options the handle drives itself. Matched by resolved id, so legacy
/// alias names such as `FILE` or `WRITEHEADER` land here as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Managed {
    WriteFunction,
    HeaderFunction,
    CallbackData,
    ErrorBuffer,
    MimePost,
}

impl<E: NativeEngine> Live<E> {
    fn managed(&self, id: u32) -> Option<Managed> {
        let ids = self.trampolines.ids();
        if id == ids.write_function {
            Some(Managed::WriteFunction)
        } else if id == ids.header_function {
            Some(Managed::HeaderFunction)
        } else if id == ids.write_data || id == ids.header_data {
            Some(Managed::CallbackData)
        } else if id == self.errorbuffer_id {
            Some(Managed::ErrorBuffer)
        } else if id == self.mimepost_id {
            Some(Managed::MimePost)
        } else {
            None
        }
    }
}

pub struct EasyHandle<E: NativeEngine> {
    registry: Arc<OptionRegistry<E>>,
    live: Option<Live<E>>,
}

impl<E: NativeEngine> EasyHandle<E> {
    pub fn new(engine: Arc<E>) -> Result<Self> {
        Self::with_registry(Arc::new(OptionRegistry::new(engine)))
    }

    /// Creates the native handle and installs both trampolines.
    pub fn with_registry(registry: Arc<OptionRegistry<E>>) -> Result<Self> {
        let ids = TrampolineIds {
            write_function: registry.resolve("WRITEFUNCTION")?.id,
            write_data: registry.resolve("WRITEDATA")?.id,
            header_function: registry.resolve("HEADERFUNCTION")?.id,
            header_data: registry.resolve("HEADERDATA")?.id,
        };
        let errorbuffer_id = registry.resolve("ERRORBUFFER")?.id;
        let mimepost_id = registry.resolve("MIMEPOST")?.id;

        let native = NativeHandle::create(registry.engine().clone())?;
        let mut trampolines = Trampolines::new(ids);
        if let Err(e) = trampolines.install(&native) {
            trampolines.uninstall(&native);
            return Err(e);
        }

        Ok(Self {
            registry,
            live: Some(Live {
                native,
                trampolines,
                lists: HashMap::new(),
                mime: None,
                retained: HashMap::new(),
                error_buffer: None,
                errorbuffer_id,
                mimepost_id,
            }),
        })
    }

    pub fn registry(&self) -> &Arc<OptionRegistry<E>> {
        &self.registry
    }

    /// Status text for a code, as reported by the loaded library.
    pub fn describe(&self, code: Code) -> String {
        self.registry.engine().strerror(code)
    }

    pub fn is_released(&self) -> bool {
        self.live.is_none()
    }

    fn live(&self) -> Result<&Live<E>> {
        self.live.as_ref().ok_or(EasyError::Released)
    }

    fn live_mut(&mut self) -> Result<&mut Live<E>> {
        self.live.as_mut().ok_or(EasyError::Released)
    }

    // ---- options -------------------------------------------------------

    pub fn set(&mut self, opt: Opt, value: impl Into<OptionValue>) -> Result<()> {
        self.set_by_name(opt.name(), value.into())
    }

    pub fn set_text(&mut self, opt: Opt, value: &str) -> Result<()> {
        self.set_by_name(opt.name(), OptionValue::Text(value.to_string()))
    }

    pub fn set_long(&mut self, opt: Opt, value: i64) -> Result<()> {
        self.set_by_name(opt.name(), OptionValue::Integer(value))
    }

    pub fn set_blob(&mut self, opt: Opt, data: &[u8], copy: bool) -> Result<()> {
        self.set_by_name(
            opt.name(),
            OptionValue::Blob {
                data: data.to_vec(),
                copy,
            },
        )
    }

    pub fn set_list(&mut self, opt: Opt, lines: &[&str]) -> Result<()> {
        self.set_by_name(opt.name(), OptionValue::from(lines))
    }

    /// Replaces the custom request headers with `name: value` lines.
    pub fn set_http_headers(&mut self, headers: &[(&str, &str)]) -> Result<()> {
        let lines = headers
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect::<Vec<_>>();
        self.set_by_name(Opt::Httpheader.name(), OptionValue::List(lines))
    }

    /// Sets any option the loaded library knows, including names missing from
    /// the static table.
    pub fn set_by_name(&mut self, name: &str, value: OptionValue) -> Result<()> {
        self.live()?;
        let descriptor = self.registry.resolve(name)?;
        self.apply(&descriptor, value)
    }

    fn apply(&mut self, descriptor: &OptionDescriptor, value: OptionValue) -> Result<()> {
        if let Some(managed) = self.live()?.managed(descriptor.id) {
            return self.apply_managed(managed, descriptor, value);
        }

        let encoded = encoder::encode(descriptor, value)?;
        let engine = self.registry.engine().clone();
        let live = self.live_mut()?;
        let id = descriptor.id;
        match encoded {
            Encoded::Long(v) => live.native.set(id, NativeArg::Long(v)),
            Encoded::OffT(v) => live.native.set(id, NativeArg::OffT(v)),
            Encoded::Text(text) => {
                live.native.set(id, NativeArg::Pointer(text.as_ptr() as *const c_void))?;
                live.retained.insert(id, Retained::Text(text));
                Ok(())
            }
            Encoded::Data(bytes) => {
                live.native.set(id, NativeArg::Pointer(bytes.as_ptr() as *const c_void))?;
                live.retained.insert(id, Retained::Data(bytes));
                Ok(())
            }
            Encoded::Blob(payload) => {
                let record: *const easy_abi::CurlBlob = &*payload.record;
                live.native.set(id, NativeArg::Blob(record))?;
                live.retained.insert(id, Retained::Blob(payload));
                Ok(())
            }
            Encoded::ClearPointer => {
                live.native.set(id, NativeArg::null())?;
                live.retained.remove(&id);
                Ok(())
            }
            Encoded::ClearFunction => live.native.set(id, NativeArg::Function(None)),
            Encoded::List(lines) => {
                // Detach and free the old list before building its replacement.
                live.native.set(id, NativeArg::null())?;
                live.lists.remove(&id);
                if let Some(list) = NativeList::build(&engine, &lines)? {
                    live.native.set(id, NativeArg::Pointer(list.as_ptr() as *const c_void))?;
                    live.lists.insert(id, list);
                }
                Ok(())
            }
            Encoded::ClearList => {
                live.native.set(id, NativeArg::null())?;
                live.lists.remove(&id);
                Ok(())
            }
            Encoded::Observer(_) => Err(EasyError::InvalidArgument(format!(
                "{} cannot be driven by an observer",
                descriptor.name
            ))),
        }
    }

    fn apply_managed(
        &mut self,
        managed: Managed,
        descriptor: &OptionDescriptor,
        value: OptionValue,
    ) -> Result<()> {
        match (managed, value) {
            (Managed::WriteFunction, OptionValue::Observer(observer)) => {
                self.set_write_observer(Some(observer))
            }
            (Managed::WriteFunction, OptionValue::Null) => self.set_write_observer(None),
            (Managed::HeaderFunction, OptionValue::Observer(observer)) => {
                self.set_header_observer(Some(observer))
            }
            (Managed::HeaderFunction, OptionValue::Null) => self.set_header_observer(None),
            (_, value) => Err(EasyError::InvalidArgument(format!(
                "{} is managed by the handle and cannot take a {} value",
                descriptor.name,
                value.kind()
            ))),
        }
    }

    /// Swaps the body observer. The native trampoline is left untouched.
    pub fn set_write_observer(&mut self, observer: Option<Observer>) -> Result<()> {
        self.live_mut()?
            .trampolines
            .bridge_mut()
            .set_body_observer(observer);
        Ok(())
    }

    pub fn set_header_observer(&mut self, observer: Option<Observer>) -> Result<()> {
        self.live_mut()?
            .trampolines
            .bridge_mut()
            .set_header_observer(observer);
        Ok(())
    }

    /// Registers a buffer the engine writes diagnostics into. Buffers below
    /// the native minimum are refused before any native call.
    pub fn set_error_buffer(&mut self, buffer: &ErrorBuffer) -> Result<()> {
        let len = buffer.len();
        if len < ERROR_SIZE {
            return Err(EasyError::InvalidArgument(format!(
                "error buffer must hold at least {} bytes, got {}",
                ERROR_SIZE, len
            )));
        }
        let live = self.live_mut()?;
        live.native.set(
            live.errorbuffer_id,
            NativeArg::Pointer(buffer.as_mut_ptr() as *const c_void),
        )?;
        live.error_buffer = Some(buffer.clone());
        Ok(())
    }

    pub fn clear_error_buffer(&mut self) -> Result<()> {
        let live = self.live_mut()?;
        live.native.set(live.errorbuffer_id, NativeArg::null())?;
        live.error_buffer = None;
        Ok(())
    }

    /// Replaces the multipart body. An empty slice removes it.
    pub fn set_mime_post(&mut self, parts: &[MimePart]) -> Result<()> {
        let engine = self.registry.engine().clone();
        let live = self.live_mut()?;
        live.native.set(live.mimepost_id, NativeArg::null())?;
        live.mime = None;
        if parts.is_empty() {
            return Ok(());
        }
        let form = MimeForm::build(&engine, live.native.as_ptr(), parts)?;
        live.native.set(
            live.mimepost_id,
            NativeArg::Pointer(form.as_ptr() as *const c_void),
        )?;
        live.mime = Some(form);
        Ok(())
    }

    // ---- transfer ------------------------------------------------------

    /// Runs one blocking transfer. Both result buffers are emptied first.
    #[measure_time]
    pub fn perform(&mut self) -> Result<()> {
        let live = self.live_mut()?;
        live.trampolines.bridge_mut().begin_transfer();
        if let Some(buffer) = &live.error_buffer {
            buffer.clear();
        }

        let code = {
            let _guard = live.error_buffer.as_ref().map(|buffer| buffer.lock());
            unsafe { live.native.engine().perform(live.native.as_ptr()) }
        };

        if let Some(fault) = live.trampolines.bridge_mut().take_fault() {
            log_warn!(&format!("transfer stopped by callback bridge: {:?}", fault));
            return Err(match fault {
                Fault::NullChunk => EasyError::NullNativeResult("transfer callback chunk"),
                Fault::Oversized => EasyError::InvalidArgument("oversized transfer chunk".into()),
                Fault::Aborted | Fault::Panicked => EasyError::CallbackAbort {
                    code: if code.is_ok() { Code::WRITE_ERROR } else { code },
                },
            });
        }

        if code.is_ok() {
            log_debug!(&format!(
                "transfer complete: {} body bytes",
                live.trampolines.bridge().body.bytes().len()
            ));
            return Ok(());
        }

        let message = live
            .error_buffer
            .as_ref()
            .and_then(ErrorBuffer::message)
            .unwrap_or_else(|| live.native.engine().strerror(code));
        Err(EasyError::NativeCallFailed {
            call: "curl_easy_perform",
            code,
            message,
        })
    }

    /// Body bytes received by the last transfer.
    pub fn body(&self) -> Result<&[u8]> {
        Ok(self.live()?.trampolines.bridge().body.bytes())
    }

    /// Header map of the last response block of the last transfer.
    pub fn headers(&self) -> Result<&HeaderMap> {
        Ok(self.live()?.trampolines.bridge().header.headers())
    }

    pub fn header_blocks(&self) -> Result<usize> {
        Ok(self.live()?.trampolines.bridge().completed_header_blocks())
    }

    // ---- results -------------------------------------------------------

    pub fn info(&self, info: Info) -> Result<InfoValue> {
        let live = self.live()?;
        unsafe { decoder::decode(live.native.engine(), live.native.as_ptr(), info) }
    }

    fn text_info(&self, info: Info) -> Result<Option<String>> {
        Ok(self.info(info)?.as_text().map(str::to_string))
    }

    fn long_info(&self, info: Info) -> Result<i64> {
        self.info(info)?
            .as_long()
            .ok_or(EasyError::NullNativeResult("long result field"))
    }

    pub fn response_code(&self) -> Result<i64> {
        self.long_info(Info::ResponseCode)
    }

    pub fn effective_url(&self) -> Result<Option<String>> {
        self.text_info(Info::EffectiveUrl)
    }

    pub fn effective_method(&self) -> Result<Option<String>> {
        self.text_info(Info::EffectiveMethod)
    }

    pub fn content_type(&self) -> Result<Option<String>> {
        self.text_info(Info::ContentType)
    }

    pub fn scheme(&self) -> Result<Option<String>> {
        self.text_info(Info::Scheme)
    }

    pub fn primary_ip(&self) -> Result<Option<String>> {
        self.text_info(Info::PrimaryIp)
    }

    pub fn primary_port(&self) -> Result<i64> {
        self.long_info(Info::PrimaryPort)
    }

    pub fn local_ip(&self) -> Result<Option<String>> {
        self.text_info(Info::LocalIp)
    }

    pub fn local_port(&self) -> Result<i64> {
        self.long_info(Info::LocalPort)
    }

    pub fn cookie_list(&self) -> Result<Vec<String>> {
        Ok(self.info(Info::Cookielist)?.into_list().unwrap_or_default())
    }

    pub fn http_version(&self) -> Result<Option<HttpVersion>> {
        Ok(HttpVersion::from_long(self.long_info(Info::HttpVersion)?))
    }

    pub fn tls_session(&self) -> Result<Option<TlsSession>> {
        match self.info(Info::TlsSslPtr)? {
            InfoValue::TlsSession(session) => Ok(session),
            _ => Ok(None),
        }
    }

    pub fn cert_info(&self) -> Result<Vec<Certificate>> {
        match self.info(Info::Certinfo)? {
            InfoValue::CertInfo(certs) => Ok(certs),
            _ => Ok(Vec::new()),
        }
    }

    /// Every timing field in both native units.
    pub fn timings(&self) -> Result<Timings> {
        let pair = |seconds: Info, micros: Info| -> Result<Timing> {
            Ok(Timing {
                seconds: self.info(seconds)?.as_double().unwrap_or_default(),
                micros: self.info(micros)?.as_off_t().unwrap_or_default(),
            })
        };
        Ok(Timings {
            namelookup: pair(Info::NamelookupTime, Info::NamelookupTimeT)?,
            connect: pair(Info::ConnectTime, Info::ConnectTimeT)?,
            appconnect: pair(Info::AppconnectTime, Info::AppconnectTimeT)?,
            pretransfer: pair(Info::PretransferTime, Info::PretransferTimeT)?,
            starttransfer: pair(Info::StarttransferTime, Info::StarttransferTimeT)?,
            total: pair(Info::TotalTime, Info::TotalTimeT)?,
            redirect: pair(Info::RedirectTime, Info::RedirectTimeT)?,
        })
    }

    // ---- maintenance ---------------------------------------------------

    /// Percent-encodes `input` through the native library.
    pub fn escape(&self, input: &str) -> Result<String> {
        let live = self.live()?;
        let engine = live.native.engine();
        let raw = unsafe { engine.escape(live.native.as_ptr(), input.as_bytes()) };
        if raw.is_null() {
            return Err(EasyError::NullNativeResult("curl_easy_escape"));
        }
        let escaped = unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned();
        unsafe { engine.free(raw as *mut c_void) };
        Ok(escaped)
    }

    /// Returns every option to its default, frees lists, the multipart form
    /// and retained buffers, forgets observers and the error buffer, then
    /// reinstalls the trampolines.
    #[log_entry_exit]
    pub fn reset(&mut self) -> Result<()> {
        let live = self.live_mut()?;
        unsafe { live.native.engine().reset_handle(live.native.as_ptr()) };
        live.lists.clear();
        live.mime = None;
        live.retained.clear();
        live.error_buffer = None;

        let bridge = live.trampolines.bridge_mut();
        bridge.set_body_observer(None);
        bridge.set_header_observer(None);
        bridge.begin_transfer();
        live.trampolines.install(&live.native)
    }

    /// Frees every native resource of this handle. Later calls are no-ops.
    pub fn release(&mut self) {
        let Some(mut live) = self.live.take() else {
            return;
        };

        for (id, list) in live.lists.drain() {
            let _ = live.native.set(id, NativeArg::null());
            drop(list);
        }
        if let Some(form) = live.mime.take() {
            let _ = live.native.set(live.mimepost_id, NativeArg::null());
            drop(form);
        }
        live.trampolines.uninstall(&live.native);

        let Live {
            native,
            trampolines,
            retained,
            error_buffer,
            ..
        } = live;
        drop(trampolines);
        drop(native);
        drop(retained);
        drop(error_buffer);
    }
}

impl<E: NativeEngine> Drop for EasyHandle<E> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<E: NativeEngine> std::fmt::Debug for EasyHandle<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EasyHandle")
            .field("released", &self.is_released())
            .finish()
    }
}
