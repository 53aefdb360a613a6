/*
 * In-memory engine that behaves like the native library for everything the
 * binding relies on, and records every call made into it.
 *
 * Option ids are deliberately unrelated to libcurl's, so any code path that
 * hardcodes ids instead of resolving names fails against it. Lists, multipart
 * forms and escaped strings are real heap allocations with live counters, so
 * leaks and double frees are observable. A transfer replays a `Script`
 * through whatever trampolines are installed.
 */

use std::collections::{HashMap, HashSet};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_void};
use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicIsize, Ordering};
use std::sync::Mutex;

use easy_abi::{
    CurlCertInfo, CurlEasyOption, CurlHandle, CurlMime, CurlMimePart, CurlSlist,
    CurlTlsSessionInfo, InfoSlot, WriteCallback, CURLOT_FLAG_ALIAS, CURLOT_LONG, ERROR_SIZE,
};
use easy_core::{Code, Info, Opt, SslBackend, SslSet};

use crate::decoder::walk_list;
use crate::native::{NativeArg, NativeEngine};

/// First id handed out by the scripted option table.
pub const SCRIPTED_ID_BASE: u32 = 70_000;

/// Legacy names served as aliases of the option they stand for, as the
/// native table does.
const ALIASES: &[(&str, &str)] = &[
    ("ENCODING", "ACCEPT_ENCODING"),
    ("FILE", "WRITEDATA"),
    ("WRITEHEADER", "HEADERDATA"),
];

/// Extra option only this engine knows: when set to 1 the response body is a
/// rendering of the request instead of the scripted chunks.
pub const ECHO_REQUEST: &str = "ECHO_REQUEST";

/// One canned transfer.
#[derive(Debug, Clone)]
pub struct Script {
    pub status: i64,
    /// Raw header lines exactly as the native engine would deliver them,
    /// including status lines and blank block separators.
    pub header_lines: Vec<String>,
    pub body_chunks: Vec<Vec<u8>>,
    /// Status `perform` returns; anything but OK skips the callbacks.
    pub result: Code,
    /// Written into a registered error buffer when the transfer fails.
    pub error_message: Option<String>,
    /// Deliver one body chunk with a null data pointer first.
    pub null_body_chunk: bool,
    pub content_type: Option<String>,
    pub http_version: i64,
    pub total_micros: i64,
    pub primary_ip: String,
    pub primary_port: i64,
    pub socket: Option<i32>,
    pub tls_backend: Option<SslBackend>,
    pub certificates: Vec<Vec<String>>,
}

impl Default for Script {
    fn default() -> Self {
        Script {
            status: 200,
            header_lines: Vec::new(),
            body_chunks: Vec::new(),
            result: Code::OK,
            error_message: None,
            null_body_chunk: false,
            content_type: None,
            http_version: 2,
            total_micros: 12_345,
            primary_ip: "127.0.0.1".to_string(),
            primary_port: 80,
            socket: None,
            tls_backend: None,
            certificates: Vec::new(),
        }
    }
}

impl Script {
    /// A single response block with one body chunk.
    pub fn ok(status: i64, headers: &[(&str, &str)], body: &[u8]) -> Self {
        let mut script = Script {
            status,
            ..Script::default()
        };
        script = script.header_block(status, headers);
        if !body.is_empty() {
            script.body_chunks.push(body.to_vec());
        }
        script
    }

    pub fn failing(result: Code, message: &str) -> Self {
        Script {
            result,
            error_message: Some(message.to_string()),
            ..Script::default()
        }
    }

    /// Appends a status line, the given fields and the closing blank line.
    pub fn header_block(mut self, status: i64, headers: &[(&str, &str)]) -> Self {
        self.header_lines.push(format!("HTTP/1.1 {} Scripted\r\n", status));
        for (name, value) in headers {
            if name.eq_ignore_ascii_case("content-type") {
                self.content_type = Some(value.to_string());
            }
            self.header_lines.push(format!("{}: {}\r\n", name, value));
        }
        self.header_lines.push("\r\n".to_string());
        self
    }

    pub fn chunks(mut self, chunks: &[&[u8]]) -> Self {
        self.body_chunks = chunks.iter().map(|c| c.to_vec()).collect();
        self
    }

    fn cookies(&self) -> Vec<String> {
        self.header_lines
            .iter()
            .filter_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.trim()
                    .eq_ignore_ascii_case("set-cookie")
                    .then(|| value.trim().to_string())
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Stored {
    Long(i64),
    OffT(i64),
    Pointer(usize),
    Function(Option<WriteCallback>),
}

struct CertStorage {
    record: Box<CurlCertInfo>,
    chains: Vec<*mut CurlSlist>,
}

/// State behind one scripted native handle.
struct ScriptedHandle {
    values: HashMap<u32, Stored>,
    /// Options the real library copies on set.
    copied: HashMap<u32, Vec<u8>>,
    info_text: HashMap<u32, CString>,
    info_long: HashMap<u32, i64>,
    info_double: HashMap<u32, f64>,
    info_off_t: HashMap<u32, i64>,
    cookies: Vec<String>,
    tls: Option<Box<CurlTlsSessionInfo>>,
    certs: Option<CertStorage>,
    socket: Option<i32>,
}

impl ScriptedHandle {
    fn new() -> Self {
        ScriptedHandle {
            values: HashMap::new(),
            copied: HashMap::new(),
            info_text: HashMap::new(),
            info_long: HashMap::new(),
            info_double: HashMap::new(),
            info_off_t: HashMap::new(),
            cookies: Vec::new(),
            tls: None,
            certs: None,
            socket: None,
        }
    }
}

struct ScriptedMime {
    parts: Vec<Box<ScriptedPart>>,
}

#[derive(Default)]
struct ScriptedPart {
    name: String,
    filename: Option<String>,
    mime_type: Option<String>,
    data: Vec<u8>,
    headers: Vec<String>,
    subparts: Option<*mut ScriptedMime>,
}

pub struct ScriptedEngine {
    options: Vec<CurlEasyOption>,
    _names: Vec<CString>,
    script: Mutex<Script>,
    calls: Mutex<HashMap<&'static str, usize>>,
    handles: AtomicIsize,
    list_nodes: AtomicIsize,
    mimes: AtomicIsize,
    escapes: Mutex<HashSet<usize>>,
    initialized: AtomicBool,
    backends: Vec<SslBackend>,
    selected_backend: Mutex<Option<SslBackend>>,
}

// The option table is immutable after construction; everything else is
// behind a lock or an atomic.
unsafe impl Send for ScriptedEngine {}
unsafe impl Sync for ScriptedEngine {}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedEngine {
    pub fn new() -> Self {
        let mut entries: Vec<(String, u32, u32, u32)> = Opt::ALL
            .iter()
            .enumerate()
            .map(|(idx, opt)| {
                (opt.name().to_string(), SCRIPTED_ID_BASE + idx as u32, opt.category().native(), 0)
            })
            .collect();
        let next_id = SCRIPTED_ID_BASE + entries.len() as u32;
        entries.push((ECHO_REQUEST.to_string(), next_id, CURLOT_LONG, 0));
        for (alias, target) in ALIASES {
            if let Some(target) = entries.iter().find(|e| e.0 == *target).cloned() {
                entries.push((alias.to_string(), target.1, target.2, CURLOT_FLAG_ALIAS));
            }
        }

        let mut names = Vec::with_capacity(entries.len());
        let mut options = Vec::with_capacity(entries.len());
        for (name, id, kind, flags) in entries {
            let name = CString::new(name).unwrap_or_default();
            options.push(CurlEasyOption {
                name: name.as_ptr(),
                id,
                kind,
                flags,
            });
            // The CString's heap buffer does not move when the CString does.
            names.push(name);
        }

        ScriptedEngine {
            options,
            _names: names,
            script: Mutex::new(Script::default()),
            calls: Mutex::new(HashMap::new()),
            handles: AtomicIsize::new(0),
            list_nodes: AtomicIsize::new(0),
            mimes: AtomicIsize::new(0),
            escapes: Mutex::new(HashSet::new()),
            initialized: AtomicBool::new(false),
            backends: vec![SslBackend::OpenSsl, SslBackend::Rustls],
            selected_backend: Mutex::new(None),
        }
    }

    pub fn with_script(script: Script) -> Self {
        let engine = Self::new();
        engine.set_script(script);
        engine
    }

    pub fn set_script(&self, script: Script) {
        *lock(&self.script) = script;
    }

    /// Number of times the named native entry point was called.
    pub fn calls(&self, name: &str) -> usize {
        lock(&self.calls).get(name).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.calls).values().sum()
    }

    pub fn live_handles(&self) -> isize {
        self.handles.load(Ordering::SeqCst)
    }

    pub fn live_list_nodes(&self) -> isize {
        self.list_nodes.load(Ordering::SeqCst)
    }

    pub fn live_mimes(&self) -> isize {
        self.mimes.load(Ordering::SeqCst)
    }

    pub fn live_escapes(&self) -> usize {
        lock(&self.escapes).len()
    }

    pub fn selected_backend(&self) -> Option<SslBackend> {
        *lock(&self.selected_backend)
    }

    /// Scripted id of an option, for tests that want to poke the table.
    pub fn option_id(&self, name: &str) -> Option<u32> {
        self.options
            .iter()
            .find(|o| o.flags & CURLOT_FLAG_ALIAS == 0 && self.name_of(o) == name)
            .map(|o| o.id)
    }

    fn record(&self, call: &'static str) {
        *lock(&self.calls).entry(call).or_insert(0) += 1;
    }

    fn name_of(&self, option: &CurlEasyOption) -> &str {
        unsafe { CStr::from_ptr(option.name) }.to_str().unwrap_or("")
    }

    fn id(&self, name: &str) -> u32 {
        self.option_id(name).unwrap_or(u32::MAX)
    }

    fn new_node(&self, line: &CStr) -> *mut CurlSlist {
        self.list_nodes.fetch_add(1, Ordering::SeqCst);
        Box::into_raw(Box::new(CurlSlist {
            data: line.to_owned().into_raw(),
            next: ptr::null_mut(),
        }))
    }

    unsafe fn build_list(&self, lines: &[String]) -> *mut CurlSlist {
        let mut head = ptr::null_mut();
        for line in lines {
            let line = CString::new(line.as_str()).unwrap_or_default();
            head = self.append_node(head, &line);
        }
        head
    }

    unsafe fn append_node(&self, list: *mut CurlSlist, line: &CStr) -> *mut CurlSlist {
        let node = self.new_node(line);
        if list.is_null() {
            return node;
        }
        let mut tail = list;
        while !(*tail).next.is_null() {
            tail = (*tail).next;
        }
        (*tail).next = node;
        list
    }

    unsafe fn free_list(&self, list: *mut CurlSlist) {
        let mut node = list;
        while !node.is_null() {
            let owned = Box::from_raw(node);
            drop(CString::from_raw(owned.data));
            node = owned.next;
            self.list_nodes.fetch_sub(1, Ordering::SeqCst);
        }
    }

    unsafe fn free_mime(&self, mime: *mut ScriptedMime) {
        let mime = Box::from_raw(mime);
        for part in mime.parts {
            if let Some(sub) = part.subparts {
                self.free_mime(sub);
            }
        }
        self.mimes.fetch_sub(1, Ordering::SeqCst);
    }

    unsafe fn text_option(&self, state: &ScriptedHandle, name: &str) -> Option<String> {
        let id = self.id(name);
        if let Some(bytes) = state.copied.get(&id) {
            return Some(String::from_utf8_lossy(bytes).into_owned());
        }
        match state.values.get(&id) {
            Some(Stored::Pointer(addr)) if *addr != 0 => Some(
                CStr::from_ptr(*addr as *const c_char)
                    .to_string_lossy()
                    .into_owned(),
            ),
            _ => None,
        }
    }

    fn long_option(&self, state: &ScriptedHandle, name: &str) -> i64 {
        match state.values.get(&self.id(name)) {
            Some(Stored::Long(v)) | Some(Stored::OffT(v)) => *v,
            _ => 0,
        }
    }

    fn pointer_option(&self, state: &ScriptedHandle, name: &str) -> *mut c_void {
        match state.values.get(&self.id(name)) {
            Some(Stored::Pointer(addr)) => *addr as *mut c_void,
            _ => ptr::null_mut(),
        }
    }

    fn function_option(&self, state: &ScriptedHandle, name: &str) -> Option<WriteCallback> {
        match state.values.get(&self.id(name)) {
            Some(Stored::Function(f)) => *f,
            _ => None,
        }
    }

    unsafe fn write_error(&self, state: &ScriptedHandle, message: &str) {
        let target = self.pointer_option(state, "ERRORBUFFER") as *mut u8;
        if target.is_null() {
            return;
        }
        let len = message.len().min(ERROR_SIZE - 1);
        ptr::copy_nonoverlapping(message.as_ptr(), target, len);
        *target.add(len) = 0;
    }

    unsafe fn method(&self, state: &ScriptedHandle) -> String {
        if let Some(custom) = self.text_option(state, "CUSTOMREQUEST") {
            return custom;
        }
        let posting = !self.pointer_option(state, "MIMEPOST").is_null()
            || !self.pointer_option(state, "POSTFIELDS").is_null()
            || state.copied.contains_key(&self.id("COPYPOSTFIELDS"))
            || self.long_option(state, "POST") != 0;
        if posting {
            "POST".to_string()
        } else if self.long_option(state, "NOBODY") != 0 {
            "HEAD".to_string()
        } else {
            "GET".to_string()
        }
    }

    /// Text rendering of the request the handle would send.
    unsafe fn render_request(&self, state: &ScriptedHandle, url: &str) -> Vec<u8> {
        let mut out = format!("{} {}\n", self.method(state), url);
        if let Some(agent) = self.text_option(state, "USERAGENT") {
            out.push_str(&format!("User-Agent: {}\n", agent));
        }
        let headers = self.pointer_option(state, "HTTPHEADER") as *const CurlSlist;
        for line in walk_list(headers) {
            out.push_str(&line);
            out.push('\n');
        }
        let mime = self.pointer_option(state, "MIMEPOST") as *const ScriptedMime;
        if !mime.is_null() {
            render_mime(&*mime, 0, &mut out);
        }
        if let Some(fields) = self.text_option(state, "COPYPOSTFIELDS") {
            out.push_str(&format!("\n{}", fields));
        } else if let Some(fields) = self.text_option(state, "POSTFIELDS") {
            out.push_str(&format!("\n{}", fields));
        }
        out.into_bytes()
    }

    unsafe fn deliver(
        callback: Option<WriteCallback>,
        userdata: *mut c_void,
        data: *const u8,
        len: usize,
    ) -> bool {
        match callback {
            Some(f) => f(data as *mut c_char, 1, len, userdata) == len,
            None => true,
        }
    }

    unsafe fn finish(&self, state: &mut ScriptedHandle, script: &Script, url: &str) {
        let method = self.method(state);
        let scheme = url.split_once("://").map(|(s, _)| s.to_string()).unwrap_or_default();

        state.info_text.clear();
        let mut text = |info: Info, value: &str| {
            if let Ok(value) = CString::new(value) {
                state.info_text.insert(info.id(), value);
            }
        };
        text(Info::EffectiveUrl, url);
        text(Info::EffectiveMethod, &method);
        text(Info::Scheme, &scheme);
        text(Info::PrimaryIp, &script.primary_ip);
        text(Info::LocalIp, "127.0.0.1");
        if let Some(content_type) = &script.content_type {
            text(Info::ContentType, content_type);
        }

        state.info_long.clear();
        state.info_long.insert(Info::ResponseCode.id(), script.status);
        state.info_long.insert(Info::HttpVersion.id(), script.http_version);
        state.info_long.insert(Info::PrimaryPort.id(), script.primary_port);
        state.info_long.insert(Info::LocalPort.id(), 54_321);
        state.info_long.insert(Info::NumConnects.id(), 1);

        state.info_double.clear();
        state.info_off_t.clear();
        for (share, (seconds, micros)) in [1, 2, 3, 4, 6, 8, 0].into_iter().zip(Info::TIMING_PAIRS) {
            let value = script.total_micros * share / 8;
            state.info_off_t.insert(micros.id(), value);
            state.info_double.insert(seconds.id(), value as f64 / 1_000_000.0);
        }
        let downloaded: usize = script.body_chunks.iter().map(Vec::len).sum();
        state.info_off_t.insert(Info::SizeDownloadT.id(), downloaded as i64);

        state.cookies = script.cookies();
        state.socket = script.socket;
        state.tls = script.tls_backend.map(|backend| {
            Box::new(CurlTlsSessionInfo {
                backend: backend.id(),
                internals: ptr::null_mut(),
            })
        });
        if let Some(old) = state.certs.take() {
            for chain in old.chains {
                self.free_list(chain);
            }
        }
        if !script.certificates.is_empty() {
            let mut chains: Vec<*mut CurlSlist> = script
                .certificates
                .iter()
                .map(|lines| self.build_list(lines))
                .collect();
            let record = Box::new(CurlCertInfo {
                num_of_certs: chains.len() as i32,
                certinfo: chains.as_mut_ptr(),
            });
            state.certs = Some(CertStorage {
                record,
                chains,
            });
        }
    }

    unsafe fn state<'a>(handle: *mut CurlHandle) -> &'a mut ScriptedHandle {
        &mut *(handle as *mut ScriptedHandle)
    }
}

fn render_mime(mime: &ScriptedMime, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for part in &mime.parts {
        out.push_str(&format!("{}part name={}", indent, part.name));
        if let Some(filename) = &part.filename {
            out.push_str(&format!(" filename={}", filename));
        }
        if let Some(mime_type) = &part.mime_type {
            out.push_str(&format!(" type={}", mime_type));
        }
        out.push_str(&format!(" len={}\n", part.data.len()));
        for header in &part.headers {
            out.push_str(&format!("{}  {}\n", indent, header));
        }
        if let Some(sub) = part.subparts {
            render_mime(unsafe { &*sub }, depth + 1, out);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn strerror_text(code: Code) -> String {
    match code {
        Code::OK => "No error".to_string(),
        Code::URL_MALFORMAT => "URL using bad/illegal format or missing URL".to_string(),
        Code::COULDNT_CONNECT => "Couldn't connect to server".to_string(),
        Code::WRITE_ERROR => "Failed writing received data to disk/application".to_string(),
        Code::OPERATION_TIMEDOUT => "Timeout was reached".to_string(),
        Code::BAD_FUNCTION_ARGUMENT => "A libcurl function was given a bad argument".to_string(),
        Code::UNKNOWN_OPTION => "An unknown option was passed in to libcurl".to_string(),
        other => format!("Scripted failure {}", other),
    }
}

impl NativeEngine for ScriptedEngine {
    fn global_init(&self, _flags: i64) -> Code {
        self.record("curl_global_init");
        self.initialized.store(true, Ordering::SeqCst);
        Code::OK
    }

    fn global_cleanup(&self) {
        self.record("curl_global_cleanup");
        self.initialized.store(false, Ordering::SeqCst);
    }

    fn global_sslset(&self, backend_id: i32, name: Option<&CStr>) -> SslSet {
        self.record("curl_global_sslset");
        if self.initialized.load(Ordering::SeqCst) {
            return SslSet::TooLate;
        }
        let wanted = match name {
            Some(name) => SslBackend::from_name(&name.to_string_lossy()),
            None => Some(SslBackend::from_id(backend_id)),
        };
        match wanted.filter(|backend| self.backends.contains(backend)) {
            Some(backend) => {
                *lock(&self.selected_backend) = Some(backend);
                SslSet::Ok
            }
            None => SslSet::UnknownBackend,
        }
    }

    fn version(&self) -> String {
        self.record("curl_version");
        "scripted/1.0".to_string()
    }

    fn strerror(&self, code: Code) -> String {
        self.record("curl_easy_strerror");
        strerror_text(code)
    }

    fn option_by_name(&self, name: &CStr) -> *const CurlEasyOption {
        self.record("curl_easy_option_by_name");
        let wanted = name.to_string_lossy();
        self.options
            .iter()
            .find(|o| self.name_of(o).eq_ignore_ascii_case(&wanted))
            .map_or(ptr::null(), |o| o as *const CurlEasyOption)
    }

    fn option_by_id(&self, id: u32) -> *const CurlEasyOption {
        self.record("curl_easy_option_by_id");
        self.options
            .iter()
            .find(|o| o.id == id && o.flags & CURLOT_FLAG_ALIAS == 0)
            .map_or(ptr::null(), |o| o as *const CurlEasyOption)
    }

    fn create_handle(&self) -> *mut CurlHandle {
        self.record("curl_easy_init");
        self.handles.fetch_add(1, Ordering::SeqCst);
        Box::into_raw(Box::new(ScriptedHandle::new())) as *mut CurlHandle
    }

    unsafe fn destroy_handle(&self, handle: *mut CurlHandle) {
        self.record("curl_easy_cleanup");
        let mut state = Box::from_raw(handle as *mut ScriptedHandle);
        if let Some(certs) = state.certs.take() {
            for chain in certs.chains {
                self.free_list(chain);
            }
        }
        self.handles.fetch_sub(1, Ordering::SeqCst);
    }

    unsafe fn reset_handle(&self, handle: *mut CurlHandle) {
        self.record("curl_easy_reset");
        let state = Self::state(handle);
        state.values.clear();
        state.copied.clear();
    }

    unsafe fn set_option(&self, handle: *mut CurlHandle, id: u32, arg: NativeArg) -> Code {
        self.record("curl_easy_setopt");
        if !self.options.iter().any(|o| o.id == id) {
            return Code::UNKNOWN_OPTION;
        }
        let state = Self::state(handle);
        state.copied.remove(&id);
        let stored = match arg {
            NativeArg::Long(v) => Stored::Long(v),
            NativeArg::OffT(v) => Stored::OffT(v),
            NativeArg::Function(f) => Stored::Function(f),
            NativeArg::Pointer(p) => {
                if id == self.id("COPYPOSTFIELDS") && !p.is_null() {
                    let bytes = CStr::from_ptr(p as *const c_char).to_bytes().to_vec();
                    state.copied.insert(id, bytes);
                }
                Stored::Pointer(p as usize)
            }
            NativeArg::Blob(record) => match record.as_ref() {
                Some(blob) if blob.copies() => {
                    let bytes = std::slice::from_raw_parts(blob.data as *const u8, blob.len);
                    state.copied.insert(id, bytes.to_vec());
                    Stored::Pointer(0)
                }
                Some(blob) => Stored::Pointer(blob.data as usize),
                None => Stored::Pointer(0),
            },
        };
        state.values.insert(id, stored);
        Code::OK
    }

    unsafe fn perform(&self, handle: *mut CurlHandle) -> Code {
        self.record("curl_easy_perform");
        let script = lock(&self.script).clone();
        let state = Self::state(handle);

        let Some(url) = self.text_option(state, "URL") else {
            self.write_error(state, "No URL set");
            return Code::URL_MALFORMAT;
        };
        if !script.result.is_ok() {
            let message = script.error_message.clone().unwrap_or_else(|| strerror_text(script.result));
            self.write_error(state, &message);
            return script.result;
        }

        let header_fn = self.function_option(state, "HEADERFUNCTION");
        let header_data = self.pointer_option(state, "HEADERDATA");
        for line in &script.header_lines {
            if !Self::deliver(header_fn, header_data, line.as_ptr(), line.len()) {
                self.write_error(state, "Failed writing header");
                return Code::WRITE_ERROR;
            }
        }

        let write_fn = self.function_option(state, "WRITEFUNCTION");
        let write_data = self.pointer_option(state, "WRITEDATA");
        if script.null_body_chunk && !Self::deliver(write_fn, write_data, ptr::null(), 8) {
            self.write_error(state, "Failure writing output to destination");
            return Code::WRITE_ERROR;
        }
        let chunks = if self.long_option(state, ECHO_REQUEST) == 1 {
            vec![self.render_request(state, &url)]
        } else {
            script.body_chunks.clone()
        };
        for chunk in &chunks {
            if !Self::deliver(write_fn, write_data, chunk.as_ptr(), chunk.len()) {
                self.write_error(state, "Failure writing output to destination");
                return Code::WRITE_ERROR;
            }
        }

        self.finish(state, &script, &url);
        Code::OK
    }

    unsafe fn get_info(&self, handle: *mut CurlHandle, id: u32, slot: &mut InfoSlot) -> Code {
        self.record("curl_easy_getinfo");
        let state = Self::state(handle);
        let Some(info) = Info::from_id(id) else {
            return Code::UNKNOWN_OPTION;
        };
        match info {
            Info::Cookielist => {
                let list = self.build_list(&state.cookies);
                slot.write_ptr(list);
            }
            Info::Certinfo => match &state.certs {
                Some(certs) => slot.write_ptr(&*certs.record as *const CurlCertInfo),
                None => slot.write_ptr(ptr::null::<CurlCertInfo>()),
            },
            Info::TlsSslPtr => match &state.tls {
                Some(tls) => slot.write_ptr(&**tls as *const CurlTlsSessionInfo),
                None => slot.write_ptr(ptr::null::<CurlTlsSessionInfo>()),
            },
            Info::Activesocket => {
                #[cfg(unix)]
                slot.write_int(state.socket.unwrap_or(-1));
                #[cfg(windows)]
                slot.write_off_t(state.socket.map_or(-1, i64::from));
            }
            Info::Private => slot.write_ptr(self.pointer_option(state, "PRIVATE") as *const c_char),
            Info::SslEngines => slot.write_ptr(ptr::null::<CurlSlist>()),
            _ => {
                if let Some(text) = state.info_text.get(&id) {
                    slot.write_ptr(text.as_ptr());
                } else if let Some(v) = state.info_long.get(&id) {
                    slot.write_long(*v);
                } else if let Some(v) = state.info_double.get(&id) {
                    slot.write_double(*v);
                } else if let Some(v) = state.info_off_t.get(&id) {
                    slot.write_off_t(*v);
                } else {
                    *slot = InfoSlot::default();
                }
            }
        }
        Code::OK
    }

    unsafe fn slist_append(&self, list: *mut CurlSlist, line: &CStr) -> *mut CurlSlist {
        self.record("curl_slist_append");
        self.append_node(list, line)
    }

    unsafe fn slist_free_all(&self, list: *mut CurlSlist) {
        self.record("curl_slist_free_all");
        self.free_list(list);
    }

    unsafe fn mime_init(&self, _handle: *mut CurlHandle) -> *mut CurlMime {
        self.record("curl_mime_init");
        self.mimes.fetch_add(1, Ordering::SeqCst);
        Box::into_raw(Box::new(ScriptedMime { parts: Vec::new() })) as *mut CurlMime
    }

    unsafe fn mime_add_part(&self, mime: *mut CurlMime) -> *mut CurlMimePart {
        self.record("curl_mime_addpart");
        let mime = &mut *(mime as *mut ScriptedMime);
        mime.parts.push(Box::default());
        match mime.parts.last_mut() {
            Some(part) => &mut **part as *mut ScriptedPart as *mut CurlMimePart,
            None => ptr::null_mut(),
        }
    }

    unsafe fn mime_name(&self, part: *mut CurlMimePart, name: &CStr) -> Code {
        self.record("curl_mime_name");
        (*(part as *mut ScriptedPart)).name = name.to_string_lossy().into_owned();
        Code::OK
    }

    unsafe fn mime_filename(&self, part: *mut CurlMimePart, filename: &CStr) -> Code {
        self.record("curl_mime_filename");
        (*(part as *mut ScriptedPart)).filename = Some(filename.to_string_lossy().into_owned());
        Code::OK
    }

    unsafe fn mime_type(&self, part: *mut CurlMimePart, mime_type: &CStr) -> Code {
        self.record("curl_mime_type");
        (*(part as *mut ScriptedPart)).mime_type = Some(mime_type.to_string_lossy().into_owned());
        Code::OK
    }

    unsafe fn mime_data(&self, part: *mut CurlMimePart, data: &[u8]) -> Code {
        self.record("curl_mime_data");
        (*(part as *mut ScriptedPart)).data = data.to_vec();
        Code::OK
    }

    unsafe fn mime_headers(
        &self,
        part: *mut CurlMimePart,
        headers: *mut CurlSlist,
        take_ownership: bool,
    ) -> Code {
        self.record("curl_mime_headers");
        (*(part as *mut ScriptedPart)).headers = walk_list(headers);
        if take_ownership {
            self.free_list(headers);
        }
        Code::OK
    }

    unsafe fn mime_subparts(&self, part: *mut CurlMimePart, subparts: *mut CurlMime) -> Code {
        self.record("curl_mime_subparts");
        let part = &mut *(part as *mut ScriptedPart);
        if let Some(old) = part.subparts.take() {
            self.free_mime(old);
        }
        part.subparts = Some(subparts as *mut ScriptedMime);
        Code::OK
    }

    unsafe fn mime_free(&self, mime: *mut CurlMime) {
        self.record("curl_mime_free");
        if !mime.is_null() {
            self.free_mime(mime as *mut ScriptedMime);
        }
    }

    unsafe fn escape(&self, _handle: *mut CurlHandle, input: &[u8]) -> *mut c_char {
        self.record("curl_easy_escape");
        let mut out = String::with_capacity(input.len() * 3);
        for byte in input {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                    out.push(*byte as char)
                }
                other => out.push_str(&format!("%{:02X}", other)),
            }
        }
        let raw = CString::new(out).unwrap_or_default().into_raw();
        lock(&self.escapes).insert(raw as usize);
        raw
    }

    unsafe fn free(&self, ptr: *mut c_void) {
        self.record("curl_free");
        if lock(&self.escapes).remove(&(ptr as usize)) {
            drop(CString::from_raw(ptr as *mut c_char));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_table_uses_its_own_ids() {
        let engine = ScriptedEngine::new();
        let url = engine.option_id("URL").unwrap();
        assert!(url >= SCRIPTED_ID_BASE);
        assert_ne!(url, 10002);
        assert!(engine.option_id(ECHO_REQUEST).is_some());
        assert_eq!(engine.option_id("ENCODING"), None);
        assert_eq!(engine.option_id("FILE"), None);
    }

    #[test]
    fn lists_are_counted() {
        let engine = ScriptedEngine::new();
        let a = CString::new("a").unwrap();
        let b = CString::new("b").unwrap();
        unsafe {
            let list = engine.slist_append(ptr::null_mut(), &a);
            let list = engine.slist_append(list, &b);
            assert_eq!(walk_list(list), vec!["a".to_string(), "b".to_string()]);
            assert_eq!(engine.live_list_nodes(), 2);
            engine.slist_free_all(list);
        }
        assert_eq!(engine.live_list_nodes(), 0);
    }

    #[test]
    fn sslset_is_too_late_after_init() {
        let engine = ScriptedEngine::new();
        assert_eq!(engine.global_sslset(14, None), SslSet::Ok);
        assert_eq!(engine.selected_backend(), Some(SslBackend::Rustls));
        let gnutls = CString::new("gnutls").unwrap();
        assert_eq!(engine.global_sslset(-1, Some(&gnutls)), SslSet::UnknownBackend);
        engine.global_init(3);
        assert_eq!(engine.global_sslset(1, None), SslSet::TooLate);
    }
}
