/*
 * Callback bridge between the native engine and caller logic.
 *
 * Two native-callable trampolines are installed once per handle. Each one
 * forwards into a sink living at a stable heap address: the sink copies every
 * chunk out of native memory, accumulates it for the running transfer and
 * hands it to an optional, freely swappable observer.
 *
 * Nothing here logs: trampolines run inside the native transfer loop.
 */

use std::ops::ControlFlow;
use std::os::raw::{c_char, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};

use easy_core::{HeaderMap, Observer};

/// Header names whose history survives the reset between response blocks.
pub const CUMULATIVE_HEADERS: &[&str] = &["Set-Cookie"];

/// Why a trampoline refused a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The native layer passed a null data pointer.
    NullChunk,
    /// `size * nmemb` overflowed.
    Oversized,
    /// The observer returned `ControlFlow::Break`.
    Aborted,
    /// The observer panicked; the panic was stopped at the FFI boundary.
    Panicked,
}

#[derive(Default)]
pub struct BodySink {
    buffer: Vec<u8>,
    observer: Option<Observer>,
    fault: Option<Fault>,
}

impl BodySink {
    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    fn receive(&mut self, chunk: &[u8]) -> ControlFlow<Fault> {
        self.buffer.extend_from_slice(chunk);
        forward(&mut self.observer, chunk)
    }
}

#[derive(Default)]
pub struct HeaderSink {
    collector: HeaderCollector,
    observer: Option<Observer>,
    fault: Option<Fault>,
}

impl HeaderSink {
    pub fn headers(&self) -> &HeaderMap {
        self.collector.headers()
    }

    fn receive(&mut self, line: &[u8]) -> ControlFlow<Fault> {
        self.collector.accept_line(line);
        forward(&mut self.observer, line)
    }
}

fn forward(observer: &mut Option<Observer>, chunk: &[u8]) -> ControlFlow<Fault> {
    let Some(observer) = observer.as_mut() else {
        return ControlFlow::Continue(());
    };
    match catch_unwind(AssertUnwindSafe(|| observer(chunk))) {
        Ok(ControlFlow::Continue(())) => ControlFlow::Continue(()),
        Ok(ControlFlow::Break(())) => ControlFlow::Break(Fault::Aborted),
        Err(_) => ControlFlow::Break(Fault::Panicked),
    }
}

/// Parses streamed header lines into a multimap, one response block at a
/// time.
///
/// A blank line closes the current block. The next block's first line (the
/// status line of a redirect hop, usually) clears every field except the
/// cumulative ones, so the final block stays readable once the transfer ends.
#[derive(Debug, Default)]
pub struct HeaderCollector {
    map: HeaderMap,
    block_complete: bool,
    blocks: usize,
}

impl HeaderCollector {
    pub fn accept_line(&mut self, raw: &[u8]) {
        let text = String::from_utf8_lossy(raw);
        let line = text.trim_end_matches(&['\r', '\n'][..]);

        if line.is_empty() {
            if !self.block_complete {
                self.block_complete = true;
                self.blocks += 1;
            }
            return;
        }

        if self.block_complete {
            self.map.retain_names(CUMULATIVE_HEADERS);
            self.block_complete = false;
        }

        // Status lines and folded junk carry no separator.
        let Some((name, value)) = line.split_once(':') else {
            return;
        };
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        self.map.append(name, value.trim());
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.map
    }

    /// Number of blocks closed by a blank line during this transfer.
    pub fn completed_blocks(&self) -> usize {
        self.blocks
    }

    pub fn reset(&mut self) {
        self.map.clear();
        self.block_complete = false;
        self.blocks = 0;
    }
}

/// Both sinks of one handle. Always heap-allocated and addressed through a
/// raw pointer while the native side holds on to it.
#[derive(Default)]
pub struct Bridge {
    pub body: BodySink,
    pub header: HeaderSink,
}

impl Bridge {
    /// Empties both result buffers and forgets faults from the last transfer.
    pub fn begin_transfer(&mut self) {
        self.body.buffer.clear();
        self.body.fault = None;
        self.header.collector.reset();
        self.header.fault = None;
    }

    pub fn set_body_observer(&mut self, observer: Option<Observer>) {
        self.body.observer = observer;
    }

    pub fn set_header_observer(&mut self, observer: Option<Observer>) {
        self.header.observer = observer;
    }

    /// First fault raised by either trampoline since the transfer started.
    pub fn take_fault(&mut self) -> Option<Fault> {
        self.body.fault.take().or_else(|| self.header.fault.take())
    }

    pub fn completed_header_blocks(&self) -> usize {
        self.header.collector.completed_blocks()
    }
}

// Any count other than `total` makes the native engine abort the transfer.
fn abort_count(total: usize) -> usize {
    if total == 0 {
        1
    } else {
        0
    }
}

unsafe fn chunk_of<'a>(data: *const c_char, size: usize, nmemb: usize) -> Result<&'a [u8], Fault> {
    if data.is_null() {
        return Err(Fault::NullChunk);
    }
    let total = size.checked_mul(nmemb).ok_or(Fault::Oversized)?;
    Ok(std::slice::from_raw_parts(data as *const u8, total))
}

/// Native entry point for body data. `userdata` is the `BodySink`.
pub extern "C" fn body_trampoline(
    data: *mut c_char,
    size: usize,
    nmemb: usize,
    userdata: *mut c_void,
) -> usize {
    let total = size.wrapping_mul(nmemb);
    let Some(sink) = (unsafe { (userdata as *mut BodySink).as_mut() }) else {
        return abort_count(total);
    };
    let chunk = match unsafe { chunk_of(data, size, nmemb) } {
        Ok(chunk) => chunk,
        Err(fault) => {
            sink.fault.get_or_insert(fault);
            return abort_count(total);
        }
    };
    match sink.receive(chunk) {
        ControlFlow::Continue(()) => total,
        ControlFlow::Break(fault) => {
            sink.fault.get_or_insert(fault);
            abort_count(total)
        }
    }
}

/// Native entry point for header lines. `userdata` is the `HeaderSink`.
pub extern "C" fn header_trampoline(
    data: *mut c_char,
    size: usize,
    nmemb: usize,
    userdata: *mut c_void,
) -> usize {
    let total = size.wrapping_mul(nmemb);
    let Some(sink) = (unsafe { (userdata as *mut HeaderSink).as_mut() }) else {
        return abort_count(total);
    };
    let line = match unsafe { chunk_of(data, size, nmemb) } {
        Ok(line) => line,
        Err(fault) => {
            sink.fault.get_or_insert(fault);
            return abort_count(total);
        }
    };
    match sink.receive(line) {
        ControlFlow::Continue(()) => total,
        ControlFlow::Break(fault) => {
            sink.fault.get_or_insert(fault);
            abort_count(total)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn feed_body(bridge: &mut Bridge, chunk: &[u8]) -> usize {
        let userdata = &mut bridge.body as *mut BodySink as *mut c_void;
        body_trampoline(chunk.as_ptr() as *mut c_char, 1, chunk.len(), userdata)
    }

    fn feed_header(bridge: &mut Bridge, line: &str) -> usize {
        let userdata = &mut bridge.header as *mut HeaderSink as *mut c_void;
        header_trampoline(line.as_ptr() as *mut c_char, 1, line.len(), userdata)
    }

    #[test]
    fn body_length_is_the_sum_of_chunks() {
        let chunk_sets: Vec<Vec<&[u8]>> = vec![
            vec![],
            vec![&b"a"[..]],
            vec![&b"hello"[..], &b""[..], &b" "[..], &b"world!"[..]],
        ];
        for chunks in chunk_sets {
            let mut bridge = Bridge::default();
            let mut expected = 0;
            for chunk in chunks {
                assert_eq!(feed_body(&mut bridge, chunk), chunk.len());
                expected += chunk.len();
            }
            assert_eq!(bridge.body.bytes().len(), expected);
            assert!(bridge.take_fault().is_none());
        }
    }

    #[test]
    fn observer_sees_chunks_and_can_abort() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut bridge = Bridge::default();
        bridge.set_body_observer(Some(Box::new(move |chunk: &[u8]| {
            sink.lock().unwrap().extend_from_slice(chunk);
            if chunk == b"stop" {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })));

        assert_eq!(feed_body(&mut bridge, b"go"), 2);
        assert_eq!(feed_body(&mut bridge, b"stop"), 0);
        assert_eq!(seen.lock().unwrap().as_slice(), b"gostop");
        assert_eq!(bridge.take_fault(), Some(Fault::Aborted));
    }

    #[test]
    fn panicking_observer_becomes_an_abort() {
        let mut bridge = Bridge::default();
        bridge.set_body_observer(Some(Box::new(|_: &[u8]| -> ControlFlow<()> {
            panic!("observer blew up")
        })));
        assert_eq!(feed_body(&mut bridge, b"x"), 0);
        assert_eq!(bridge.take_fault(), Some(Fault::Panicked));
    }

    #[test]
    fn null_chunk_is_a_fault() {
        let mut bridge = Bridge::default();
        let userdata = &mut bridge.body as *mut BodySink as *mut c_void;
        assert_eq!(body_trampoline(std::ptr::null_mut(), 1, 4, userdata), 0);
        assert_eq!(bridge.take_fault(), Some(Fault::NullChunk));
        assert!(bridge.body.bytes().is_empty());

        let userdata = &mut bridge.header as *mut HeaderSink as *mut c_void;
        assert_eq!(header_trampoline(std::ptr::null_mut(), 1, 0, userdata), 1);
        assert_eq!(bridge.take_fault(), Some(Fault::NullChunk));
    }

    #[test]
    fn header_block_becomes_a_map() {
        let mut bridge = Bridge::default();
        for line in ["A: 1\r\n", "B: 2\r\n", "\r\n"] {
            assert_eq!(feed_header(&mut bridge, line), line.len());
        }
        let headers = bridge.header.headers();
        assert_eq!(headers.get("A").unwrap(), &["1"]);
        assert_eq!(headers.get("B").unwrap(), &["2"]);
        assert_eq!(headers.len(), 2);
        assert_eq!(bridge.completed_header_blocks(), 1);
    }

    #[test]
    fn next_block_keeps_only_cumulative_history() {
        let mut collector = HeaderCollector::default();
        for line in [
            "HTTP/1.1 302 Found\r\n",
            "Location: /next\r\n",
            "Set-Cookie: a=1\r\n",
            "\r\n",
            "HTTP/1.1 200 OK\r\n",
            "Content-Type: text/plain\r\n",
            "set-cookie: b=2\r\n",
            "\r\n",
        ] {
            collector.accept_line(line.as_bytes());
        }
        let headers = collector.headers();
        assert!(!headers.contains("Location"));
        assert_eq!(headers.get("Set-Cookie").unwrap(), &["a=1", "b=2"]);
        assert_eq!(headers.get_first("content-type"), Some("text/plain"));
        assert_eq!(collector.completed_blocks(), 2);
    }

    #[test]
    fn lines_are_split_at_the_first_colon_and_trimmed() {
        let mut collector = HeaderCollector::default();
        collector.accept_line(b"Location:  http://host:8080/x  \r\n");
        collector.accept_line(b"no separator here\r\n");
        collector.accept_line(b": orphan value\r\n");
        collector.accept_line(b"X-Bytes: caf\xe9\r\n");
        let headers = collector.headers();
        assert_eq!(headers.get_first("Location"), Some("http://host:8080/x"));
        assert_eq!(headers.get_first("X-Bytes"), Some("caf\u{fffd}"));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn begin_transfer_resets_everything() {
        let mut bridge = Bridge::default();
        feed_body(&mut bridge, b"old");
        feed_header(&mut bridge, "A: 1\r\n");
        bridge.begin_transfer();
        assert!(bridge.body.bytes().is_empty());
        assert!(bridge.header.headers().is_empty());
        assert_eq!(bridge.completed_header_blocks(), 0);
    }
}
