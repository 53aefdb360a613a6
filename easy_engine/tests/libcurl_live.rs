//! Transfers through the system libcurl against a one-shot local server.
//! Every test returns early when no libcurl can be loaded.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{mpsc, Arc};
use std::thread;

use easy_engine::{
    Code, EasyError, EasyHandle, ErrorBuffer, GlobalInit, LibcurlEngine, Opt, OptionValue, GLOBAL,
};
use serial_test::serial;

fn engine() -> Option<Arc<LibcurlEngine>> {
    match LibcurlEngine::shared() {
        Ok(engine) => {
            GLOBAL.init(engine.as_ref(), GlobalInit::DEFAULT).ok()?;
            Some(engine)
        }
        Err(e) => {
            eprintln!("skipping: {}", e);
            None
        }
    }
}

/// Serves one canned response and hands back the raw request.
fn serve_once(response: &'static str) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/resource", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        stream.write_all(response.as_bytes()).unwrap();
        let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
    });
    (url, rx)
}

const RESPONSE: &str = "HTTP/1.1 200 OK\r\n\
Content-Type: text/plain\r\n\
Content-Length: 5\r\n\
Set-Cookie: session=abc\r\n\
Connection: close\r\n\
\r\n\
hello";

#[test]
#[serial]
fn transfer_against_local_server() {
    let Some(engine) = engine() else { return };
    let (url, request) = serve_once(RESPONSE);

    let mut handle = EasyHandle::new(engine).unwrap();
    handle.set_text(Opt::Url, &url).unwrap();
    handle.set_text(Opt::Useragent, "easy-engine-live/1.0").unwrap();
    handle.set_http_headers(&[("X-Check", "42")]).unwrap();
    handle.set_text(Opt::Cookiefile, "").unwrap();
    handle.perform().unwrap();

    let status = handle.response_code().unwrap();
    assert!((100..=599).contains(&status));
    assert_eq!(status, 200);
    let effective = handle.effective_url().unwrap().unwrap();
    assert!(effective.starts_with("http://"));
    assert_eq!(handle.body().unwrap(), b"hello");
    assert_eq!(handle.headers().unwrap().get_first("content-type"), Some("text/plain"));
    assert_eq!(handle.content_type().unwrap().as_deref(), Some("text/plain"));
    assert_eq!(handle.primary_ip().unwrap().as_deref(), Some("127.0.0.1"));
    assert!(handle
        .cookie_list()
        .unwrap()
        .iter()
        .any(|line| line.ends_with("session\tabc")));

    let timings = handle.timings().unwrap();
    assert!(timings.total.divergence_micros() <= 1);
    assert!(timings.total.micros >= timings.connect.micros);

    let request = request.recv().unwrap();
    assert!(request.contains("User-Agent: easy-engine-live/1.0\r\n"));
    assert!(request.contains("X-Check: 42\r\n"));
}

#[test]
#[serial]
fn refused_connection_fills_the_error_buffer() {
    let Some(engine) = engine() else { return };
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let mut handle = EasyHandle::new(engine).unwrap();
    let buffer = ErrorBuffer::new();
    handle.set_error_buffer(&buffer).unwrap();
    handle
        .set_text(Opt::Url, &format!("http://127.0.0.1:{}/", port))
        .unwrap();

    match handle.perform() {
        Err(EasyError::NativeCallFailed { code, message, .. }) => {
            assert_eq!(code, Code::COULDNT_CONNECT);
            assert!(!message.is_empty());
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(buffer.message().is_some());
}

#[test]
#[serial]
fn escape_and_option_lookup() {
    let Some(engine) = engine() else { return };
    let handle = EasyHandle::new(engine).unwrap();
    assert_eq!(handle.escape("a b&c").unwrap(), "a%20b%26c");

    let registry = handle.registry();
    let canonical = registry.resolve("ACCEPT_ENCODING").unwrap();
    let alias = registry.resolve("encoding").unwrap();
    assert_eq!(alias.id, canonical.id);
    assert!(alias.is_alias());
    assert!(matches!(
        registry.resolve("NO_SUCH_OPTION"),
        Err(EasyError::OptionNotFound(_))
    ));
}

#[test]
#[serial]
fn table_names_round_trip_through_the_library() {
    let Some(engine) = engine() else { return };
    let handle = EasyHandle::new(engine).unwrap();
    let registry = handle.registry();

    let mut missing = Vec::new();
    for opt in Opt::ALL {
        match registry.resolve(opt.name()) {
            Ok(descriptor) => assert_eq!(descriptor.name, opt.name()),
            // Options newer than the loaded library.
            Err(EasyError::OptionNotFound(name)) => missing.push(name),
            Err(e) => panic!("{}: {}", opt.name(), e),
        }
    }
    if !missing.is_empty() {
        eprintln!("not in this libcurl: {}", missing.join(", "));
    }
    assert!(missing.len() < Opt::ALL.len() / 2);
}

#[test]
#[serial]
fn legacy_alias_cannot_detach_the_body_sink() {
    let Some(engine) = engine() else { return };
    let (url, _request) = serve_once(RESPONSE);
    let mut handle = EasyHandle::new(engine).unwrap();
    handle.set_text(Opt::Url, &url).unwrap();

    let err = handle.set_by_name("FILE", OptionValue::Null).unwrap_err();
    assert!(matches!(err, EasyError::InvalidArgument(_)));

    handle.perform().unwrap();
    assert_eq!(handle.body().unwrap(), b"hello");
}
