use std::io::Write;
use std::sync::Arc;

use easy_engine::config::DefaultsSection;
use easy_engine::scripted::ECHO_REQUEST;
use easy_engine::{EasyError, EngineConfig, Opt, OptionValue, Script, ScriptedEngine, Session};

#[test]
fn config_file_round_trip_into_a_session() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[global]
init = "all"

[defaults]
text = {{ USERAGENT = "configured-agent" }}
integer = {{ TIMEOUT = 30 }}
"#
    )
    .unwrap();

    let config = EngineConfig::load_from_file(file.path()).unwrap();
    let engine = Arc::new(ScriptedEngine::with_script(Script::default()));
    let session = Session::new(Arc::clone(&engine), config.defaults);

    let mut first = session.handle().unwrap();
    let mut second = session.handle().unwrap();
    for handle in [&mut first, &mut second] {
        handle.set_text(Opt::Url, "http://example.test/").unwrap();
        handle.set_by_name(ECHO_REQUEST, OptionValue::Integer(1)).unwrap();
        handle.perform().unwrap();
        let request = String::from_utf8(handle.body().unwrap().to_vec()).unwrap();
        assert!(request.contains("User-Agent: configured-agent"));
    }
    // Both handles share one registry, so each name was looked up once.
    assert_eq!(engine.calls("curl_easy_option_by_name"), session.registry().cached());
}

#[test]
fn malformed_file_is_a_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[defaults\ntext = 1").unwrap();
    let err = EngineConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, EasyError::Config(_)));
}

#[test]
fn session_without_defaults() {
    let engine = Arc::new(ScriptedEngine::new());
    let session = Session::new(engine, DefaultsSection::default());
    let handle = session.handle().unwrap();
    assert!(!handle.is_released());
}
