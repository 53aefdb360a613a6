use easy_engine::{global_cleanup, global_init, GlobalInit, ScriptedEngine, GLOBAL};
use serial_test::serial;

#[test]
#[serial]
fn process_guard_is_idempotent() {
    let engine = ScriptedEngine::new();
    global_cleanup(&engine);

    assert!(!global_cleanup(&engine));
    assert!(global_init(&engine, GlobalInit::SSL | GlobalInit::ACK_EINTR).unwrap());
    assert!(GLOBAL.is_initialized());
    assert!(!global_init(&engine, GlobalInit::ALL).unwrap());
    assert!(global_cleanup(&engine));
    assert!(!GLOBAL.is_initialized());

    assert_eq!(engine.calls("curl_global_init"), 1);
    assert_eq!(engine.calls("curl_global_cleanup"), 1);
}
