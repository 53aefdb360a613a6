/*
 * Process-wide library initialization.
 *
 * The native library wants exactly one init before any handle exists and one
 * cleanup after the last. `GlobalGuard` makes both idempotent: the atomic
 * flag answers the fast path, the mutex serializes the transitions.
 */

use std::ffi::CString;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use easy_core::{GlobalInit, SslBackend, SslSet};
use liblogger::{log_debug, log_info};

use crate::error::{EasyError, Result};
use crate::native::NativeEngine;

pub struct GlobalGuard {
    initialized: AtomicBool,
    transition: Mutex<()>,
}

/// Guard used by the free functions below.
pub static GLOBAL: GlobalGuard = GlobalGuard::new();

impl Default for GlobalGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalGuard {
    pub const fn new() -> Self {
        GlobalGuard {
            initialized: AtomicBool::new(false),
            transition: Mutex::new(()),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Runs the native init unless it already ran. Returns whether this call
    /// performed it.
    pub fn init<E: NativeEngine>(&self, engine: &E, flags: GlobalInit) -> Result<bool> {
        if self.is_initialized() {
            return Ok(false);
        }
        let _transition = self.transition.lock().unwrap_or_else(|p| p.into_inner());
        if self.is_initialized() {
            return Ok(false);
        }
        let code = engine.global_init(flags.bits());
        if !code.is_ok() {
            return Err(EasyError::NativeCallFailed {
                call: "curl_global_init",
                code,
                message: engine.strerror(code),
            });
        }
        self.initialized.store(true, Ordering::Release);
        log_info!(&format!("Global init done ({})", engine.version()));
        Ok(true)
    }

    /// Runs the native cleanup if init ran. Returns whether this call
    /// performed it.
    pub fn cleanup<E: NativeEngine>(&self, engine: &E) -> bool {
        if !self.is_initialized() {
            return false;
        }
        let _transition = self.transition.lock().unwrap_or_else(|p| p.into_inner());
        if !self.is_initialized() {
            return false;
        }
        engine.global_cleanup();
        self.initialized.store(false, Ordering::Release);
        log_debug!("Global cleanup done");
        true
    }
}

pub fn global_init<E: NativeEngine>(engine: &E, flags: GlobalInit) -> Result<bool> {
    GLOBAL.init(engine, flags)
}

pub fn global_cleanup<E: NativeEngine>(engine: &E) -> bool {
    GLOBAL.cleanup(engine)
}

/// Selects the TLS backend. Only meaningful before the first init.
pub fn global_sslset<E: NativeEngine>(engine: &E, backend: SslBackend) -> Result<SslSet> {
    let name = backend
        .name()
        .map(CString::new)
        .transpose()
        .map_err(|_| EasyError::InvalidArgument(format!("Bad backend name for {:?}", backend)))?;
    // With a name the library matches its own spelling and ignores the id.
    let id = if name.is_some() { -1 } else { backend.id() };
    let result = engine.global_sslset(id, name.as_deref());
    log_debug!(&format!("TLS backend {} selection: {:?}", backend, result));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedEngine;

    #[test]
    fn init_and_cleanup_are_idempotent() {
        let guard = GlobalGuard::new();
        let engine = ScriptedEngine::new();

        assert!(!guard.cleanup(&engine));
        assert!(guard.init(&engine, GlobalInit::DEFAULT).unwrap());
        assert!(!guard.init(&engine, GlobalInit::DEFAULT).unwrap());
        assert!(guard.is_initialized());
        assert!(guard.cleanup(&engine));
        assert!(!guard.cleanup(&engine));

        assert_eq!(engine.calls("curl_global_init"), 1);
        assert_eq!(engine.calls("curl_global_cleanup"), 1);
    }

    #[test]
    fn concurrent_init_runs_native_init_once() {
        let guard = GlobalGuard::new();
        let engine = ScriptedEngine::new();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| guard.init(&engine, GlobalInit::ALL).unwrap());
            }
        });
        assert_eq!(engine.calls("curl_global_init"), 1);
    }

    #[test]
    fn sslset_by_name() {
        let engine = ScriptedEngine::new();
        assert_eq!(global_sslset(&engine, SslBackend::OpenSsl).unwrap(), SslSet::Ok);
        assert_eq!(global_sslset(&engine, SslBackend::GnuTls).unwrap(), SslSet::UnknownBackend);
    }
}
