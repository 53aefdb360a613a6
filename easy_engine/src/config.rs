//! TOML configuration: which library to load, how to initialize it, option
//! defaults applied to every new handle, and the logger table.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use easy_core::{GlobalInit, Opt, OptionValue, SslBackend, SslSet, ValueCategory};
use liblogger::{log_info, log_warn, LogConfig, Logger};
use liblogger_macros::log_errors;
use serde::Deserialize;

use crate::encoder::is_reserved;
use crate::error::{EasyError, Result};
use crate::global::{global_sslset, GLOBAL};
use crate::handle::EasyHandle;
use crate::loader::LibcurlEngine;
use crate::native::NativeEngine;
use crate::registry::OptionRegistry;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub library: LibrarySection,
    #[serde(default)]
    pub global: GlobalSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
    #[serde(default)]
    pub logging: Option<LogConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibrarySection {
    /// Path or bare library name; platform defaults are tried when absent.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalSection {
    #[serde(default)]
    pub init: GlobalInit,
    pub ssl_backend: Option<SslBackend>,
}

/// Option values applied, in name order, to every handle a `Session` creates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultsSection {
    #[serde(default)]
    pub text: BTreeMap<String, String>,
    #[serde(default)]
    pub integer: BTreeMap<String, i64>,
}

impl EngineConfig {
    #[log_errors]
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<EngineConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| EasyError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<EngineConfig> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| EasyError::Config(e.to_string()))?;

        Self::validate_library(&config.library)?;
        Self::validate_defaults(&config.defaults)?;

        Ok(config)
    }

    fn validate_library(library: &LibrarySection) -> Result<()> {
        if let Some(path) = &library.path {
            if path.trim().is_empty() {
                return Err(EasyError::Config(
                    "Empty 'path' in [library] section".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn validate_defaults(defaults: &DefaultsSection) -> Result<()> {
        for (name, value) in &defaults.text {
            let opt = Self::default_option(name)?;
            if opt.category() != ValueCategory::Text {
                return Err(EasyError::Config(format!(
                    "Option '{}' in [defaults.text] is not a text option",
                    name
                )));
            }
            if value.contains('\0') {
                return Err(EasyError::Config(format!(
                    "Default for '{}' contains a NUL byte",
                    name
                )));
            }
        }
        for name in defaults.integer.keys() {
            let opt = Self::default_option(name)?;
            if !opt.category().is_long() && opt.category() != ValueCategory::OffT {
                return Err(EasyError::Config(format!(
                    "Option '{}' in [defaults.integer] is not an integer option",
                    name
                )));
            }
        }
        Ok(())
    }

    fn default_option(name: &str) -> Result<Opt> {
        let opt = Opt::from_name(name).ok_or_else(|| {
            EasyError::Config(format!("Unknown option '{}' in [defaults] section", name))
        })?;
        if is_reserved(opt.name()) {
            return Err(EasyError::Config(format!(
                "Option '{}' is managed by the handle and cannot have a default",
                name
            )));
        }
        Ok(opt)
    }
}

/// An engine plus the defaults every handle starts from. Handles share the
/// session's option registry, so each option name is resolved once.
pub struct Session<E: NativeEngine> {
    registry: Arc<OptionRegistry<E>>,
    defaults: DefaultsSection,
}

impl<E: NativeEngine> Session<E> {
    pub fn new(engine: Arc<E>, defaults: DefaultsSection) -> Self {
        Session {
            registry: Arc::new(OptionRegistry::new(engine)),
            defaults,
        }
    }

    pub fn engine(&self) -> &Arc<E> {
        self.registry.engine()
    }

    pub fn registry(&self) -> &Arc<OptionRegistry<E>> {
        &self.registry
    }

    pub fn defaults(&self) -> &DefaultsSection {
        &self.defaults
    }

    /// Creates a handle with every configured default applied.
    pub fn handle(&self) -> Result<EasyHandle<E>> {
        let mut handle = EasyHandle::with_registry(Arc::clone(&self.registry))?;
        for (name, value) in &self.defaults.text {
            handle.set_by_name(name, OptionValue::from(value.as_str()))?;
        }
        for (name, value) in &self.defaults.integer {
            handle.set_by_name(name, OptionValue::Integer(*value))?;
        }
        Ok(handle)
    }
}

/// Loads libcurl as configured, selects the TLS backend, runs the global
/// init and installs the logger when a `[logging]` table is present.
#[log_errors]
pub fn open_engine(config: &EngineConfig) -> Result<Session<LibcurlEngine>> {
    if let Some(logging) = &config.logging {
        Logger::init_with_config(logging.clone()).map_err(EasyError::Config)?;
    }

    let engine = match &config.library.path {
        Some(path) => LibcurlEngine::load(path)?,
        None => LibcurlEngine::load_default()?,
    };

    if let Some(backend) = config.global.ssl_backend {
        match global_sslset(&engine, backend)? {
            SslSet::Ok => log_info!(&format!("Selected TLS backend {}", backend)),
            SslSet::TooLate => log_warn!(&format!(
                "TLS backend {} requested after global init; keeping the current one",
                backend
            )),
            other => {
                return Err(EasyError::Config(format!(
                    "TLS backend {} unavailable: {:?}",
                    backend, other
                )))
            }
        }
    }

    GLOBAL.init(&engine, config.global.init)?;
    Ok(Session::new(Arc::new(engine), config.defaults.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::{Script, ScriptedEngine, ECHO_REQUEST};

    const SAMPLE: &str = r#"
        [library]
        path = "libcurl.so.4"

        [global]
        init = ["ssl", "win32"]
        ssl_backend = "openssl"

        [defaults]
        text = { USERAGENT = "easy-engine/0.1" }
        integer = { CONNECTTIMEOUT = 10, followlocation = 1 }

        [logging]
        type = "console"
        threshold = "info"
    "#;

    #[test]
    fn full_document_parses() {
        let config = EngineConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.library.path.as_deref(), Some("libcurl.so.4"));
        assert_eq!(config.global.init, GlobalInit::ALL);
        assert_eq!(config.global.ssl_backend, Some(SslBackend::OpenSsl));
        assert_eq!(config.defaults.integer["CONNECTTIMEOUT"], 10);
        assert!(config.logging.is_some());
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert!(config.library.path.is_none());
        assert_eq!(config.global.init, GlobalInit::DEFAULT);
        assert!(config.defaults.text.is_empty());
    }

    #[test]
    fn validation_failures() {
        let cases = [
            "[library]\npath = \"  \"\n",
            "[global]\ninit = [\"ssl\", \"turbo\"]\n",
            "[global]\nssl_backend = \"nosuchtls\"\n",
            "[defaults]\ntext = { NOT_AN_OPTION = \"x\" }\n",
            "[defaults]\ntext = { TIMEOUT = \"x\" }\n",
            "[defaults]\ninteger = { URL = 1 }\n",
            "[defaults]\ninteger = { WRITEFUNCTION = 1 }\n",
        ];
        for case in cases {
            match EngineConfig::from_toml_str(case) {
                Err(EasyError::Config(_)) => {}
                other => panic!("{:?} should be rejected, got {:?}", case, other.map(|_| ())),
            }
        }
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = EngineConfig::load_from_file("/nonexistent/easy.toml").unwrap_err();
        assert!(matches!(err, EasyError::Config(_)));
    }

    #[test]
    fn session_handles_start_from_defaults() {
        let config = EngineConfig::from_toml_str(SAMPLE).unwrap();
        let engine = Arc::new(ScriptedEngine::with_script(Script::ok(200, &[], b"")));
        let session = Session::new(Arc::clone(&engine), config.defaults);

        let mut handle = session.handle().unwrap();
        handle.set_text(easy_core::Opt::Url, "http://example.test/").unwrap();
        handle.set_by_name(ECHO_REQUEST, OptionValue::Integer(1)).unwrap();
        handle.perform().unwrap();

        let echoed = String::from_utf8(handle.body().unwrap().to_vec()).unwrap();
        assert!(echoed.contains("User-Agent: easy-engine/0.1"));
    }
}
