use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::sync::{Arc, RwLock};

use easy_abi::{CurlEasyOption, CURLOT_FLAG_ALIAS};
use easy_core::ValueCategory;

use crate::error::{EasyError, Result};
use crate::native::NativeEngine;

/// Metadata for one option as reported by the loaded library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDescriptor {
    pub name: String,
    pub id: u32,
    pub category: ValueCategory,
    pub flags: u32,
}

impl OptionDescriptor {
    /// Alias names resolve to the same id as their canonical option.
    pub fn is_alias(&self) -> bool {
        self.flags & CURLOT_FLAG_ALIAS != 0
    }

    /// Copies a native descriptor record into owned memory.
    ///
    /// # Safety
    ///
    /// `record` must be null or point to a valid descriptor whose name is a
    /// null-terminated string.
    unsafe fn from_native(record: *const CurlEasyOption) -> Option<Self> {
        let record = record.as_ref()?;
        if record.name.is_null() {
            return None;
        }
        let name = CStr::from_ptr(record.name).to_string_lossy().into_owned();
        let category = ValueCategory::from_native(record.kind)?;
        Some(OptionDescriptor {
            name,
            id: record.id,
            category,
            flags: record.flags,
        })
    }
}

/// Resolves option names against the native library's own descriptor table.
///
/// Numeric ids are never hardcoded; the answers are cached because resolution
/// is pure for the lifetime of a loaded library.
pub struct OptionRegistry<E: NativeEngine> {
    engine: Arc<E>,
    by_name: RwLock<HashMap<String, OptionDescriptor>>,
}

impl<E: NativeEngine> OptionRegistry<E> {
    pub fn new(engine: Arc<E>) -> Self {
        Self {
            engine,
            by_name: RwLock::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    pub fn resolve(&self, name: &str) -> Result<OptionDescriptor> {
        let key = normalize(name);

        if let Some(found) = self.read_cache().get(&key) {
            return Ok(found.clone());
        }

        let c_name = CString::new(key.as_str())
            .map_err(|_| EasyError::OptionNotFound(name.to_string()))?;
        let record = self.engine.option_by_name(&c_name);
        let descriptor = unsafe { OptionDescriptor::from_native(record) }
            .ok_or_else(|| EasyError::OptionNotFound(name.to_string()))?;

        self.write_cache().insert(key, descriptor.clone());
        Ok(descriptor)
    }

    /// Reverse lookup. Not cached: ids are only ever looked up for diagnostics.
    pub fn resolve_id(&self, id: u32) -> Result<OptionDescriptor> {
        let record = self.engine.option_by_id(id);
        unsafe { OptionDescriptor::from_native(record) }
            .ok_or_else(|| EasyError::OptionNotFound(format!("#{}", id)))
    }

    /// Feature detection without an error value.
    pub fn supports(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }

    pub fn cached(&self) -> usize {
        self.read_cache().len()
    }

    fn read_cache(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, OptionDescriptor>> {
        self.by_name.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_cache(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, OptionDescriptor>> {
        self.by_name.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// The native lookup is case-insensitive and prefix-free.
fn normalize(name: &str) -> String {
    let upper = name.trim().to_ascii_uppercase();
    match upper.strip_prefix("CURLOPT_") {
        Some(bare) => bare.to_string(),
        None => upper,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedEngine;
    use easy_core::Opt;

    fn registry() -> (Arc<ScriptedEngine>, OptionRegistry<ScriptedEngine>) {
        let engine = Arc::new(ScriptedEngine::new());
        (engine.clone(), OptionRegistry::new(engine))
    }

    #[test]
    fn resolves_and_caches() {
        let (engine, registry) = registry();
        let first = registry.resolve("useragent").unwrap();
        assert_eq!(first.name, "USERAGENT");
        assert_eq!(first.category, ValueCategory::Text);

        let again = registry.resolve("CURLOPT_USERAGENT").unwrap();
        assert_eq!(first, again);
        assert_eq!(engine.calls("curl_easy_option_by_name"), 1);
        assert_eq!(registry.cached(), 1);
    }

    #[test]
    fn unknown_name_is_a_catchable_error() {
        let (_, registry) = registry();
        match registry.resolve("NO_SUCH_OPTION") {
            Err(EasyError::OptionNotFound(name)) => assert_eq!(name, "NO_SUCH_OPTION"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(!registry.supports("NO_SUCH_OPTION"));
        assert!(matches!(registry.resolve("BAD\0NAME"), Err(EasyError::OptionNotFound(_))));
    }

    #[test]
    fn reverse_lookup_and_alias_flag() {
        let (_, registry) = registry();
        let alias = registry.resolve("ENCODING").unwrap();
        assert!(alias.is_alias());
        let canonical = registry.resolve("ACCEPT_ENCODING").unwrap();
        assert_eq!(alias.id, canonical.id);
        assert!(!canonical.is_alias());

        let back = registry.resolve_id(canonical.id).unwrap();
        assert_eq!(back.name, "ACCEPT_ENCODING");
    }

    #[test]
    fn every_table_option_resolves_to_itself() {
        let (_, registry) = registry();
        for opt in Opt::ALL {
            let descriptor = registry.resolve(opt.name()).unwrap();
            assert_eq!(descriptor.name, opt.name());
            assert_eq!(descriptor.category, opt.category(), "{}", opt.name());
            assert!(!descriptor.is_alias(), "{}", opt.name());
            assert_eq!(registry.resolve(&descriptor.name).unwrap(), descriptor);
        }
        assert_eq!(registry.cached(), Opt::ALL.len());
    }
}
