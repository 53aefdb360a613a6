use easy_abi::{
    CURLOT_BLOB, CURLOT_CBPTR, CURLOT_FUNCTION, CURLOT_LONG, CURLOT_OBJECT, CURLOT_OFF_T,
    CURLOT_SLIST, CURLOT_STRING, CURLOT_VALUES,
};

/// The value category an option expects, as reported by the native
/// descriptor table. Encoding is always dispatched on this, never on the
/// shape of the host value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueCategory {
    /// `long` taking a range of values.
    Long,
    /// `long` taking a defined set or a bitmask.
    Values,
    /// 64-bit `curl_off_t`.
    OffT,
    /// Opaque `void *`.
    Object,
    /// Null-terminated `char *`.
    Text,
    /// `struct curl_slist *`.
    List,
    /// `void *` handed back to a callback as-is.
    CallbackData,
    /// `struct curl_blob *`.
    Blob,
    /// Function pointer.
    Function,
}

impl ValueCategory {
    pub fn from_native(kind: u32) -> Option<Self> {
        Some(match kind {
            CURLOT_LONG => ValueCategory::Long,
            CURLOT_VALUES => ValueCategory::Values,
            CURLOT_OFF_T => ValueCategory::OffT,
            CURLOT_OBJECT => ValueCategory::Object,
            CURLOT_STRING => ValueCategory::Text,
            CURLOT_SLIST => ValueCategory::List,
            CURLOT_CBPTR => ValueCategory::CallbackData,
            CURLOT_BLOB => ValueCategory::Blob,
            CURLOT_FUNCTION => ValueCategory::Function,
            _ => return None,
        })
    }

    pub fn native(self) -> u32 {
        match self {
            ValueCategory::Long => CURLOT_LONG,
            ValueCategory::Values => CURLOT_VALUES,
            ValueCategory::OffT => CURLOT_OFF_T,
            ValueCategory::Object => CURLOT_OBJECT,
            ValueCategory::Text => CURLOT_STRING,
            ValueCategory::List => CURLOT_SLIST,
            ValueCategory::CallbackData => CURLOT_CBPTR,
            ValueCategory::Blob => CURLOT_BLOB,
            ValueCategory::Function => CURLOT_FUNCTION,
        }
    }

    /// Both long flavours go through the same native call variant.
    pub fn is_long(self) -> bool {
        matches!(self, ValueCategory::Long | ValueCategory::Values)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueCategory::Long => "long",
            ValueCategory::Values => "values",
            ValueCategory::OffT => "off_t",
            ValueCategory::Object => "object",
            ValueCategory::Text => "string",
            ValueCategory::List => "slist",
            ValueCategory::CallbackData => "cbptr",
            ValueCategory::Blob => "blob",
            ValueCategory::Function => "function",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_codes_map_both_ways() {
        for kind in 0..=8u32 {
            let category = ValueCategory::from_native(kind).unwrap();
            assert_eq!(category.native(), kind);
        }
        assert_eq!(ValueCategory::from_native(9), None);
    }

    #[test]
    fn values_share_the_long_call() {
        assert!(ValueCategory::Values.is_long());
        assert!(!ValueCategory::OffT.is_long());
    }
}
