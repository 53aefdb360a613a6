use std::fmt;
use std::ops::ControlFlow;

/// Caller logic receiving streamed bytes. `Break` asks the engine to abort
/// the running transfer.
pub type Observer = Box<dyn FnMut(&[u8]) -> ControlFlow<()> + Send>;

/// A host value waiting to be encoded for one option.
///
/// The variant only says what the caller handed over; the option's native
/// category decides how (and whether) it is encoded.
pub enum OptionValue {
    Text(String),
    Integer(i64),
    Bool(bool),
    Bytes(Vec<u8>),
    Blob { data: Vec<u8>, copy: bool },
    List(Vec<String>),
    Observer(Observer),
    /// Clears a pointer-valued option.
    Null,
}

impl OptionValue {
    pub fn observer<F>(f: F) -> Self
    where
        F: FnMut(&[u8]) -> ControlFlow<()> + Send + 'static,
    {
        OptionValue::Observer(Box::new(f))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            OptionValue::Text(_) => "text",
            OptionValue::Integer(_) => "integer",
            OptionValue::Bool(_) => "bool",
            OptionValue::Bytes(_) => "bytes",
            OptionValue::Blob { .. } => "blob",
            OptionValue::List(_) => "list",
            OptionValue::Observer(_) => "observer",
            OptionValue::Null => "null",
        }
    }

    /// Integer view shared by the long and off_t categories.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            OptionValue::Integer(v) => Some(*v),
            OptionValue::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }
}

impl fmt::Debug for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Text(s) => f.debug_tuple("Text").field(s).finish(),
            OptionValue::Integer(v) => f.debug_tuple("Integer").field(v).finish(),
            OptionValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            OptionValue::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            OptionValue::Blob { data, copy } => f
                .debug_struct("Blob")
                .field("len", &data.len())
                .field("copy", copy)
                .finish(),
            OptionValue::List(items) => f.debug_tuple("List").field(items).finish(),
            OptionValue::Observer(_) => f.write_str("Observer(..)"),
            OptionValue::Null => f.write_str("Null"),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Text(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Integer(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Integer(i64::from(v))
    }
}

impl From<u32> for OptionValue {
    fn from(v: u32) -> Self {
        OptionValue::Integer(i64::from(v))
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<Vec<u8>> for OptionValue {
    fn from(v: Vec<u8>) -> Self {
        OptionValue::Bytes(v)
    }
}

impl From<&[u8]> for OptionValue {
    fn from(v: &[u8]) -> Self {
        OptionValue::Bytes(v.to_vec())
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(v: Vec<String>) -> Self {
        OptionValue::List(v)
    }
}

impl From<&[&str]> for OptionValue {
    fn from(v: &[&str]) -> Self {
        OptionValue::List(v.iter().map(|s| s.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_pick_the_obvious_variant() {
        assert!(matches!(OptionValue::from("x"), OptionValue::Text(ref s) if s == "x"));
        assert!(matches!(OptionValue::from(7i32), OptionValue::Integer(7)));
        assert!(matches!(OptionValue::from(&b"ab"[..]), OptionValue::Bytes(ref b) if b == b"ab"));
        assert!(matches!(OptionValue::from(&["a", "b"][..]), OptionValue::List(ref l) if l.len() == 2));
    }

    #[test]
    fn bools_read_as_integers() {
        assert_eq!(OptionValue::Bool(true).as_integer(), Some(1));
        assert_eq!(OptionValue::Bool(false).as_integer(), Some(0));
        assert_eq!(OptionValue::from("1").as_integer(), None);
    }

    #[test]
    fn debug_hides_payloads() {
        let value = OptionValue::observer(|_| ControlFlow::Continue(()));
        assert_eq!(format!("{:?}", value), "Observer(..)");
        let blob = OptionValue::Blob { data: vec![0; 4], copy: true };
        assert_eq!(format!("{:?}", blob), "Blob { len: 4, copy: true }");
        assert_eq!(blob.kind(), "blob");
    }
}
