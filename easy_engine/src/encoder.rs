/*
 * Value encoder: turns a host `OptionValue` into the representation the
 * native set-option call expects for the option's category.
 *
 * Encoding is a pure planning step. The handle performs the native call and
 * keeps whatever buffers the plan says the library may still reference.
 */

use std::ffi::CString;

use easy_abi::CurlBlob;
use easy_core::{Observer, OptionValue, ValueCategory};

use crate::error::{EasyError, Result};
use crate::registry::OptionDescriptor;

/// Object-category options that take a caller data buffer.
const DATA_OBJECTS: &[&str] = &["POSTFIELDS", "COPYPOSTFIELDS", "PRIVATE"];

/// Options whose native side the handle owns outright.
pub(crate) const RESERVED: &[&str] = &[
    "WRITEFUNCTION",
    "WRITEDATA",
    "HEADERFUNCTION",
    "HEADERDATA",
    "ERRORBUFFER",
    "MIMEPOST",
];

pub(crate) fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// What to hand to the native call.
pub(crate) enum Encoded {
    Long(i64),
    OffT(i64),
    Text(CString),
    /// Null-terminated copy of a data buffer, retained like text.
    Data(Vec<u8>),
    Blob(BlobPayload),
    List(Vec<CString>),
    Observer(Observer),
    ClearPointer,
    ClearFunction,
    ClearList,
}

/// A blob record together with the payload it points into. Boxed so the
/// record address is stable while it is retained.
pub(crate) struct BlobPayload {
    pub record: Box<CurlBlob>,
    pub data: Vec<u8>,
}

impl BlobPayload {
    fn new(data: Vec<u8>, copy: bool) -> Self {
        let record = Box::new(CurlBlob::new(&data, copy));
        // Moving the Vec does not move its heap buffer, so the record stays valid.
        BlobPayload { record, data }
    }
}

pub(crate) fn encode(descriptor: &OptionDescriptor, value: OptionValue) -> Result<Encoded> {
    let name = descriptor.name.as_str();
    match descriptor.category {
        ValueCategory::Long | ValueCategory::Values => match value.as_integer() {
            Some(v) => Ok(Encoded::Long(v)),
            None => Err(mismatch(name, "an integer", &value)),
        },
        ValueCategory::OffT => match value.as_integer() {
            Some(v) => Ok(Encoded::OffT(v)),
            None => Err(mismatch(name, "a 64-bit integer", &value)),
        },
        ValueCategory::Text => match value {
            OptionValue::Text(text) => Ok(Encoded::Text(c_string(name, text.into_bytes())?)),
            OptionValue::Bytes(bytes) => Ok(Encoded::Text(c_string(name, bytes)?)),
            OptionValue::Null => Ok(Encoded::ClearPointer),
            other => Err(mismatch(name, "text", &other)),
        },
        ValueCategory::Blob => match value {
            OptionValue::Blob { data, copy } => Ok(Encoded::Blob(BlobPayload::new(data, copy))),
            OptionValue::Bytes(data) => Ok(Encoded::Blob(BlobPayload::new(data, true))),
            OptionValue::Text(text) => {
                Ok(Encoded::Blob(BlobPayload::new(text.into_bytes(), true)))
            }
            OptionValue::Null => Ok(Encoded::ClearPointer),
            other => Err(mismatch(name, "binary data", &other)),
        },
        ValueCategory::List => match value {
            OptionValue::List(lines) if lines.is_empty() => Ok(Encoded::ClearList),
            OptionValue::List(lines) => {
                let lines = lines
                    .into_iter()
                    .map(|line| c_string(name, line.into_bytes()))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Encoded::List(lines))
            }
            OptionValue::Text(line) => Ok(Encoded::List(vec![c_string(name, line.into_bytes())?])),
            OptionValue::Null => Ok(Encoded::ClearList),
            other => Err(mismatch(name, "a list of strings", &other)),
        },
        ValueCategory::Object => match value {
            OptionValue::Null => Ok(Encoded::ClearPointer),
            OptionValue::Text(text) if DATA_OBJECTS.contains(&name) => {
                Ok(Encoded::Data(terminated(text.into_bytes())))
            }
            OptionValue::Bytes(bytes) if DATA_OBJECTS.contains(&name) => {
                Ok(Encoded::Data(terminated(bytes)))
            }
            other => Err(EasyError::InvalidArgument(format!(
                "{} takes a native object; {} values cannot be passed",
                name,
                other.kind()
            ))),
        },
        ValueCategory::CallbackData => match value {
            OptionValue::Null => Ok(Encoded::ClearPointer),
            other => Err(EasyError::InvalidArgument(format!(
                "{} is callback data and only accepts null, got {}",
                name,
                other.kind()
            ))),
        },
        ValueCategory::Function => match value {
            OptionValue::Observer(observer) => Ok(Encoded::Observer(observer)),
            OptionValue::Null => Ok(Encoded::ClearFunction),
            other => Err(mismatch(name, "an observer", &other)),
        },
    }
}

fn c_string(name: &str, bytes: Vec<u8>) -> Result<CString> {
    CString::new(bytes).map_err(|e| {
        EasyError::InvalidArgument(format!(
            "{} value contains a NUL byte at offset {}",
            name,
            e.nul_position()
        ))
    })
}

fn terminated(mut bytes: Vec<u8>) -> Vec<u8> {
    bytes.push(0);
    bytes
}

fn mismatch(name: &str, expected: &str, got: &OptionValue) -> EasyError {
    EasyError::InvalidArgument(format!("{} expects {}, got {}", name, expected, got.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ops::ControlFlow;

    fn descriptor(name: &str, category: ValueCategory) -> OptionDescriptor {
        OptionDescriptor {
            name: name.to_string(),
            id: 1,
            category,
            flags: 0,
        }
    }

    #[test]
    fn dispatch_follows_the_category_not_the_value() {
        let text = descriptor("USERAGENT", ValueCategory::Text);
        let blob = descriptor("SSLCERT_BLOB", ValueCategory::Blob);

        assert!(matches!(encode(&text, b"agent".to_vec().into()), Ok(Encoded::Text(_))));
        match encode(&blob, "agent".into()) {
            Ok(Encoded::Blob(payload)) => {
                assert!(payload.record.copies());
                assert_eq!(payload.record.len, 5);
                assert_eq!(payload.record.data as *const u8, payload.data.as_ptr());
            }
            _ => panic!("expected a blob"),
        }
    }

    #[test]
    fn integers_and_bools_share_the_long_path() {
        let long = descriptor("FOLLOWLOCATION", ValueCategory::Long);
        assert!(matches!(encode(&long, true.into()), Ok(Encoded::Long(1))));
        assert!(matches!(encode(&long, 30i64.into()), Ok(Encoded::Long(30))));
        assert!(matches!(
            encode(&long, "1".into()),
            Err(EasyError::InvalidArgument(_))
        ));

        let off_t = descriptor("MAXFILESIZE_LARGE", ValueCategory::OffT);
        assert!(matches!(
            encode(&off_t, (1i64 << 40).into()),
            Ok(Encoded::OffT(v)) if v == 1 << 40
        ));
    }

    #[test]
    fn interior_nul_is_rejected() {
        let text = descriptor("URL", ValueCategory::Text);
        match encode(&text, "http://a\0b".into()) {
            Err(EasyError::InvalidArgument(msg)) => assert!(msg.contains("offset 8")),
            _ => panic!("expected InvalidArgument"),
        }
    }

    #[test]
    fn lists_and_clears() {
        let list = descriptor("HTTPHEADER", ValueCategory::List);
        match encode(&list, (&["A: 1", "B: 2"][..]).into()) {
            Ok(Encoded::List(lines)) => assert_eq!(lines.len(), 2),
            _ => panic!("expected a list"),
        }
        assert!(matches!(encode(&list, OptionValue::List(vec![])), Ok(Encoded::ClearList)));
        assert!(matches!(encode(&list, OptionValue::Null), Ok(Encoded::ClearList)));
    }

    #[test]
    fn objects_only_take_data_where_it_makes_sense() {
        let post = descriptor("POSTFIELDS", ValueCategory::Object);
        match encode(&post, "a=1".into()) {
            Ok(Encoded::Data(bytes)) => assert_eq!(bytes, b"a=1\0"),
            _ => panic!("expected data"),
        }
        let share = descriptor("SHARE", ValueCategory::Object);
        assert!(matches!(encode(&share, "x".into()), Err(EasyError::InvalidArgument(_))));
        assert!(matches!(encode(&share, OptionValue::Null), Ok(Encoded::ClearPointer)));
    }

    #[test]
    fn functions_take_observers() {
        let function = descriptor("WRITEFUNCTION", ValueCategory::Function);
        let observer = OptionValue::observer(|_| ControlFlow::Continue(()));
        assert!(matches!(encode(&function, observer), Ok(Encoded::Observer(_))));
        assert!(matches!(encode(&function, 1i64.into()), Err(EasyError::InvalidArgument(_))));
    }
}
