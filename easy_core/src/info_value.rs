use serde::Serialize;

use crate::global::SslBackend;

/// A decoded result field. Text and pointer fields the library leaves unset
/// decode to `None` rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InfoValue {
    Text(Option<String>),
    Long(i64),
    Double(f64),
    OffT(i64),
    List(Vec<String>),
    TlsSession(Option<TlsSession>),
    CertInfo(Vec<Certificate>),
    Socket(Option<i64>),
}

impl InfoValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            InfoValue::Text(Some(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            InfoValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            InfoValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_off_t(&self) -> Option<i64> {
        match self {
            InfoValue::OffT(v) => Some(*v),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<String>> {
        match self {
            InfoValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Backend and internal session pointer of the TLS layer in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TlsSession {
    pub backend: SslBackend,
    /// Address of the backend's own session object; only meaningful to code
    /// linked against that backend.
    pub internals: usize,
}

/// One certificate of the peer chain as `Key:Value` lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Certificate {
    pub entries: Vec<String>,
}

impl Certificate {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.eq_ignore_ascii_case(key).then_some(v)
        })
    }
}

/// A timing field in both units reported by the library.
///
/// The two numbers are computed independently natively; no attempt is made
/// to reconcile them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Timing {
    pub seconds: f64,
    pub micros: i64,
}

impl Timing {
    /// Absolute distance between the rounded seconds value and the
    /// microsecond value.
    pub fn divergence_micros(&self) -> i64 {
        ((self.seconds * 1_000_000.0).round() as i64 - self.micros).abs()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Timings {
    pub namelookup: Timing,
    pub connect: Timing,
    pub appconnect: Timing,
    pub pretransfer: Timing,
    pub starttransfer: Timing,
    pub total: Timing,
    pub redirect: Timing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variant() {
        assert_eq!(InfoValue::Text(Some("a".into())).as_text(), Some("a"));
        assert_eq!(InfoValue::Text(None).as_text(), None);
        assert_eq!(InfoValue::Long(200).as_long(), Some(200));
        assert_eq!(InfoValue::Long(200).as_off_t(), None);
        assert_eq!(
            InfoValue::List(vec!["x".into()]).into_list(),
            Some(vec!["x".to_string()])
        );
    }

    #[test]
    fn certificate_fields_by_key() {
        let cert = Certificate {
            entries: vec!["Subject:CN=example".into(), "Expire date:2030".into()],
        };
        assert_eq!(cert.get("subject"), Some("CN=example"));
        assert_eq!(cert.get("Issuer"), None);
    }

    #[test]
    fn timing_divergence_rounds_seconds() {
        let timing = Timing { seconds: 0.0123455, micros: 12345 };
        assert!(timing.divergence_micros() <= 1);
        let far = Timing { seconds: 1.0, micros: 0 };
        assert_eq!(far.divergence_micros(), 1_000_000);
    }
}
