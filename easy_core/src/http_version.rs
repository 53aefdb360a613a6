use serde::Serialize;

/// HTTP protocol version, as requested through the `HTTP_VERSION` option and
/// reported back by the `HTTP_VERSION` result field.
///
/// The discriminants are the native `long` values and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HttpVersion {
    /// Let the library pick.
    None = 0,
    Http10 = 1,
    Http11 = 2,
    Http20 = 3,
    /// HTTP/2 for HTTPS only, HTTP/1.1 otherwise.
    Http2Tls = 4,
    /// HTTP/2 without the HTTP/1.1 upgrade dance.
    Http2PriorKnowledge = 5,
    Http3 = 30,
    Http3Only = 31,
}

impl HttpVersion {
    pub fn from_long(value: i64) -> Option<HttpVersion> {
        Some(match value {
            0 => HttpVersion::None,
            1 => HttpVersion::Http10,
            2 => HttpVersion::Http11,
            3 => HttpVersion::Http20,
            4 => HttpVersion::Http2Tls,
            5 => HttpVersion::Http2PriorKnowledge,
            30 => HttpVersion::Http3,
            31 => HttpVersion::Http3Only,
            _ => return None,
        })
    }

    pub fn as_long(self) -> i64 {
        self as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_values_map_back() {
        for v in [0, 1, 2, 3, 4, 5, 30, 31] {
            assert_eq!(HttpVersion::from_long(v).unwrap().as_long(), v);
        }
        assert_eq!(HttpVersion::from_long(6), None);
    }
}
