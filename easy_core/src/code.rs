use std::fmt;

/// Status code returned by the native transfer engine.
///
/// Kept as a transparent integer rather than a closed enum: newer library
/// builds add codes, and every value must survive the round trip back to the
/// caller untouched.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(pub i32);

macro_rules! status_codes {
    ($( $konst:ident = $value:literal, )*) => {
        impl Code {
            $( pub const $konst: Code = Code($value); )*

            /// Symbolic name without the library prefix, when the code is known.
            pub fn name(self) -> Option<&'static str> {
                match self.0 {
                    $( $value => Some(stringify!($konst)), )*
                    _ => None,
                }
            }
        }
    };
}

status_codes! {
    OK = 0,
    UNSUPPORTED_PROTOCOL = 1,
    FAILED_INIT = 2,
    URL_MALFORMAT = 3,
    NOT_BUILT_IN = 4,
    COULDNT_RESOLVE_PROXY = 5,
    COULDNT_RESOLVE_HOST = 6,
    COULDNT_CONNECT = 7,
    WEIRD_SERVER_REPLY = 8,
    REMOTE_ACCESS_DENIED = 9,
    FTP_ACCEPT_FAILED = 10,
    FTP_WEIRD_PASS_REPLY = 11,
    FTP_ACCEPT_TIMEOUT = 12,
    FTP_WEIRD_PASV_REPLY = 13,
    FTP_WEIRD_227_FORMAT = 14,
    FTP_CANT_GET_HOST = 15,
    HTTP2 = 16,
    FTP_COULDNT_SET_TYPE = 17,
    PARTIAL_FILE = 18,
    FTP_COULDNT_RETR_FILE = 19,
    OBSOLETE20 = 20,
    QUOTE_ERROR = 21,
    HTTP_RETURNED_ERROR = 22,
    WRITE_ERROR = 23,
    OBSOLETE24 = 24,
    UPLOAD_FAILED = 25,
    READ_ERROR = 26,
    OUT_OF_MEMORY = 27,
    OPERATION_TIMEDOUT = 28,
    OBSOLETE29 = 29,
    FTP_PORT_FAILED = 30,
    FTP_COULDNT_USE_REST = 31,
    OBSOLETE32 = 32,
    RANGE_ERROR = 33,
    HTTP_POST_ERROR = 34,
    SSL_CONNECT_ERROR = 35,
    BAD_DOWNLOAD_RESUME = 36,
    FILE_COULDNT_READ_FILE = 37,
    LDAP_CANNOT_BIND = 38,
    LDAP_SEARCH_FAILED = 39,
    OBSOLETE40 = 40,
    FUNCTION_NOT_FOUND = 41,
    ABORTED_BY_CALLBACK = 42,
    BAD_FUNCTION_ARGUMENT = 43,
    OBSOLETE44 = 44,
    INTERFACE_FAILED = 45,
    OBSOLETE46 = 46,
    TOO_MANY_REDIRECTS = 47,
    UNKNOWN_OPTION = 48,
    SETOPT_OPTION_SYNTAX = 49,
    OBSOLETE50 = 50,
    OBSOLETE51 = 51,
    GOT_NOTHING = 52,
    SSL_ENGINE_NOTFOUND = 53,
    SSL_ENGINE_SETFAILED = 54,
    SEND_ERROR = 55,
    RECV_ERROR = 56,
    OBSOLETE57 = 57,
    SSL_CERTPROBLEM = 58,
    SSL_CIPHER = 59,
    PEER_FAILED_VERIFICATION = 60,
    BAD_CONTENT_ENCODING = 61,
    OBSOLETE62 = 62,
    FILESIZE_EXCEEDED = 63,
    USE_SSL_FAILED = 64,
    SEND_FAIL_REWIND = 65,
    SSL_ENGINE_INITFAILED = 66,
    LOGIN_DENIED = 67,
    TFTP_NOTFOUND = 68,
    TFTP_PERM = 69,
    REMOTE_DISK_FULL = 70,
    TFTP_ILLEGAL = 71,
    TFTP_UNKNOWNID = 72,
    REMOTE_FILE_EXISTS = 73,
    TFTP_NOSUCHUSER = 74,
    OBSOLETE75 = 75,
    OBSOLETE76 = 76,
    SSL_CACERT_BADFILE = 77,
    REMOTE_FILE_NOT_FOUND = 78,
    SSH = 79,
    SSL_SHUTDOWN_FAILED = 80,
    AGAIN = 81,
    SSL_CRL_BADFILE = 82,
    SSL_ISSUER_ERROR = 83,
    FTP_PRET_FAILED = 84,
    RTSP_CSEQ_ERROR = 85,
    RTSP_SESSION_ERROR = 86,
    FTP_BAD_FILE_LIST = 87,
    CHUNK_FAILED = 88,
    NO_CONNECTION_AVAILABLE = 89,
    SSL_PINNEDPUBKEYNOTMATCH = 90,
    SSL_INVALIDCERTSTATUS = 91,
    HTTP2_STREAM = 92,
    RECURSIVE_API_CALL = 93,
    AUTH_ERROR = 94,
    HTTP3 = 95,
    QUIC_CONNECT_ERROR = 96,
    PROXY = 97,
    SSL_CLIENTCERT = 98,
    UNRECOVERABLE_POLL = 99,
}

impl Code {
    pub fn is_ok(self) -> bool {
        self == Code::OK
    }
}

impl From<i32> for Code {
    fn from(raw: i32) -> Self {
        Code(raw)
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Code::{}", name),
            None => write!(f, "Code({})", self.0),
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "unknown status ({})", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_names() {
        assert_eq!(Code(0).name(), Some("OK"));
        assert_eq!(Code(42).name(), Some("ABORTED_BY_CALLBACK"));
        assert_eq!(Code::WRITE_ERROR.0, 23);
        assert!(Code::OK.is_ok());
    }

    #[test]
    fn unknown_codes_survive_formatting() {
        let code = Code::from(1234);
        assert_eq!(code.name(), None);
        assert_eq!(code.to_string(), "unknown status (1234)");
        assert_eq!(format!("{:?}", Code::COULDNT_CONNECT), "Code::COULDNT_CONNECT");
    }
}
