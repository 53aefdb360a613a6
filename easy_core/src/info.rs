use easy_abi::{
    CURLINFO_DOUBLE, CURLINFO_LONG, CURLINFO_OFF_T, CURLINFO_PTR, CURLINFO_SLIST, CURLINFO_SOCKET,
    CURLINFO_STRING,
};

/// How the memory behind a result field must be read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnCategory {
    Text,
    Long,
    Double,
    OffT,
    StringList,
    TlsSession,
    CertInfo,
    Socket,
}

macro_rules! info_table {
    ($( $variant:ident => $name:literal, $mask:ident + $n:literal, $category:ident; )*) => {
        /// Result fields readable after a transfer. Unlike options these ids
        /// are part of the stable ABI, so the table carries them directly.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Info {
            $( $variant, )*
        }

        impl Info {
            pub const ALL: &'static [Info] = &[ $( Info::$variant, )* ];

            pub const fn id(self) -> u32 {
                match self {
                    $( Info::$variant => $mask | $n, )*
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $( Info::$variant => $name, )*
                }
            }

            pub const fn category(self) -> ReturnCategory {
                match self {
                    $( Info::$variant => ReturnCategory::$category, )*
                }
            }
        }
    };
}

info_table! {
    EffectiveUrl => "EFFECTIVE_URL", CURLINFO_STRING + 1, Text;
    ResponseCode => "RESPONSE_CODE", CURLINFO_LONG + 2, Long;
    TotalTime => "TOTAL_TIME", CURLINFO_DOUBLE + 3, Double;
    NamelookupTime => "NAMELOOKUP_TIME", CURLINFO_DOUBLE + 4, Double;
    ConnectTime => "CONNECT_TIME", CURLINFO_DOUBLE + 5, Double;
    PretransferTime => "PRETRANSFER_TIME", CURLINFO_DOUBLE + 6, Double;
    SizeUploadT => "SIZE_UPLOAD_T", CURLINFO_OFF_T + 7, OffT;
    SizeDownloadT => "SIZE_DOWNLOAD_T", CURLINFO_OFF_T + 8, OffT;
    SpeedDownloadT => "SPEED_DOWNLOAD_T", CURLINFO_OFF_T + 9, OffT;
    SpeedUploadT => "SPEED_UPLOAD_T", CURLINFO_OFF_T + 10, OffT;
    HeaderSize => "HEADER_SIZE", CURLINFO_LONG + 11, Long;
    RequestSize => "REQUEST_SIZE", CURLINFO_LONG + 12, Long;
    SslVerifyresult => "SSL_VERIFYRESULT", CURLINFO_LONG + 13, Long;
    Filetime => "FILETIME", CURLINFO_LONG + 14, Long;
    FiletimeT => "FILETIME_T", CURLINFO_OFF_T + 14, OffT;
    ContentLengthDownloadT => "CONTENT_LENGTH_DOWNLOAD_T", CURLINFO_OFF_T + 15, OffT;
    ContentLengthUploadT => "CONTENT_LENGTH_UPLOAD_T", CURLINFO_OFF_T + 16, OffT;
    StarttransferTime => "STARTTRANSFER_TIME", CURLINFO_DOUBLE + 17, Double;
    ContentType => "CONTENT_TYPE", CURLINFO_STRING + 18, Text;
    RedirectTime => "REDIRECT_TIME", CURLINFO_DOUBLE + 19, Double;
    RedirectCount => "REDIRECT_COUNT", CURLINFO_LONG + 20, Long;
    Private => "PRIVATE", CURLINFO_STRING + 21, Text;
    HttpConnectcode => "HTTP_CONNECTCODE", CURLINFO_LONG + 22, Long;
    HttpauthAvail => "HTTPAUTH_AVAIL", CURLINFO_LONG + 23, Long;
    ProxyauthAvail => "PROXYAUTH_AVAIL", CURLINFO_LONG + 24, Long;
    OsErrno => "OS_ERRNO", CURLINFO_LONG + 25, Long;
    NumConnects => "NUM_CONNECTS", CURLINFO_LONG + 26, Long;
    SslEngines => "SSL_ENGINES", CURLINFO_SLIST + 27, StringList;
    Cookielist => "COOKIELIST", CURLINFO_SLIST + 28, StringList;
    FtpEntryPath => "FTP_ENTRY_PATH", CURLINFO_STRING + 30, Text;
    RedirectUrl => "REDIRECT_URL", CURLINFO_STRING + 31, Text;
    PrimaryIp => "PRIMARY_IP", CURLINFO_STRING + 32, Text;
    AppconnectTime => "APPCONNECT_TIME", CURLINFO_DOUBLE + 33, Double;
    Certinfo => "CERTINFO", CURLINFO_PTR + 34, CertInfo;
    ConditionUnmet => "CONDITION_UNMET", CURLINFO_LONG + 35, Long;
    RtspSessionId => "RTSP_SESSION_ID", CURLINFO_STRING + 36, Text;
    RtspClientCseq => "RTSP_CLIENT_CSEQ", CURLINFO_LONG + 37, Long;
    RtspServerCseq => "RTSP_SERVER_CSEQ", CURLINFO_LONG + 38, Long;
    RtspCseqRecv => "RTSP_CSEQ_RECV", CURLINFO_LONG + 39, Long;
    PrimaryPort => "PRIMARY_PORT", CURLINFO_LONG + 40, Long;
    LocalIp => "LOCAL_IP", CURLINFO_STRING + 41, Text;
    LocalPort => "LOCAL_PORT", CURLINFO_LONG + 42, Long;
    Activesocket => "ACTIVESOCKET", CURLINFO_SOCKET + 44, Socket;
    TlsSslPtr => "TLS_SSL_PTR", CURLINFO_PTR + 45, TlsSession;
    HttpVersion => "HTTP_VERSION", CURLINFO_LONG + 46, Long;
    ProxySslVerifyresult => "PROXY_SSL_VERIFYRESULT", CURLINFO_LONG + 47, Long;
    Scheme => "SCHEME", CURLINFO_STRING + 49, Text;
    TotalTimeT => "TOTAL_TIME_T", CURLINFO_OFF_T + 50, OffT;
    NamelookupTimeT => "NAMELOOKUP_TIME_T", CURLINFO_OFF_T + 51, OffT;
    ConnectTimeT => "CONNECT_TIME_T", CURLINFO_OFF_T + 52, OffT;
    PretransferTimeT => "PRETRANSFER_TIME_T", CURLINFO_OFF_T + 53, OffT;
    StarttransferTimeT => "STARTTRANSFER_TIME_T", CURLINFO_OFF_T + 54, OffT;
    RedirectTimeT => "REDIRECT_TIME_T", CURLINFO_OFF_T + 55, OffT;
    AppconnectTimeT => "APPCONNECT_TIME_T", CURLINFO_OFF_T + 56, OffT;
    RetryAfter => "RETRY_AFTER", CURLINFO_OFF_T + 57, OffT;
    EffectiveMethod => "EFFECTIVE_METHOD", CURLINFO_STRING + 58, Text;
    ProxyError => "PROXY_ERROR", CURLINFO_LONG + 59, Long;
    Referer => "REFERER", CURLINFO_STRING + 60, Text;
    Cainfo => "CAINFO", CURLINFO_STRING + 61, Text;
    Capath => "CAPATH", CURLINFO_STRING + 62, Text;
    XferId => "XFER_ID", CURLINFO_OFF_T + 63, OffT;
    ConnId => "CONN_ID", CURLINFO_OFF_T + 64, OffT;
}

impl Info {
    /// Timing fields paired as (seconds as double, microseconds as off_t).
    pub const TIMING_PAIRS: &'static [(Info, Info)] = &[
        (Info::NamelookupTime, Info::NamelookupTimeT),
        (Info::ConnectTime, Info::ConnectTimeT),
        (Info::AppconnectTime, Info::AppconnectTimeT),
        (Info::PretransferTime, Info::PretransferTimeT),
        (Info::StarttransferTime, Info::StarttransferTimeT),
        (Info::TotalTime, Info::TotalTimeT),
        (Info::RedirectTime, Info::RedirectTimeT),
    ];

    pub fn from_id(id: u32) -> Option<Info> {
        Info::ALL.iter().copied().find(|info| info.id() == id)
    }

    pub fn from_name(name: &str) -> Option<Info> {
        Info::ALL
            .iter()
            .copied()
            .find(|info| info.name().eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easy_abi::{CURLINFO_MASK, CURLINFO_TYPEMASK};

    #[test]
    fn ids_carry_their_type_mask() {
        assert_eq!(Info::EffectiveUrl.id(), 0x100001);
        assert_eq!(Info::ResponseCode.id(), 0x200002);
        assert_eq!(Info::TotalTime.id(), 0x300003);
        assert_eq!(Info::ConnId.id(), 0x600040);

        for info in Info::ALL {
            let mask = info.id() & CURLINFO_TYPEMASK;
            let expected = match info.category() {
                ReturnCategory::Text => CURLINFO_STRING,
                ReturnCategory::Long => CURLINFO_LONG,
                ReturnCategory::Double => CURLINFO_DOUBLE,
                ReturnCategory::OffT => CURLINFO_OFF_T,
                ReturnCategory::StringList => CURLINFO_SLIST,
                ReturnCategory::TlsSession | ReturnCategory::CertInfo => CURLINFO_PTR,
                ReturnCategory::Socket => CURLINFO_SOCKET,
            };
            assert_eq!(mask, expected, "{}", info.name());
            assert!(info.id() & CURLINFO_MASK > 0);
        }
    }

    #[test]
    fn timing_pairs_share_a_base_name() {
        for (seconds, micros) in Info::TIMING_PAIRS {
            assert_eq!(seconds.category(), ReturnCategory::Double);
            assert_eq!(micros.category(), ReturnCategory::OffT);
            assert_eq!(format!("{}_T", seconds.name()), micros.name());
        }
    }

    #[test]
    fn lookup_by_id_and_name() {
        assert_eq!(Info::from_id(0x100012), Some(Info::ContentType));
        assert_eq!(Info::from_name("scheme"), Some(Info::Scheme));
        assert_eq!(Info::from_id(0x100063), None);
    }
}
