//! Static table of every easy option the binding knows by name.
//!
//! Numeric ids are deliberately absent: they are resolved at runtime from the
//! loaded library's own descriptor table. The category recorded here is what
//! the host expects; the native descriptor stays authoritative for encoding.

use crate::value_category::ValueCategory;

macro_rules! option_table {
    ($( $variant:ident => $name:literal, $category:ident; )*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Opt {
            $( $variant, )*
        }

        impl Opt {
            pub const ALL: &'static [Opt] = &[ $( Opt::$variant, )* ];

            /// Option name without the `CURLOPT_` prefix.
            pub const fn name(self) -> &'static str {
                match self {
                    $( Opt::$variant => $name, )*
                }
            }

            pub const fn category(self) -> ValueCategory {
                match self {
                    $( Opt::$variant => ValueCategory::$category, )*
                }
            }
        }
    };
}

impl Opt {
    /// Case-insensitive lookup, tolerating a `CURLOPT_` prefix.
    pub fn from_name(name: &str) -> Option<Opt> {
        let bare = strip_prefix_ignore_case(name, "CURLOPT_");
        Opt::ALL
            .iter()
            .copied()
            .find(|opt| opt.name().eq_ignore_ascii_case(bare))
    }
}

fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str) -> &'a str {
    match name.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &name[prefix.len()..],
        _ => name,
    }
}

option_table! {
    AbstractUnixSocket => "ABSTRACT_UNIX_SOCKET", Text;
    AccepttimeoutMs => "ACCEPTTIMEOUT_MS", Long;
    AcceptEncoding => "ACCEPT_ENCODING", Text;
    AddressScope => "ADDRESS_SCOPE", Long;
    Altsvc => "ALTSVC", Text;
    AltsvcCtrl => "ALTSVC_CTRL", Long;
    Append => "APPEND", Long;
    Autoreferer => "AUTOREFERER", Long;
    AwsSigv4 => "AWS_SIGV4", Text;
    Buffersize => "BUFFERSIZE", Long;
    Cainfo => "CAINFO", Text;
    CainfoBlob => "CAINFO_BLOB", Blob;
    Capath => "CAPATH", Text;
    CaCacheTimeout => "CA_CACHE_TIMEOUT", Long;
    Certinfo => "CERTINFO", Long;
    ChunkBgnFunction => "CHUNK_BGN_FUNCTION", Function;
    ChunkData => "CHUNK_DATA", CallbackData;
    ChunkEndFunction => "CHUNK_END_FUNCTION", Function;
    Closesocketdata => "CLOSESOCKETDATA", CallbackData;
    Closesocketfunction => "CLOSESOCKETFUNCTION", Function;
    Connecttimeout => "CONNECTTIMEOUT", Long;
    ConnecttimeoutMs => "CONNECTTIMEOUT_MS", Long;
    ConnectOnly => "CONNECT_ONLY", Long;
    ConnectTo => "CONNECT_TO", List;
    ConvFromNetworkFunction => "CONV_FROM_NETWORK_FUNCTION", Function;
    ConvFromUtf8Function => "CONV_FROM_UTF8_FUNCTION", Function;
    ConvToNetworkFunction => "CONV_TO_NETWORK_FUNCTION", Function;
    Cookie => "COOKIE", Text;
    Cookiefile => "COOKIEFILE", Text;
    Cookiejar => "COOKIEJAR", Text;
    Cookielist => "COOKIELIST", Text;
    Cookiesession => "COOKIESESSION", Long;
    Copypostfields => "COPYPOSTFIELDS", Object;
    Crlf => "CRLF", Long;
    Crlfile => "CRLFILE", Text;
    Curlu => "CURLU", Object;
    Customrequest => "CUSTOMREQUEST", Text;
    Debugdata => "DEBUGDATA", CallbackData;
    Debugfunction => "DEBUGFUNCTION", Function;
    DefaultProtocol => "DEFAULT_PROTOCOL", Text;
    Dirlistonly => "DIRLISTONLY", Long;
    DisallowUsernameInUrl => "DISALLOW_USERNAME_IN_URL", Long;
    DnsCacheTimeout => "DNS_CACHE_TIMEOUT", Long;
    DnsInterface => "DNS_INTERFACE", Text;
    DnsLocalIp4 => "DNS_LOCAL_IP4", Text;
    DnsLocalIp6 => "DNS_LOCAL_IP6", Text;
    DnsServers => "DNS_SERVERS", Text;
    DnsShuffleAddresses => "DNS_SHUFFLE_ADDRESSES", Long;
    DnsUseGlobalCache => "DNS_USE_GLOBAL_CACHE", Long;
    DohSslVerifyhost => "DOH_SSL_VERIFYHOST", Long;
    DohSslVerifypeer => "DOH_SSL_VERIFYPEER", Long;
    DohSslVerifystatus => "DOH_SSL_VERIFYSTATUS", Long;
    DohUrl => "DOH_URL", Text;
    Egdsocket => "EGDSOCKET", Text;
    Errorbuffer => "ERRORBUFFER", Object;
    Expect100TimeoutMs => "EXPECT_100_TIMEOUT_MS", Long;
    Failonerror => "FAILONERROR", Long;
    Filetime => "FILETIME", Long;
    FnmatchData => "FNMATCH_DATA", CallbackData;
    FnmatchFunction => "FNMATCH_FUNCTION", Function;
    Followlocation => "FOLLOWLOCATION", Long;
    ForbidReuse => "FORBID_REUSE", Long;
    FreshConnect => "FRESH_CONNECT", Long;
    Ftpport => "FTPPORT", Text;
    Ftpsslauth => "FTPSSLAUTH", Values;
    FtpAccount => "FTP_ACCOUNT", Text;
    FtpAlternativeToUser => "FTP_ALTERNATIVE_TO_USER", Text;
    FtpCreateMissingDirs => "FTP_CREATE_MISSING_DIRS", Values;
    FtpFilemethod => "FTP_FILEMETHOD", Values;
    FtpSkipPasvIp => "FTP_SKIP_PASV_IP", Long;
    FtpSslCcc => "FTP_SSL_CCC", Values;
    FtpUseEprt => "FTP_USE_EPRT", Long;
    FtpUseEpsv => "FTP_USE_EPSV", Long;
    FtpUsePret => "FTP_USE_PRET", Long;
    GssapiDelegation => "GSSAPI_DELEGATION", Values;
    HappyEyeballsTimeoutMs => "HAPPY_EYEBALLS_TIMEOUT_MS", Long;
    Haproxyprotocol => "HAPROXYPROTOCOL", Long;
    HaproxyClientIp => "HAPROXY_CLIENT_IP", Text;
    Header => "HEADER", Long;
    Headerdata => "HEADERDATA", CallbackData;
    Headerfunction => "HEADERFUNCTION", Function;
    Headeropt => "HEADEROPT", Values;
    Hsts => "HSTS", Text;
    Hstsreaddata => "HSTSREADDATA", CallbackData;
    Hstsreadfunction => "HSTSREADFUNCTION", Function;
    Hstswritedata => "HSTSWRITEDATA", CallbackData;
    Hstswritefunction => "HSTSWRITEFUNCTION", Function;
    HstsCtrl => "HSTS_CTRL", Long;
    Http09Allowed => "HTTP09_ALLOWED", Long;
    Http200aliases => "HTTP200ALIASES", List;
    Httpauth => "HTTPAUTH", Values;
    Httpget => "HTTPGET", Long;
    Httpheader => "HTTPHEADER", List;
    Httppost => "HTTPPOST", Object;
    Httpproxytunnel => "HTTPPROXYTUNNEL", Long;
    HttpContentDecoding => "HTTP_CONTENT_DECODING", Long;
    HttpTransferDecoding => "HTTP_TRANSFER_DECODING", Long;
    HttpVersion => "HTTP_VERSION", Values;
    IgnoreContentLength => "IGNORE_CONTENT_LENGTH", Long;
    Infilesize => "INFILESIZE", Long;
    InfilesizeLarge => "INFILESIZE_LARGE", OffT;
    Interface => "INTERFACE", Text;
    Interleavedata => "INTERLEAVEDATA", CallbackData;
    Interleavefunction => "INTERLEAVEFUNCTION", Function;
    Ioctldata => "IOCTLDATA", CallbackData;
    Ioctlfunction => "IOCTLFUNCTION", Function;
    Ipresolve => "IPRESOLVE", Values;
    Issuercert => "ISSUERCERT", Text;
    IssuercertBlob => "ISSUERCERT_BLOB", Blob;
    KeepSendingOnError => "KEEP_SENDING_ON_ERROR", Long;
    Keypasswd => "KEYPASSWD", Text;
    Krblevel => "KRBLEVEL", Text;
    Localport => "LOCALPORT", Long;
    Localportrange => "LOCALPORTRANGE", Long;
    LoginOptions => "LOGIN_OPTIONS", Text;
    LowSpeedLimit => "LOW_SPEED_LIMIT", Long;
    LowSpeedTime => "LOW_SPEED_TIME", Long;
    MailAuth => "MAIL_AUTH", Text;
    MailFrom => "MAIL_FROM", Text;
    MailRcpt => "MAIL_RCPT", List;
    MailRcptAllowfails => "MAIL_RCPT_ALLOWFAILS", Long;
    MaxageConn => "MAXAGE_CONN", Long;
    Maxconnects => "MAXCONNECTS", Long;
    Maxfilesize => "MAXFILESIZE", Long;
    MaxfilesizeLarge => "MAXFILESIZE_LARGE", OffT;
    MaxlifetimeConn => "MAXLIFETIME_CONN", Long;
    Maxredirs => "MAXREDIRS", Long;
    MaxRecvSpeedLarge => "MAX_RECV_SPEED_LARGE", OffT;
    MaxSendSpeedLarge => "MAX_SEND_SPEED_LARGE", OffT;
    Mimepost => "MIMEPOST", Object;
    MimeOptions => "MIME_OPTIONS", Long;
    Netrc => "NETRC", Values;
    NetrcFile => "NETRC_FILE", Text;
    NewDirectoryPerms => "NEW_DIRECTORY_PERMS", Long;
    NewFilePerms => "NEW_FILE_PERMS", Long;
    Nobody => "NOBODY", Long;
    Noprogress => "NOPROGRESS", Long;
    Noproxy => "NOPROXY", Text;
    Nosignal => "NOSIGNAL", Long;
    Opensocketdata => "OPENSOCKETDATA", CallbackData;
    Opensocketfunction => "OPENSOCKETFUNCTION", Function;
    Password => "PASSWORD", Text;
    PathAsIs => "PATH_AS_IS", Long;
    Pinnedpublickey => "PINNEDPUBLICKEY", Text;
    Pipewait => "PIPEWAIT", Long;
    Port => "PORT", Long;
    Post => "POST", Long;
    Postfields => "POSTFIELDS", Object;
    Postfieldsize => "POSTFIELDSIZE", Long;
    PostfieldsizeLarge => "POSTFIELDSIZE_LARGE", OffT;
    Postquote => "POSTQUOTE", List;
    Postredir => "POSTREDIR", Values;
    Prequote => "PREQUOTE", List;
    Prereqdata => "PREREQDATA", CallbackData;
    Prereqfunction => "PREREQFUNCTION", Function;
    PreProxy => "PRE_PROXY", Text;
    Private => "PRIVATE", Object;
    Progressdata => "PROGRESSDATA", CallbackData;
    Progressfunction => "PROGRESSFUNCTION", Function;
    Protocols => "PROTOCOLS", Long;
    ProtocolsStr => "PROTOCOLS_STR", Text;
    Proxy => "PROXY", Text;
    Proxyauth => "PROXYAUTH", Values;
    Proxyheader => "PROXYHEADER", List;
    Proxypassword => "PROXYPASSWORD", Text;
    Proxyport => "PROXYPORT", Long;
    Proxytype => "PROXYTYPE", Values;
    Proxyusername => "PROXYUSERNAME", Text;
    Proxyuserpwd => "PROXYUSERPWD", Text;
    ProxyCainfo => "PROXY_CAINFO", Text;
    ProxyCainfoBlob => "PROXY_CAINFO_BLOB", Blob;
    ProxyCapath => "PROXY_CAPATH", Text;
    ProxyCrlfile => "PROXY_CRLFILE", Text;
    ProxyIssuercert => "PROXY_ISSUERCERT", Text;
    ProxyIssuercertBlob => "PROXY_ISSUERCERT_BLOB", Blob;
    ProxyKeypasswd => "PROXY_KEYPASSWD", Text;
    ProxyPinnedpublickey => "PROXY_PINNEDPUBLICKEY", Text;
    ProxyServiceName => "PROXY_SERVICE_NAME", Text;
    ProxySslcert => "PROXY_SSLCERT", Text;
    ProxySslcerttype => "PROXY_SSLCERTTYPE", Text;
    ProxySslcertBlob => "PROXY_SSLCERT_BLOB", Blob;
    ProxySslkey => "PROXY_SSLKEY", Text;
    ProxySslkeytype => "PROXY_SSLKEYTYPE", Text;
    ProxySslkeyBlob => "PROXY_SSLKEY_BLOB", Blob;
    ProxySslversion => "PROXY_SSLVERSION", Values;
    ProxySslCipherList => "PROXY_SSL_CIPHER_LIST", Text;
    ProxySslOptions => "PROXY_SSL_OPTIONS", Long;
    ProxySslVerifyhost => "PROXY_SSL_VERIFYHOST", Long;
    ProxySslVerifypeer => "PROXY_SSL_VERIFYPEER", Long;
    ProxyTls13Ciphers => "PROXY_TLS13_CIPHERS", Text;
    ProxyTlsauthPassword => "PROXY_TLSAUTH_PASSWORD", Text;
    ProxyTlsauthType => "PROXY_TLSAUTH_TYPE", Text;
    ProxyTlsauthUsername => "PROXY_TLSAUTH_USERNAME", Text;
    ProxyTransferMode => "PROXY_TRANSFER_MODE", Long;
    Put => "PUT", Long;
    QuickExit => "QUICK_EXIT", Long;
    Quote => "QUOTE", List;
    RandomFile => "RANDOM_FILE", Text;
    Range => "RANGE", Text;
    Readdata => "READDATA", CallbackData;
    Readfunction => "READFUNCTION", Function;
    RedirProtocols => "REDIR_PROTOCOLS", Long;
    RedirProtocolsStr => "REDIR_PROTOCOLS_STR", Text;
    Referer => "REFERER", Text;
    RequestTarget => "REQUEST_TARGET", Text;
    Resolve => "RESOLVE", List;
    ResolverStartData => "RESOLVER_START_DATA", CallbackData;
    ResolverStartFunction => "RESOLVER_START_FUNCTION", Function;
    ResumeFrom => "RESUME_FROM", Long;
    ResumeFromLarge => "RESUME_FROM_LARGE", OffT;
    RtspClientCseq => "RTSP_CLIENT_CSEQ", Long;
    RtspRequest => "RTSP_REQUEST", Values;
    RtspServerCseq => "RTSP_SERVER_CSEQ", Long;
    RtspSessionId => "RTSP_SESSION_ID", Text;
    RtspStreamUri => "RTSP_STREAM_URI", Text;
    RtspTransport => "RTSP_TRANSPORT", Text;
    SaslAuthzid => "SASL_AUTHZID", Text;
    SaslIr => "SASL_IR", Long;
    Seekdata => "SEEKDATA", CallbackData;
    Seekfunction => "SEEKFUNCTION", Function;
    ServerResponseTimeout => "SERVER_RESPONSE_TIMEOUT", Long;
    ServiceName => "SERVICE_NAME", Text;
    Share => "SHARE", Object;
    Sockoptdata => "SOCKOPTDATA", CallbackData;
    Sockoptfunction => "SOCKOPTFUNCTION", Function;
    Socks5Auth => "SOCKS5_AUTH", Long;
    Socks5GssapiNec => "SOCKS5_GSSAPI_NEC", Long;
    Socks5GssapiService => "SOCKS5_GSSAPI_SERVICE", Text;
    SshAuthTypes => "SSH_AUTH_TYPES", Values;
    SshCompression => "SSH_COMPRESSION", Long;
    SshHostkeydata => "SSH_HOSTKEYDATA", CallbackData;
    SshHostkeyfunction => "SSH_HOSTKEYFUNCTION", Function;
    SshHostPublicKeyMd5 => "SSH_HOST_PUBLIC_KEY_MD5", Text;
    SshHostPublicKeySha256 => "SSH_HOST_PUBLIC_KEY_SHA256", Text;
    SshKeydata => "SSH_KEYDATA", CallbackData;
    SshKeyfunction => "SSH_KEYFUNCTION", Function;
    SshKnownhosts => "SSH_KNOWNHOSTS", Text;
    SshPrivateKeyfile => "SSH_PRIVATE_KEYFILE", Text;
    SshPublicKeyfile => "SSH_PUBLIC_KEYFILE", Text;
    Sslcert => "SSLCERT", Text;
    Sslcerttype => "SSLCERTTYPE", Text;
    SslcertBlob => "SSLCERT_BLOB", Blob;
    Sslengine => "SSLENGINE", Text;
    SslengineDefault => "SSLENGINE_DEFAULT", Long;
    Sslkey => "SSLKEY", Text;
    Sslkeytype => "SSLKEYTYPE", Text;
    SslkeyBlob => "SSLKEY_BLOB", Blob;
    Sslversion => "SSLVERSION", Values;
    SslCipherList => "SSL_CIPHER_LIST", Text;
    SslCtxData => "SSL_CTX_DATA", CallbackData;
    SslCtxFunction => "SSL_CTX_FUNCTION", Function;
    SslEcCurves => "SSL_EC_CURVES", Text;
    SslEnableAlpn => "SSL_ENABLE_ALPN", Long;
    SslEnableNpn => "SSL_ENABLE_NPN", Long;
    SslFalsestart => "SSL_FALSESTART", Long;
    SslOptions => "SSL_OPTIONS", Values;
    SslSessionidCache => "SSL_SESSIONID_CACHE", Long;
    SslVerifyhost => "SSL_VERIFYHOST", Long;
    SslVerifypeer => "SSL_VERIFYPEER", Long;
    SslVerifystatus => "SSL_VERIFYSTATUS", Long;
    Stderr => "STDERR", Object;
    StreamDepends => "STREAM_DEPENDS", Object;
    StreamDependsE => "STREAM_DEPENDS_E", Object;
    StreamWeight => "STREAM_WEIGHT", Long;
    SuppressConnectHeaders => "SUPPRESS_CONNECT_HEADERS", Long;
    TcpFastopen => "TCP_FASTOPEN", Long;
    TcpKeepalive => "TCP_KEEPALIVE", Long;
    TcpKeepidle => "TCP_KEEPIDLE", Long;
    TcpKeepintvl => "TCP_KEEPINTVL", Long;
    TcpNodelay => "TCP_NODELAY", Long;
    Telnetoptions => "TELNETOPTIONS", List;
    TftpBlksize => "TFTP_BLKSIZE", Long;
    TftpNoOptions => "TFTP_NO_OPTIONS", Long;
    Timecondition => "TIMECONDITION", Values;
    Timeout => "TIMEOUT", Long;
    TimeoutMs => "TIMEOUT_MS", Long;
    Timevalue => "TIMEVALUE", Long;
    TimevalueLarge => "TIMEVALUE_LARGE", OffT;
    Tls13Ciphers => "TLS13_CIPHERS", Text;
    TlsauthPassword => "TLSAUTH_PASSWORD", Text;
    TlsauthType => "TLSAUTH_TYPE", Text;
    TlsauthUsername => "TLSAUTH_USERNAME", Text;
    Trailerdata => "TRAILERDATA", CallbackData;
    Trailerfunction => "TRAILERFUNCTION", Function;
    Transfertext => "TRANSFERTEXT", Long;
    TransferEncoding => "TRANSFER_ENCODING", Long;
    UnixSocketPath => "UNIX_SOCKET_PATH", Text;
    UnrestrictedAuth => "UNRESTRICTED_AUTH", Long;
    UpkeepIntervalMs => "UPKEEP_INTERVAL_MS", Long;
    Upload => "UPLOAD", Long;
    UploadBuffersize => "UPLOAD_BUFFERSIZE", Long;
    Url => "URL", Text;
    Useragent => "USERAGENT", Text;
    Username => "USERNAME", Text;
    Userpwd => "USERPWD", Text;
    UseSsl => "USE_SSL", Values;
    Verbose => "VERBOSE", Long;
    Wildcardmatch => "WILDCARDMATCH", Long;
    Writedata => "WRITEDATA", CallbackData;
    Writefunction => "WRITEFUNCTION", Function;
    WsOptions => "WS_OPTIONS", Long;
    Xferinfodata => "XFERINFODATA", CallbackData;
    Xferinfofunction => "XFERINFOFUNCTION", Function;
    Xoauth2Bearer => "XOAUTH2_BEARER", Text;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique_and_upper_case() {
        let mut seen = HashSet::new();
        for opt in Opt::ALL {
            assert!(seen.insert(opt.name()), "duplicate {}", opt.name());
            assert_eq!(opt.name(), opt.name().to_ascii_uppercase());
        }
        assert_eq!(seen.len(), 304);
    }

    #[test]
    fn lookup_ignores_case_and_prefix() {
        assert_eq!(Opt::from_name("url"), Some(Opt::Url));
        assert_eq!(Opt::from_name("CURLOPT_HTTPHEADER"), Some(Opt::Httpheader));
        assert_eq!(Opt::from_name("curlopt_useragent"), Some(Opt::Useragent));
        assert_eq!(Opt::from_name("NOT_AN_OPTION"), None);
    }

    #[test]
    fn categories_follow_native_types() {
        assert_eq!(Opt::Url.category(), ValueCategory::Text);
        assert_eq!(Opt::Httpheader.category(), ValueCategory::List);
        assert_eq!(Opt::SslcertBlob.category(), ValueCategory::Blob);
        assert_eq!(Opt::Writefunction.category(), ValueCategory::Function);
        assert_eq!(Opt::Writedata.category(), ValueCategory::CallbackData);
        assert_eq!(Opt::PostfieldsizeLarge.category(), ValueCategory::OffT);
        assert_eq!(Opt::HttpVersion.category(), ValueCategory::Values);
        assert_eq!(Opt::Errorbuffer.category(), ValueCategory::Object);
    }
}
