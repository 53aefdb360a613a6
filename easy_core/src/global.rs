/*
 * Process-wide settings handed to the native library before any handle
 * exists: the init flag set, the TLS backend identifiers and the result of
 * selecting a backend.
 *
 * Flag and backend names deserialize case-insensitively so they can be
 * written naturally in configuration files.
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// Flags for the one-time global init call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GlobalInit(i64);

impl GlobalInit {
    pub const NOTHING: GlobalInit = GlobalInit(0);
    pub const SSL: GlobalInit = GlobalInit(1 << 0);
    pub const WIN32: GlobalInit = GlobalInit(1 << 1);
    pub const ALL: GlobalInit = GlobalInit((1 << 0) | (1 << 1));
    pub const DEFAULT: GlobalInit = GlobalInit::ALL;
    pub const ACK_EINTR: GlobalInit = GlobalInit(1 << 2);

    pub fn bits(self) -> i64 {
        self.0
    }

    pub fn contains(self, other: GlobalInit) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn from_flag_name(name: &str) -> Option<GlobalInit> {
        match name.to_lowercase().as_str() {
            "nothing" | "none" => Some(GlobalInit::NOTHING),
            "ssl" => Some(GlobalInit::SSL),
            "win32" => Some(GlobalInit::WIN32),
            "all" => Some(GlobalInit::ALL),
            "default" => Some(GlobalInit::DEFAULT),
            "ack_eintr" | "ackeintr" => Some(GlobalInit::ACK_EINTR),
            _ => None,
        }
    }
}

impl Default for GlobalInit {
    fn default() -> Self {
        GlobalInit::DEFAULT
    }
}

impl BitOr for GlobalInit {
    type Output = GlobalInit;

    fn bitor(self, rhs: GlobalInit) -> GlobalInit {
        GlobalInit(self.0 | rhs.0)
    }
}

const INIT_FLAG_NAMES: &[&str] = &["nothing", "ssl", "win32", "all", "default", "ack_eintr"];

// Accepts either a single flag name or a list of names OR-ed together.
impl<'de> Deserialize<'de> for GlobalInit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }

        let names = match Raw::deserialize(deserializer)? {
            Raw::One(name) => vec![name],
            Raw::Many(names) => names,
        };

        let mut flags = GlobalInit::NOTHING;
        for name in names {
            match GlobalInit::from_flag_name(&name) {
                Some(flag) => flags = flags | flag,
                None => return Err(serde::de::Error::unknown_variant(&name, INIT_FLAG_NAMES)),
            }
        }
        Ok(flags)
    }
}

/// TLS backends the native library may be built against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SslBackend {
    None,
    OpenSsl,
    GnuTls,
    Nss,
    GsKit,
    PolarSsl,
    WolfSsl,
    Schannel,
    SecureTransport,
    AxTls,
    MbedTls,
    MesaLink,
    BearSsl,
    Rustls,
    Other(i32),
}

impl SslBackend {
    pub fn from_id(id: i32) -> SslBackend {
        match id {
            0 => SslBackend::None,
            1 => SslBackend::OpenSsl,
            2 => SslBackend::GnuTls,
            3 => SslBackend::Nss,
            5 => SslBackend::GsKit,
            6 => SslBackend::PolarSsl,
            7 => SslBackend::WolfSsl,
            8 => SslBackend::Schannel,
            9 => SslBackend::SecureTransport,
            10 => SslBackend::AxTls,
            11 => SslBackend::MbedTls,
            12 => SslBackend::MesaLink,
            13 => SslBackend::BearSsl,
            14 => SslBackend::Rustls,
            other => SslBackend::Other(other),
        }
    }

    pub fn id(self) -> i32 {
        match self {
            SslBackend::None => 0,
            SslBackend::OpenSsl => 1,
            SslBackend::GnuTls => 2,
            SslBackend::Nss => 3,
            SslBackend::GsKit => 5,
            SslBackend::PolarSsl => 6,
            SslBackend::WolfSsl => 7,
            SslBackend::Schannel => 8,
            SslBackend::SecureTransport => 9,
            SslBackend::AxTls => 10,
            SslBackend::MbedTls => 11,
            SslBackend::MesaLink => 12,
            SslBackend::BearSsl => 13,
            SslBackend::Rustls => 14,
            SslBackend::Other(id) => id,
        }
    }

    /// Name as the native library spells it for backend selection.
    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            SslBackend::None => "none",
            SslBackend::OpenSsl => "openssl",
            SslBackend::GnuTls => "gnutls",
            SslBackend::Nss => "nss",
            SslBackend::GsKit => "gskit",
            SslBackend::PolarSsl => "polarssl",
            SslBackend::WolfSsl => "wolfssl",
            SslBackend::Schannel => "schannel",
            SslBackend::SecureTransport => "secure-transport",
            SslBackend::AxTls => "axtls",
            SslBackend::MbedTls => "mbedtls",
            SslBackend::MesaLink => "mesalink",
            SslBackend::BearSsl => "bearssl",
            SslBackend::Rustls => "rustls",
            SslBackend::Other(_) => return None,
        })
    }

    pub fn from_name(name: &str) -> Option<SslBackend> {
        let wanted = name.to_lowercase().replace('_', "-");
        let wanted = if wanted == "securetransport" { "secure-transport".to_string() } else { wanted };
        (0..=14)
            .map(SslBackend::from_id)
            .find(|backend| backend.name() == Some(wanted.as_str()))
    }
}

impl fmt::Display for SslBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "backend #{}", self.id()),
        }
    }
}

impl<'de> Deserialize<'de> for SslBackend {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SslBackend::from_name(&s).ok_or_else(|| {
            serde::de::Error::unknown_variant(
                &s,
                &[
                    "openssl", "gnutls", "wolfssl", "schannel", "secure-transport", "mbedtls",
                    "bearssl", "rustls",
                ],
            )
        })
    }
}

/// Outcome of selecting a TLS backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SslSet {
    Ok,
    UnknownBackend,
    TooLate,
    NoBackends,
    Other(i32),
}

impl SslSet {
    pub fn from_raw(raw: i32) -> SslSet {
        match raw {
            0 => SslSet::Ok,
            1 => SslSet::UnknownBackend,
            2 => SslSet::TooLate,
            3 => SslSet::NoBackends,
            other => SslSet::Other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Section {
        init: GlobalInit,
        backend: Option<SslBackend>,
    }

    #[test]
    fn init_flags_parse_from_list_or_single_name() {
        let section: Section = toml::from_str(r#"init = ["SSL", "win32"]"#).unwrap();
        assert_eq!(section.init, GlobalInit::ALL);
        assert!(section.backend.is_none());

        let section: Section = toml::from_str(r#"init = "ack_eintr""#).unwrap();
        assert!(section.init.contains(GlobalInit::ACK_EINTR));
        assert!(!section.init.contains(GlobalInit::SSL));
    }

    #[test]
    fn unknown_init_flag_is_rejected() {
        assert!(toml::from_str::<Section>(r#"init = ["ssl", "bogus"]"#).is_err());
    }

    #[test]
    fn backend_names_round_trip() {
        for id in 0..=14 {
            let backend = SslBackend::from_id(id);
            if let Some(name) = backend.name() {
                assert_eq!(SslBackend::from_name(name), Some(backend));
            }
        }
        assert_eq!(SslBackend::from_name("SecureTransport"), Some(SslBackend::SecureTransport));
        assert_eq!(SslBackend::from_id(4), SslBackend::Other(4));

        let section: Section = toml::from_str("init = \"default\"\nbackend = \"OpenSSL\"").unwrap();
        assert_eq!(section.backend, Some(SslBackend::OpenSsl));
    }

    #[test]
    fn sslset_codes() {
        assert_eq!(SslSet::from_raw(2), SslSet::TooLate);
        assert_eq!(SslSet::from_raw(9), SslSet::Other(9));
    }
}
