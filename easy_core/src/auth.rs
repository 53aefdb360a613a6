use std::ops::BitOr;

/// Bitmask accepted by `HTTPAUTH`, `PROXYAUTH` and `SOCKS5_AUTH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Auth(i64);

impl Auth {
    pub const NONE: Auth = Auth(0);
    pub const BASIC: Auth = Auth(1 << 0);
    pub const DIGEST: Auth = Auth(1 << 1);
    pub const NEGOTIATE: Auth = Auth(1 << 2);
    pub const GSSAPI: Auth = Auth::NEGOTIATE;
    pub const NTLM: Auth = Auth(1 << 3);
    pub const DIGEST_IE: Auth = Auth(1 << 4);
    pub const NTLM_WB: Auth = Auth(1 << 5);
    pub const BEARER: Auth = Auth(1 << 6);
    pub const AWS_SIGV4: Auth = Auth(1 << 7);
    pub const ONLY: Auth = Auth(1 << 31);
    pub const ANY: Auth = Auth(!(1 << 4));
    pub const ANY_SAFE: Auth = Auth(!((1 << 0) | (1 << 4)));

    pub fn bits(self) -> i64 {
        self.0
    }
}

impl BitOr for Auth {
    type Output = Auth;

    fn bitor(self, rhs: Auth) -> Auth {
        Auth(self.0 | rhs.0)
    }
}

impl From<Auth> for crate::OptionValue {
    fn from(auth: Auth) -> Self {
        crate::OptionValue::Integer(auth.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_combine() {
        assert_eq!((Auth::BASIC | Auth::DIGEST).bits(), 3);
        assert_eq!(Auth::ANY.bits() & Auth::DIGEST_IE.bits(), 0);
        assert_eq!(Auth::ANY_SAFE.bits() & Auth::BASIC.bits(), 0);
        assert_eq!(Auth::ONLY.bits(), 2_147_483_648);
    }
}
