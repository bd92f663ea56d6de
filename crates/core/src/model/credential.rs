use std::fmt;

/// Opaque bearer token. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Authorization credential attached to every outbound request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credential {
    Bearer(BearerToken),
    Missing,
}

impl Credential {
    /// Build a credential from a stored value; blank values count as missing.
    #[must_use]
    pub fn from_stored(value: Option<String>) -> Self {
        match value {
            Some(raw) if !raw.trim().is_empty() => Self::Bearer(BearerToken(raw.trim().to_string())),
            _ => Self::Missing,
        }
    }

    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::from_stored(Some(token.into()))
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Bearer(_))
    }

    /// Token text for the `Authorization: Bearer` header. Empty when missing.
    #[must_use]
    pub fn token(&self) -> &str {
        match self {
            Self::Bearer(token) => token.expose(),
            Self::Missing => "",
        }
    }
}
