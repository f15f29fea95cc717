//! Single-use token carried in a navigation URL (`?token=...`).

use std::fmt;

use url::Url;

/// Base used to resolve relative locations such as `/auth/reset-password?token=x`.
const RELATIVE_BASE: &str = "http://localhost/";

/// Opaque token from an emailed link. Only its presence is checked here.
#[derive(Clone, PartialEq, Eq)]
pub struct ResetToken(String);

impl ResetToken {
    /// Extract the `token` query parameter. An empty value counts as absent.
    #[must_use]
    pub fn from_url(url: &Url) -> Option<Self> {
        url.query_pairs()
            .find(|(key, _)| key == "token")
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
            .map(Self)
    }

    /// Like [`ResetToken::from_url`], for an absolute or root-relative location string.
    #[must_use]
    pub fn from_location(location: &str) -> Option<Self> {
        let url = Url::parse(location)
            .or_else(|_| Url::parse(RELATIVE_BASE).and_then(|base| base.join(location)))
            .ok()?;
        Self::from_url(&url)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are credentials; keep them out of logs.
impl fmt::Debug for ResetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResetToken(..)")
    }
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
