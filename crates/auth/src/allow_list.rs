use std::collections::HashSet;

use thiserror::Error;

use crate::identity::Identity;

/// Keys accepted when no allow-list is configured.
pub const DEFAULT_API_KEYS: [&str; 3] = ["sk_test_12345", "sk_test_67890", "sk_live_abcdef"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("API key missing; add the 'x-api-key' header to the request")]
    MissingKey,

    #[error("API key is invalid")]
    InvalidKey,
}

/// Static set of accepted API keys.
///
/// Plain string comparison: no hashing, rotation or expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyAllowList {
    keys: HashSet<String>,
}

impl Default for ApiKeyAllowList {
    fn default() -> Self {
        Self::new(DEFAULT_API_KEYS)
    }
}

impl ApiKeyAllowList {
    /// Blank entries are dropped; surrounding whitespace is trimmed.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(|k| k.as_ref().trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Check a presented credential.
    ///
    /// `None` means the header was absent; an empty value counts as absent.
    pub fn authenticate(&self, presented: Option<&str>) -> Result<Identity, AuthError> {
        let key = presented
            .filter(|k| !k.is_empty())
            .ok_or(AuthError::MissingKey)?;

        if !self.contains(key) {
            tracing::debug!("rejected unknown api key");
            return Err(AuthError::InvalidKey);
        }

        Ok(Identity::from_credential(key))
    }
}
