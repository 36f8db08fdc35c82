use serde::Serialize;

/// Keys with this prefix belong to the privileged ("live") class.
pub const LIVE_KEY_PREFIX: &str = "sk_live_";

/// Identity marker attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    credential: String,
    is_privileged: bool,
}

impl Identity {
    pub fn from_credential(credential: impl Into<String>) -> Self {
        let credential = credential.into();
        let is_privileged = credential.starts_with(LIVE_KEY_PREFIX);
        Self {
            credential,
            is_privileged,
        }
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn is_privileged(&self) -> bool {
        self.is_privileged
    }
}
