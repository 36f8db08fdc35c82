//! `rolodex-auth`: API-key authentication boundary.
//!
//! This crate is intentionally decoupled from HTTP: callers hand it the raw
//! header value (if any) and get back an [`Identity`] or an [`AuthError`].

pub mod allow_list;
pub mod identity;

pub use allow_list::{ApiKeyAllowList, AuthError, DEFAULT_API_KEYS};
pub use identity::{Identity, LIVE_KEY_PREFIX};
