//! Contacts domain module.
//!
//! Contact records, their payload schemas, and the repository port that
//! storage adapters implement. No IO, no HTTP.

pub mod contact;
pub mod repository;
pub mod schema;

pub use contact::{Contact, ContactChanges, NewContact};
pub use repository::ContactRepository;
