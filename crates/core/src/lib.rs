//! `rolodex-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod pagination;
pub mod repository;
pub mod validation;

pub use entity::Entity;
pub use error::DomainError;
pub use id::{ContactId, InvoiceId};
pub use pagination::{ListQuery, Page};
pub use repository::{RepositoryError, RepositoryResult};
pub use validation::{FieldRule, FieldViolation, Schema, ValidationErrors};
