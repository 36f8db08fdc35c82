//! Repository implementations.
//!
//! - [`in_memory`]: process-local, used for dev and tests.
//! - [`postgres`]: persistent, backed by a `sqlx` connection pool.

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryContactRepository, InMemoryInvoiceRepository};
pub use postgres::{PostgresContactRepository, PostgresInvoiceRepository, connect};
