use async_trait::async_trait;

use rolodex_core::{ContactId, ListQuery, Page, RepositoryResult};

use crate::contact::{Contact, ContactChanges, NewContact};

/// Storage port for contacts.
///
/// Implementations own email uniqueness and report violations as
/// `RepositoryError::Conflict`.
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Page through contacts in creation order, filtered by `query.search()`.
    async fn list(&self, query: &ListQuery) -> RepositoryResult<Page<Contact>>;

    async fn get(&self, id: ContactId) -> RepositoryResult<Option<Contact>>;

    async fn create(&self, new: NewContact) -> RepositoryResult<Contact>;

    /// Merge `changes` into the stored record. `Ok(None)` when absent.
    async fn update(&self, id: ContactId, changes: ContactChanges) -> RepositoryResult<Option<Contact>>;

    /// Remove and return the record. `Ok(None)` when absent.
    async fn delete(&self, id: ContactId) -> RepositoryResult<Option<Contact>>;
}
