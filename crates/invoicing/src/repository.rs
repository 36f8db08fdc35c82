use async_trait::async_trait;

use rolodex_core::{ListQuery, Page, RepositoryResult};

use crate::invoice::{Invoice, NewInvoice};

/// Storage port for invoices.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Page through invoices in creation order, filtered by `query.search()`.
    async fn list(&self, query: &ListQuery) -> RepositoryResult<Page<Invoice>>;

    async fn create(&self, new: NewInvoice) -> RepositoryResult<Invoice>;
}
