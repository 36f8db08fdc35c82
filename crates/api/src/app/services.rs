//! Repository wiring for the HTTP layer.

use std::sync::Arc;

use rolodex_contacts::ContactRepository;
use rolodex_core::RepositoryResult;
use rolodex_infra::store::{
    self, InMemoryContactRepository, InMemoryInvoiceRepository, PostgresContactRepository,
    PostgresInvoiceRepository,
};
use rolodex_infra::StoreConfig;
use rolodex_invoicing::InvoiceRepository;

#[derive(Clone)]
pub struct AppServices {
    pub contacts: Arc<dyn ContactRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
}

impl AppServices {
    pub fn in_memory() -> Self {
        Self {
            contacts: Arc::new(InMemoryContactRepository::new()),
            invoices: Arc::new(InMemoryInvoiceRepository::new()),
        }
    }

    pub async fn postgres(url: &str) -> RepositoryResult<Self> {
        let pool = store::connect(url).await?;
        Ok(Self {
            contacts: Arc::new(PostgresContactRepository::new(pool.clone())),
            invoices: Arc::new(PostgresInvoiceRepository::new(pool)),
        })
    }

    pub async fn from_config(store: &StoreConfig) -> RepositoryResult<Self> {
        match store {
            StoreConfig::InMemory => {
                tracing::info!("using in-memory store; data is lost on restart");
                Ok(Self::in_memory())
            }
            StoreConfig::Postgres { url } => {
                tracing::info!("connecting to postgres store");
                Self::postgres(url).await
            }
        }
    }
}
