//! Invoicing domain module.
//!
//! Invoice records, the create-payload schema, and the repository port.
//! Invoices are create/list only.

pub mod invoice;
pub mod repository;

pub use invoice::{Invoice, NewInvoice, ProductLine, create_schema};
pub use repository::InvoiceRepository;
