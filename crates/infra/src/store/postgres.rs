//! Postgres-backed repositories.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | RepositoryError |
//! |------------|-----------------------|-----------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Unavailable` |
//! | ColumnDecode / Decode | N/A | `Corrupt` |
//! | Other | N/A | `Unavailable` |
//!
//! Email uniqueness is owned by the `contacts_email_key` unique index; the
//! application performs no check of its own on this path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use rolodex_contacts::{Contact, ContactChanges, ContactRepository, NewContact};
use rolodex_core::{
    ContactId, InvoiceId, ListQuery, Page, RepositoryError, RepositoryResult,
};
use rolodex_invoicing::{Invoice, InvoiceRepository, NewInvoice, ProductLine};

const SCHEMA: &str = include_str!("schema.sql");

/// Open a pool and make sure both tables exist.
pub async fn connect(url: &str) -> RepositoryResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))?;

    sqlx::raw_sql(SCHEMA)
        .execute(&pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;

    Ok(pool)
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.as_ref() == "23505" => {
                    RepositoryError::Conflict(db_err.constraint().unwrap_or("unique").to_string())
                }
                _ => RepositoryError::Unavailable(msg),
            }
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            RepositoryError::Corrupt(format!("{operation}: {err}"))
        }
        other => RepositoryError::Unavailable(format!("{operation}: {other}")),
    }
}

/// `%term%` with LIKE metacharacters escaped.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn to_i64(value: u64, field: &str) -> RepositoryResult<i64> {
    i64::try_from(value)
        .map_err(|_| RepositoryError::Unavailable(format!("{field} out of range for storage")))
}

fn to_u64(value: i64, field: &str) -> RepositoryResult<u64> {
    u64::try_from(value).map_err(|_| RepositoryError::Corrupt(format!("negative {field}")))
}

fn decode<T>(row: &PgRow, column: &str, operation: &str) -> RepositoryResult<T>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get::<T, _>(column)
        .map_err(|e| map_sqlx_error(operation, e))
}

// -------------------------
// Contacts
// -------------------------

const CONTACT_COLUMNS: &str = "id, name, email, mobile_number, created_at";

#[derive(Debug, Clone)]
pub struct PostgresContactRepository {
    pool: PgPool,
}

impl PostgresContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn contact_from_row(row: &PgRow) -> RepositoryResult<Contact> {
    const OP: &str = "decode_contact";
    Ok(Contact {
        id: ContactId::from_uuid(decode::<Uuid>(row, "id", OP)?),
        name: decode(row, "name", OP)?,
        email: decode(row, "email", OP)?,
        mobile_number: decode(row, "mobile_number", OP)?,
        created_at: decode::<DateTime<Utc>>(row, "created_at", OP)?,
    })
}

#[async_trait]
impl ContactRepository for PostgresContactRepository {
    #[instrument(skip(self), err)]
    async fn list(&self, query: &ListQuery) -> RepositoryResult<Page<Contact>> {
        let pattern = query.search().map(like_pattern);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM contacts
            WHERE $1::text IS NULL OR name ILIKE $1 OR email ILIKE $1
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("count_contacts", e))?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {CONTACT_COLUMNS} FROM contacts
            WHERE $1::text IS NULL OR name ILIKE $1 OR email ILIKE $1
            ORDER BY created_at, id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(pattern.as_deref())
        .bind(i64::from(query.limit()))
        .bind(to_i64(query.offset(), "offset")?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_contacts", e))?;

        let items = rows
            .iter()
            .map(contact_from_row)
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok(Page::new(items, query, to_u64(total, "count")?))
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: ContactId) -> RepositoryResult<Option<Contact>> {
        sqlx::query(&format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_contact", e))?
            .as_ref()
            .map(contact_from_row)
            .transpose()
    }

    #[instrument(skip(self), err)]
    async fn create(&self, new: NewContact) -> RepositoryResult<Contact> {
        let contact = Contact::create(new, Utc::now());

        sqlx::query(
            r#"
            INSERT INTO contacts (id, name, email, mobile_number, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(contact.id.as_uuid())
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.mobile_number)
        .bind(contact.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_contact", e))?;

        Ok(contact)
    }

    #[instrument(skip(self), err)]
    async fn update(&self, id: ContactId, changes: ContactChanges) -> RepositoryResult<Option<Contact>> {
        sqlx::query(&format!(
            r#"
            UPDATE contacts SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                mobile_number = COALESCE($4, mobile_number)
            WHERE id = $1
            RETURNING {CONTACT_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.mobile_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_contact", e))?
        .as_ref()
        .map(contact_from_row)
        .transpose()
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: ContactId) -> RepositoryResult<Option<Contact>> {
        sqlx::query(&format!(
            "DELETE FROM contacts WHERE id = $1 RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_contact", e))?
        .as_ref()
        .map(contact_from_row)
        .transpose()
    }
}

// -------------------------
// Invoices
// -------------------------

const INVOICE_COLUMNS: &str = "id, invoice_number, amount, product_list, created_at";

// Matches the invoice number or any product line name.
const INVOICE_FILTER: &str = r#"
    $1::text IS NULL
    OR invoice_number ILIKE $1
    OR EXISTS (
        SELECT 1 FROM jsonb_array_elements(product_list) AS line
        WHERE line->>'name' ILIKE $1
    )
"#;

#[derive(Debug, Clone)]
pub struct PostgresInvoiceRepository {
    pool: PgPool,
}

impl PostgresInvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn invoice_from_row(row: &PgRow) -> RepositoryResult<Invoice> {
    const OP: &str = "decode_invoice";
    let Json(product_list) = decode::<Json<Vec<ProductLine>>>(row, "product_list", OP)?;
    Ok(Invoice {
        id: InvoiceId::from_uuid(decode::<Uuid>(row, "id", OP)?),
        invoice_number: decode(row, "invoice_number", OP)?,
        amount: to_u64(decode::<i64>(row, "amount", OP)?, "amount")?,
        product_list,
        created_at: decode::<DateTime<Utc>>(row, "created_at", OP)?,
    })
}

#[async_trait]
impl InvoiceRepository for PostgresInvoiceRepository {
    #[instrument(skip(self), err)]
    async fn list(&self, query: &ListQuery) -> RepositoryResult<Page<Invoice>> {
        let pattern = query.search().map(like_pattern);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM invoices WHERE {INVOICE_FILTER}"
        ))
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("count_invoices", e))?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {INVOICE_COLUMNS} FROM invoices
            WHERE {INVOICE_FILTER}
            ORDER BY created_at, id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(pattern.as_deref())
        .bind(i64::from(query.limit()))
        .bind(to_i64(query.offset(), "offset")?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_invoices", e))?;

        let items = rows
            .iter()
            .map(invoice_from_row)
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok(Page::new(items, query, to_u64(total, "count")?))
    }

    #[instrument(skip(self), err)]
    async fn create(&self, new: NewInvoice) -> RepositoryResult<Invoice> {
        let invoice = Invoice::create(new, Utc::now());

        sqlx::query(
            r#"
            INSERT INTO invoices (id, invoice_number, amount, product_list, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(invoice.id.as_uuid())
        .bind(&invoice.invoice_number)
        .bind(to_i64(invoice.amount, "amount")?)
        .bind(Json(&invoice.product_list))
        .bind(invoice.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_invoice", e))?;

        Ok(invoice)
    }
}
