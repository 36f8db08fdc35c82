//! In-memory repositories for tests/dev.
//!
//! Records live in a `BTreeMap` keyed by their UUIDv7 identifier, so
//! iteration order is creation order. Each write holds the lock for the whole
//! check-and-mutate step, which is what makes the email uniqueness check
//! race-free.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use rolodex_contacts::{Contact, ContactChanges, ContactRepository, NewContact};
use rolodex_core::{
    ContactId, Entity, ListQuery, Page, RepositoryError, RepositoryResult,
};
use rolodex_invoicing::{Invoice, InvoiceRepository, NewInvoice};

/// Ordered, lock-protected record table.
#[derive(Debug)]
struct Table<E: Entity> {
    rows: RwLock<BTreeMap<E::Id, E>>,
}

impl<E: Entity + Clone> Table<E> {
    fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, BTreeMap<E::Id, E>>> {
        self.rows
            .read()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, BTreeMap<E::Id, E>>> {
        self.rows
            .write()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".to_string()))
    }

    fn insert(&self, entity: E) -> RepositoryResult<()> {
        self.write()?.insert(*entity.id(), entity);
        Ok(())
    }

    fn page(&self, query: &ListQuery, matches: impl Fn(&E, &str) -> bool) -> RepositoryResult<Page<E>> {
        let rows = self.read()?;
        let filtered: Vec<E> = match query.search() {
            Some(term) => rows.values().filter(|e| matches(e, term)).cloned().collect(),
            None => rows.values().cloned().collect(),
        };
        let total = filtered.len() as u64;
        Ok(Page::new(query.window(&filtered), query, total))
    }
}

#[derive(Debug)]
pub struct InMemoryContactRepository {
    table: Table<Contact>,
}

impl InMemoryContactRepository {
    pub fn new() -> Self {
        Self { table: Table::new() }
    }
}

impl Default for InMemoryContactRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn email_taken(rows: &BTreeMap<ContactId, Contact>, email: &str, except: Option<ContactId>) -> bool {
    rows.values()
        .any(|c| c.email == email && Some(c.id) != except)
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn list(&self, query: &ListQuery) -> RepositoryResult<Page<Contact>> {
        self.table.page(query, Contact::matches_search)
    }

    async fn get(&self, id: ContactId) -> RepositoryResult<Option<Contact>> {
        Ok(self.table.read()?.get(&id).cloned())
    }

    async fn create(&self, new: NewContact) -> RepositoryResult<Contact> {
        let mut rows = self.table.write()?;
        if email_taken(&rows, &new.email, None) {
            return Err(RepositoryError::Conflict(format!("email {} exists", new.email)));
        }

        let contact = Contact::create(new, Utc::now());
        rows.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn update(&self, id: ContactId, changes: ContactChanges) -> RepositoryResult<Option<Contact>> {
        let mut rows = self.table.write()?;
        if let Some(email) = &changes.email {
            if email_taken(&rows, email, Some(id)) {
                return Err(RepositoryError::Conflict(format!("email {email} exists")));
            }
        }

        Ok(rows.get_mut(&id).map(|contact| {
            contact.apply(changes);
            contact.clone()
        }))
    }

    async fn delete(&self, id: ContactId) -> RepositoryResult<Option<Contact>> {
        Ok(self.table.write()?.remove(&id))
    }
}

#[derive(Debug)]
pub struct InMemoryInvoiceRepository {
    table: Table<Invoice>,
}

impl InMemoryInvoiceRepository {
    pub fn new() -> Self {
        Self { table: Table::new() }
    }
}

impl Default for InMemoryInvoiceRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
    async fn list(&self, query: &ListQuery) -> RepositoryResult<Page<Invoice>> {
        self.table.page(query, Invoice::matches_search)
    }

    async fn create(&self, new: NewInvoice) -> RepositoryResult<Invoice> {
        let invoice = Invoice::create(new, Utc::now());
        self.table.insert(invoice.clone())?;
        Ok(invoice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolodex_invoicing::ProductLine;

    fn new_contact(n: usize) -> NewContact {
        NewContact {
            name: format!("Contact {n}"),
            email: format!("contact{n}@example.com"),
            mobile_number: "0851234567890".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_same_record() {
        let repo = InMemoryContactRepository::new();
        let created = repo.create(new_contact(1)).await.unwrap();
        let fetched = repo.get(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let repo = InMemoryContactRepository::new();
        repo.create(new_contact(1)).await.unwrap();
        let err = repo.create(new_contact(1)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_merges_and_guards_email_uniqueness() {
        let repo = InMemoryContactRepository::new();
        let first = repo.create(new_contact(1)).await.unwrap();
        let second = repo.create(new_contact(2)).await.unwrap();

        let updated = repo
            .update(
                first.id,
                ContactChanges {
                    name: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.email, first.email);

        // Re-submitting one's own email is not a conflict.
        let same = ContactChanges {
            email: Some(first.email.clone()),
            ..Default::default()
        };
        assert!(repo.update(first.id, same).await.is_ok());

        let steal = ContactChanges {
            email: Some(second.email.clone()),
            ..Default::default()
        };
        let err = repo.update(first.id, steal).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_and_delete_of_unknown_id_return_none() {
        let repo = InMemoryContactRepository::new();
        let id = ContactId::new();
        assert_eq!(repo.update(id, ContactChanges::default()).await.unwrap(), None);
        assert_eq!(repo.delete(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_returns_removed_record() {
        let repo = InMemoryContactRepository::new();
        let created = repo.create(new_contact(1)).await.unwrap();
        assert_eq!(repo.delete(created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(repo.get(created.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_pages_in_creation_order() {
        let repo = InMemoryContactRepository::new();
        for n in 0..15 {
            repo.create(new_contact(n)).await.unwrap();
        }

        let query = ListQuery::from_pairs([("page", "2"), ("limit", "10")]);
        let page = repo.list(&query).await.unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total, 15);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items[0].name, "Contact 10");
    }

    #[tokio::test]
    async fn list_filters_by_search_before_paging() {
        let repo = InMemoryContactRepository::new();
        for n in 0..12 {
            repo.create(new_contact(n)).await.unwrap();
        }

        let query = ListQuery::from_pairs([("search", "CONTACT1")]);
        let page = repo.list(&query).await.unwrap();
        // contact1, contact10, contact11
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn invoices_are_listed_and_searchable() {
        let repo = InMemoryInvoiceRepository::new();
        repo.create(NewInvoice {
            invoice_number: "INV-001".into(),
            amount: 500,
            product_list: vec![ProductLine {
                name: "Mouse".into(),
                quantity: 1,
                price: 500,
            }],
        })
        .await
        .unwrap();
        repo.create(NewInvoice {
            invoice_number: "INV-002".into(),
            amount: 900,
            product_list: vec![],
        })
        .await
        .unwrap();

        let all = repo.list(&ListQuery::default()).await.unwrap();
        assert_eq!(all.total, 2);
        assert_eq!(all.items[0].invoice_number, "INV-001");

        let mice = repo
            .list(&ListQuery::from_pairs([("search", "mouse")]))
            .await
            .unwrap();
        assert_eq!(mice.items.len(), 1);
    }
}
