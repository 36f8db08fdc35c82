use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rolodex_core::{ContactId, Entity};

/// A stored contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub mobile_number: String,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating a contact (already schema-validated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub mobile_number: String,
}

/// Fields to overwrite on an existing contact.
///
/// `None` keeps the stored value. Used by both full and partial updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
}

impl Contact {
    /// Materialize a new record with a fresh identifier.
    pub fn create(new: NewContact, now: DateTime<Utc>) -> Self {
        Self {
            id: ContactId::new(),
            name: new.name,
            email: new.email,
            mobile_number: new.mobile_number,
            created_at: now,
        }
    }

    /// Merge `changes` into this record, leaving unspecified fields untouched.
    pub fn apply(&mut self, changes: ContactChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(mobile_number) = changes.mobile_number {
            self.mobile_number = mobile_number;
        }
    }

    /// Case-insensitive substring match over `name` and `email`.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.email.to_lowercase().contains(&term)
    }
}

impl Entity for Contact {
    type Id = ContactId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl From<NewContact> for ContactChanges {
    fn from(new: NewContact) -> Self {
        Self {
            name: Some(new.name),
            email: Some(new.email),
            mobile_number: Some(new.mobile_number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn john() -> Contact {
        Contact::create(
            NewContact {
                name: "John Doe".into(),
                email: "john@example.com".into(),
                mobile_number: "0851234567890".into(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn apply_overwrites_only_supplied_fields() {
        let mut contact = john();
        contact.apply(ContactChanges {
            name: Some("Johnny".into()),
            ..Default::default()
        });
        assert_eq!(contact.name, "Johnny");
        assert_eq!(contact.email, "john@example.com");
        assert_eq!(contact.mobile_number, "0851234567890");
    }

    #[test]
    fn full_changes_replace_every_field() {
        let mut contact = john();
        let id = contact.id;
        contact.apply(
            NewContact {
                name: "Jane".into(),
                email: "jane@example.com".into(),
                mobile_number: "0811111111".into(),
            }
            .into(),
        );
        assert_eq!(contact.id, id);
        assert_eq!(contact.email, "jane@example.com");
        assert_eq!(contact.mobile_number, "0811111111");
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_email() {
        let contact = john();
        assert!(contact.matches_search("JOHN"));
        assert!(contact.matches_search("example.COM"));
        assert!(!contact.matches_search("jane"));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let value = serde_json::to_value(john()).unwrap();
        assert!(value.get("mobileNumber").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["id"].as_str().map(str::len), Some(36));
    }
}
