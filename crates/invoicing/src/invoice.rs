use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use rolodex_core::validation::predicates::{is_array, is_string, non_blank};
use rolodex_core::{Entity, FieldRule, InvoiceId, Schema};

/// One product line on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLine {
    pub name: String,
    pub quantity: u32,
    /// Price in smallest currency unit (e.g., cents).
    pub price: u64,
}

/// A stored invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    pub invoice_number: String,
    /// Total in smallest currency unit.
    pub amount: u64,
    pub product_list: Vec<ProductLine>,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating an invoice (already schema-validated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    pub invoice_number: String,
    pub amount: u64,
    #[serde(default)]
    pub product_list: Vec<ProductLine>,
}

impl Invoice {
    pub fn create(new: NewInvoice, now: DateTime<Utc>) -> Self {
        Self {
            id: InvoiceId::new(),
            invoice_number: new.invoice_number,
            amount: new.amount,
            product_list: new.product_list,
            created_at: now,
        }
    }

    /// Case-insensitive substring match over the invoice number and product names.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.invoice_number.to_lowercase().contains(&term)
            || self
                .product_list
                .iter()
                .any(|line| line.name.to_lowercase().contains(&term))
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Largest amount or price the stores can hold (`BIGINT`).
pub const MAX_MONEY: u64 = i64::MAX as u64;

fn is_money(value: &Value) -> bool {
    value.as_u64().is_some_and(|n| n <= MAX_MONEY)
}

fn is_product_line(value: &Value) -> bool {
    let Some(line) = value.as_object() else {
        return false;
    };
    line.get("name").is_some_and(Value::is_string)
        && line.get("quantity").and_then(Value::as_u64).is_some_and(|q| q <= u64::from(u32::MAX))
        && line.get("price").is_some_and(is_money)
}

fn is_product_list(value: &Value) -> bool {
    value.as_array().is_some_and(|lines| lines.iter().all(is_product_line))
}

static CREATE: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new()
        .field(
            FieldRule::required("invoiceNumber")
                .check("invoiceNumber must be a string", is_string)
                .check("invoiceNumber must not be empty", non_blank),
        )
        .field(
            FieldRule::required("amount")
                .check("amount must be a non-negative integer", is_money),
        )
        .field(
            FieldRule::optional("productList")
                .check("productList must be an array", is_array)
                .check(
                    "productList entries need a string name, integer quantity and integer price",
                    is_product_list,
                ),
        )
});

/// Schema for `POST /invoice` payloads.
pub fn create_schema() -> &'static Schema {
    &CREATE
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn invoice() -> Invoice {
        Invoice::create(
            NewInvoice {
                invoice_number: "INV-2024-001".into(),
                amount: 15_000,
                product_list: vec![ProductLine {
                    name: "Keyboard".into(),
                    quantity: 1,
                    price: 15_000,
                }],
            },
            Utc::now(),
        )
    }

    #[test]
    fn search_covers_number_and_product_names() {
        let inv = invoice();
        assert!(inv.matches_search("inv-2024"));
        assert!(inv.matches_search("KEYBOARD"));
        assert!(!inv.matches_search("mouse"));
    }

    #[test]
    fn schema_accepts_minimal_payload() {
        let payload = json!({"invoiceNumber": "INV-1", "amount": 0});
        assert!(create_schema().validate(&payload).is_ok());
        let new: NewInvoice = serde_json::from_value(payload).unwrap();
        assert!(new.product_list.is_empty());
    }

    #[test]
    fn schema_rejects_negative_or_fractional_amount() {
        for amount in [json!(-1), json!(1.5), json!("10")] {
            let err = create_schema()
                .validate(&json!({"invoiceNumber": "INV-1", "amount": amount}))
                .unwrap_err();
            assert!(err.has_field("amount"));
        }
    }

    #[test]
    fn schema_rejects_money_beyond_storage_range() {
        let err = create_schema()
            .validate(&json!({"invoiceNumber": "INV-1", "amount": u64::MAX}))
            .unwrap_err();
        assert!(err.has_field("amount"));

        let err = create_schema()
            .validate(&json!({
                "invoiceNumber": "INV-1",
                "amount": MAX_MONEY,
                "productList": [{"name": "Mouse", "quantity": 1, "price": MAX_MONEY + 1}]
            }))
            .unwrap_err();
        assert!(err.has_field("productList"));
        assert!(!err.has_field("amount"));
    }

    #[test]
    fn schema_rejects_malformed_product_lines() {
        let err = create_schema()
            .validate(&json!({
                "invoiceNumber": "INV-1",
                "amount": 10,
                "productList": [{"name": "Mouse", "quantity": "two", "price": 5}]
            }))
            .unwrap_err();
        assert!(err.has_field("productList"));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn any_well_formed_payload_validates_and_deserializes(
                number in "[A-Z]{3}-[0-9]{1,6}",
                amount in 0u64..10_000_000,
                names in proptest::collection::vec("[a-z]{1,10}", 0..5)
            ) {
                let lines: Vec<_> = names
                    .iter()
                    .map(|n| json!({"name": n, "quantity": 1, "price": 100}))
                    .collect();
                let payload = json!({"invoiceNumber": number, "amount": amount, "productList": lines});
                prop_assert!(create_schema().validate(&payload).is_ok());
                let new: NewInvoice = serde_json::from_value(payload).unwrap();
                prop_assert_eq!(new.product_list.len(), names.len());
            }
        }
    }
}
