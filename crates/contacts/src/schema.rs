//! Payload schemas for contact writes.
//!
//! - [`create`]: every field required and format-checked.
//! - [`full_update`]: `create` plus a required string `id`.
//! - [`partial_update`]: every field optional, `id` still required.

use std::sync::LazyLock;

use rolodex_core::validation::predicates::{digits, email, is_string, max_chars, non_blank};
use rolodex_core::{FieldRule, Schema};

pub const NAME_MAX_CHARS: usize = 255;

static CREATE: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new()
        .field(
            FieldRule::required("name")
                .check("name must be a string", is_string)
                .check("name must not be empty", non_blank)
                .check(
                    format!("name must not exceed {NAME_MAX_CHARS} characters"),
                    max_chars(NAME_MAX_CHARS),
                ),
        )
        .field(
            FieldRule::required("email")
                .check("email must be a string", is_string)
                .check("email format is invalid", email),
        )
        .field(
            FieldRule::required("mobileNumber")
                .check("mobileNumber must contain 10-13 digits", digits(10, 13)),
        )
});

fn id_rule() -> FieldRule {
    FieldRule::required("id").check("id must be a string", is_string)
}

static FULL_UPDATE: LazyLock<Schema> = LazyLock::new(|| CREATE.clone().extend(id_rule()));

static PARTIAL_UPDATE: LazyLock<Schema> =
    LazyLock::new(|| CREATE.clone().partial().extend(id_rule()));

pub fn create() -> &'static Schema {
    &CREATE
}

pub fn full_update() -> &'static Schema {
    &FULL_UPDATE
}

pub fn partial_update() -> &'static Schema {
    &PARTIAL_UPDATE
}
