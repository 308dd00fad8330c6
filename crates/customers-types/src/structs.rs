//! Customer record and upsert input.
//!
//! [`Customer`] mirrors one row of the `customers` table. `id` and
//! `created` are owned by the store: they are set once on insert and no
//! operation in the service changes them afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::CustomerId;

/// A customer record as persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Store-assigned identity.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Contact phone number, free-form.
    pub phone: String,
    /// Whether the customer shows up in the active-only listing.
    pub active: bool,
    /// Insertion timestamp, set by the store.
    pub created: DateTime<Utc>,
}

/// Input for the upsert operation.
///
/// With `id == None` a new row is inserted; otherwise the row with that id
/// has its `name` and `phone` replaced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaveCustomer {
    /// Target row, or `None` to create one.
    pub id: Option<CustomerId>,
    /// New display name.
    pub name: String,
    /// New phone number.
    pub phone: String,
}

impl SaveCustomer {
    /// Build an insert request.
    pub fn create(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            phone: phone.into(),
        }
    }

    /// Build an update request for an existing row.
    pub fn update(id: CustomerId, name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            phone: phone.into(),
        }
    }

    /// True when neither a name nor a phone was supplied.
    pub fn is_blank(&self) -> bool {
        self.name.is_empty() && self.phone.is_empty()
    }
}
