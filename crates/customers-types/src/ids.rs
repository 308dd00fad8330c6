//! Integer identifier wrapper for customer rows.
//!
//! Customer ids are assigned by the store (`BIGSERIAL`) on insert and never
//! change afterwards. The wrapper keeps them from being mixed up with other
//! integers at compile time while serializing as a bare JSON number.

use serde::{Deserialize, Serialize};

/// Identifier of a customer row, as assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub i64);

impl CustomerId {
    /// Interpret a raw id coming from a request.
    ///
    /// `0` is the "not yet created" marker and yields `None`.
    pub const fn from_request(raw: i64) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    /// Return the inner `i64` value.
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
