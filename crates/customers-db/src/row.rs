//! Store-independent decoding of customer rows.
//!
//! Every store row type exposes typed getters by column name through
//! [`CustomerRow`]; [`decode_customer`] is written once against that trait
//! and shared by the `PostgreSQL` and in-memory stores.

use chrono::{DateTime, Utc};
use customers_types::{Customer, CustomerId};

/// Column list selected and returned by every statement, in table order.
pub const CUSTOMER_COLUMNS: &str = "id, name, phone, active, created";

/// A single field could not be read from a row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The row has no column with this name.
    #[error("column `{0}` missing from row")]
    MissingColumn(&'static str),

    /// The column exists but does not hold a value of the expected type.
    #[error("column `{column}` is not a valid {expected}: {reason}")]
    InvalidValue {
        /// Column name.
        column: &'static str,
        /// The Rust-side type the decoder asked for.
        expected: &'static str,
        /// What the store reported.
        reason: String,
    },
}

/// Typed field access on a store row.
pub trait CustomerRow {
    /// Read an `int8` column.
    fn get_i64(&self, column: &'static str) -> Result<i64, DecodeError>;

    /// Read a `text` column.
    fn get_text(&self, column: &'static str) -> Result<String, DecodeError>;

    /// Read a `boolean` column.
    fn get_bool(&self, column: &'static str) -> Result<bool, DecodeError>;

    /// Read a `timestamptz` column.
    fn get_timestamp(&self, column: &'static str) -> Result<DateTime<Utc>, DecodeError>;
}

/// Decode a [`Customer`] from any row exposing the customer columns.
///
/// # Errors
///
/// Returns the first [`DecodeError`] hit while reading the five columns.
pub fn decode_customer<R: CustomerRow + ?Sized>(row: &R) -> Result<Customer, DecodeError> {
    Ok(Customer {
        id: CustomerId(row.get_i64("id")?),
        name: row.get_text("name")?,
        phone: row.get_text("phone")?,
        active: row.get_bool("active")?,
        created: row.get_timestamp("created")?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    /// Row backed by string-encoded values, to exercise the decoder without
    /// any store.
    struct TextRow(BTreeMap<&'static str, &'static str>);

    impl TextRow {
        fn get(&self, column: &'static str) -> Result<&'static str, DecodeError> {
            self.0
                .get(column)
                .copied()
                .ok_or(DecodeError::MissingColumn(column))
        }

        fn invalid(column: &'static str, expected: &'static str, reason: String) -> DecodeError {
            DecodeError::InvalidValue {
                column,
                expected,
                reason,
            }
        }
    }

    impl CustomerRow for TextRow {
        fn get_i64(&self, column: &'static str) -> Result<i64, DecodeError> {
            self.get(column)?
                .parse()
                .map_err(|e: std::num::ParseIntError| Self::invalid(column, "i64", e.to_string()))
        }

        fn get_text(&self, column: &'static str) -> Result<String, DecodeError> {
            self.get(column).map(str::to_owned)
        }

        fn get_bool(&self, column: &'static str) -> Result<bool, DecodeError> {
            self.get(column)?
                .parse()
                .map_err(|e: std::str::ParseBoolError| Self::invalid(column, "bool", e.to_string()))
        }

        fn get_timestamp(&self, column: &'static str) -> Result<DateTime<Utc>, DecodeError> {
            self.get(column)?
                .parse()
                .map_err(|e: chrono::ParseError| Self::invalid(column, "timestamp", e.to_string()))
        }
    }

    fn full_row() -> BTreeMap<&'static str, &'static str> {
        BTreeMap::from([
            ("id", "7"),
            ("name", "Ann"),
            ("phone", "555"),
            ("active", "true"),
            ("created", "2024-03-01T12:00:00Z"),
        ])
    }

    #[test]
    fn decodes_all_columns() {
        let customer = decode_customer(&TextRow(full_row())).unwrap();
        assert_eq!(customer.id, CustomerId(7));
        assert_eq!(customer.name, "Ann");
        assert_eq!(customer.phone, "555");
        assert!(customer.active);
        assert_eq!(customer.created.to_rfc3339(), "2024-03-01T12:00:00+00:00");
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let mut fields = full_row();
        fields.remove("phone");
        let err = decode_customer(&TextRow(fields)).unwrap_err();
        assert_eq!(err, DecodeError::MissingColumn("phone"));
    }

    #[test]
    fn wrong_type_is_reported() {
        let mut fields = full_row();
        fields.insert("active", "maybe");
        let err = decode_customer(&TextRow(fields)).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidValue {
                column: "active",
                expected: "bool",
                ..
            }
        ));
    }
}
