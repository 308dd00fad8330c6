//! Typed statements issued by the gateway.
//!
//! Each variant corresponds to exactly one parameterized SQL statement.
//! The `PostgreSQL` store binds the variant's fields to [`Statement::sql`];
//! the in-memory store interprets the variant directly.

use customers_types::CustomerId;

/// One parameterized statement against the `customers` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Select the row with the given id.
    SelectById {
        /// Row to select.
        id: CustomerId,
    },
    /// Select every row.
    SelectAll,
    /// Select rows with `active = TRUE`.
    SelectActive,
    /// Set the active flag of a row and return the updated row.
    SetActive {
        /// Row to update.
        id: CustomerId,
        /// New flag value.
        active: bool,
    },
    /// Delete a row and return it as it was.
    DeleteById {
        /// Row to delete.
        id: CustomerId,
    },
    /// Insert a new row; the store assigns `id`, `active` and `created`.
    Insert {
        /// Display name.
        name: String,
        /// Phone number.
        phone: String,
    },
    /// Replace `name` and `phone` of an existing row.
    Update {
        /// Row to update.
        id: CustomerId,
        /// New display name.
        name: String,
        /// New phone number.
        phone: String,
    },
}

impl Statement {
    /// Short operation name used in log fields.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SelectById { .. } => "select_by_id",
            Self::SelectAll => "select_all",
            Self::SelectActive => "select_active",
            Self::SetActive { .. } => "set_active",
            Self::DeleteById { .. } => "delete_by_id",
            Self::Insert { .. } => "insert",
            Self::Update { .. } => "update",
        }
    }

    /// The `PostgreSQL` text of this statement.
    ///
    /// Bind order: `SelectById`/`DeleteById` take `$1 = id`; `SetActive`
    /// takes `$1 = id, $2 = active`; `Insert` takes `$1 = name, $2 = phone`;
    /// `Update` takes `$1 = name, $2 = phone, $3 = id`.
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::SelectById { .. } => {
                "SELECT id, name, phone, active, created FROM customers WHERE id = $1"
            }
            Self::SelectAll => "SELECT id, name, phone, active, created FROM customers",
            Self::SelectActive => {
                "SELECT id, name, phone, active, created FROM customers WHERE active = TRUE"
            }
            Self::SetActive { .. } => {
                "UPDATE customers SET active = $2 WHERE id = $1 \
                 RETURNING id, name, phone, active, created"
            }
            Self::DeleteById { .. } => {
                "DELETE FROM customers WHERE id = $1 \
                 RETURNING id, name, phone, active, created"
            }
            Self::Insert { .. } => {
                "INSERT INTO customers (name, phone) VALUES ($1, $2) \
                 RETURNING id, name, phone, active, created"
            }
            Self::Update { .. } => {
                "UPDATE customers SET name = $1, phone = $2 WHERE id = $3 \
                 RETURNING id, name, phone, active, created"
            }
        }
    }

    /// The id this statement is scoped to, if any.
    pub const fn target(&self) -> Option<CustomerId> {
        match self {
            Self::SelectById { id }
            | Self::SetActive { id, .. }
            | Self::DeleteById { id }
            | Self::Update { id, .. } => Some(*id),
            Self::SelectAll | Self::SelectActive | Self::Insert { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::CUSTOMER_COLUMNS;

    fn all_statements() -> Vec<Statement> {
        vec![
            Statement::SelectById { id: CustomerId(1) },
            Statement::SelectAll,
            Statement::SelectActive,
            Statement::SetActive {
                id: CustomerId(1),
                active: false,
            },
            Statement::DeleteById { id: CustomerId(1) },
            Statement::Insert {
                name: String::from("Ann"),
                phone: String::from("555"),
            },
            Statement::Update {
                id: CustomerId(1),
                name: String::from("Ann"),
                phone: String::from("555"),
            },
        ]
    }

    #[test]
    fn every_statement_names_the_customer_columns() {
        for statement in all_statements() {
            assert!(
                statement.sql().contains(CUSTOMER_COLUMNS),
                "{} does not select the customer columns",
                statement.name()
            );
        }
    }

    #[test]
    fn writes_return_the_row() {
        for statement in all_statements() {
            let sql = statement.sql();
            let is_write = !sql.starts_with("SELECT");
            assert_eq!(is_write, sql.contains("RETURNING"), "{}", statement.name());
        }
    }

    #[test]
    fn only_id_scoped_statements_have_a_target() {
        let targets: Vec<_> = all_statements().iter().map(Statement::target).collect();
        assert_eq!(
            targets,
            vec![
                Some(CustomerId(1)),
                None,
                None,
                Some(CustomerId(1)),
                Some(CustomerId(1)),
                None,
                Some(CustomerId(1)),
            ]
        );
    }
}
