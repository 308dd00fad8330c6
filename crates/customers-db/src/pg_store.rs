//! `PostgreSQL` implementation of [`CustomerStore`].
//!
//! All queries are parameterized to prevent SQL injection; statement text
//! comes from [`Statement::sql`] and the variant's fields are bound in the
//! order documented there.

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};

use crate::error::DbError;
use crate::postgres::PostgresPool;
use crate::row::{CustomerRow, DecodeError};
use crate::statement::Statement;
use crate::store::CustomerStore;

/// Customer store backed by a shared [`PgPool`].
#[derive(Clone)]
pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    /// Create a store that runs its statements on the given pool.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool().clone(),
        }
    }
}

/// Bind a statement's parameters to its SQL text.
fn build(statement: Statement) -> Query<'static, Postgres, PgArguments> {
    let query = sqlx::query(statement.sql());
    match statement {
        Statement::SelectById { id } | Statement::DeleteById { id } => {
            query.bind(id.into_inner())
        }
        Statement::SelectAll | Statement::SelectActive => query,
        Statement::SetActive { id, active } => query.bind(id.into_inner()).bind(active),
        Statement::Insert { name, phone } => query.bind(name).bind(phone),
        Statement::Update { id, name, phone } => {
            query.bind(name).bind(phone).bind(id.into_inner())
        }
    }
}

impl CustomerStore for PgCustomerStore {
    type Row = PgRow;

    async fn fetch_optional(&self, statement: Statement) -> Result<Option<PgRow>, DbError> {
        let row = build(statement).fetch_optional(&self.pool).await?;
        Ok(row)
    }

    fn fetch_many(&self, statement: Statement) -> BoxStream<'_, Result<PgRow, DbError>> {
        build(statement)
            .fetch(&self.pool)
            .map_err(DbError::from)
            .boxed()
    }
}

/// Translate a `try_get` failure into a [`DecodeError`].
fn decode_error(column: &'static str, expected: &'static str, err: sqlx::Error) -> DecodeError {
    match err {
        sqlx::Error::ColumnNotFound(_) => DecodeError::MissingColumn(column),
        other => DecodeError::InvalidValue {
            column,
            expected,
            reason: other.to_string(),
        },
    }
}

impl CustomerRow for PgRow {
    fn get_i64(&self, column: &'static str) -> Result<i64, DecodeError> {
        self.try_get(column)
            .map_err(|e| decode_error(column, "i64", e))
    }

    fn get_text(&self, column: &'static str) -> Result<String, DecodeError> {
        self.try_get(column)
            .map_err(|e| decode_error(column, "text", e))
    }

    fn get_bool(&self, column: &'static str) -> Result<bool, DecodeError> {
        self.try_get(column)
            .map_err(|e| decode_error(column, "bool", e))
    }

    fn get_timestamp(&self, column: &'static str) -> Result<DateTime<Utc>, DecodeError> {
        self.try_get(column)
            .map_err(|e| decode_error(column, "timestamptz", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_maps_to_missing() {
        let err = decode_error("phone", "text", sqlx::Error::ColumnNotFound("phone".into()));
        assert_eq!(err, DecodeError::MissingColumn("phone"));
    }

    #[test]
    fn other_failures_keep_the_reason() {
        let err = decode_error("active", "bool", sqlx::Error::RowNotFound);
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
