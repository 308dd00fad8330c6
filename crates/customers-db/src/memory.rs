//! In-memory implementation of [`CustomerStore`].
//!
//! Behaves like the `customers` table: ids come from a sequence starting at
//! 1, `active` defaults to true and `created` is stamped on insert. Rows are
//! kept as loosely typed column maps so tests can plant malformed rows, and
//! the store can be told to fail, fail part-way through a listing, or
//! stall, to exercise the gateway's error paths. Listing cursors are
//! counted so tests can check that every one is released.

use std::collections::BTreeMap;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use chrono::{DateTime, Utc};
use customers_types::CustomerId;
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use tokio::sync::RwLock;

use crate::error::DbError;
use crate::row::{CustomerRow, DecodeError};
use crate::statement::Statement;
use crate::store::CustomerStore;

/// A loosely typed column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// `int8`
    Int(i64),
    /// `text`
    Text(String),
    /// `boolean`
    Bool(bool),
    /// `timestamptz`
    Timestamp(DateTime<Utc>),
    /// SQL `NULL`
    Null,
}

impl Value {
    const fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int8",
            Self::Text(_) => "text",
            Self::Bool(_) => "boolean",
            Self::Timestamp(_) => "timestamptz",
            Self::Null => "NULL",
        }
    }
}

/// A row held by [`MemoryCustomerStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryRow {
    columns: BTreeMap<&'static str, Value>,
}

impl MemoryRow {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, builder style.
    #[must_use]
    pub fn with(mut self, column: &'static str, value: Value) -> Self {
        self.columns.insert(column, value);
        self
    }

    fn set(&mut self, column: &'static str, value: Value) {
        self.columns.insert(column, value);
    }

    fn is_active(&self) -> bool {
        matches!(self.columns.get("active"), Some(Value::Bool(true)))
    }

    fn value(&self, column: &'static str) -> Result<&Value, DecodeError> {
        self.columns
            .get(column)
            .ok_or(DecodeError::MissingColumn(column))
    }
}

fn mismatch(column: &'static str, expected: &'static str, found: &Value) -> DecodeError {
    DecodeError::InvalidValue {
        column,
        expected,
        reason: format!("found {}", found.type_name()),
    }
}

impl CustomerRow for MemoryRow {
    fn get_i64(&self, column: &'static str) -> Result<i64, DecodeError> {
        match self.value(column)? {
            Value::Int(v) => Ok(*v),
            other => Err(mismatch(column, "i64", other)),
        }
    }

    fn get_text(&self, column: &'static str) -> Result<String, DecodeError> {
        match self.value(column)? {
            Value::Text(v) => Ok(v.clone()),
            other => Err(mismatch(column, "text", other)),
        }
    }

    fn get_bool(&self, column: &'static str) -> Result<bool, DecodeError> {
        match self.value(column)? {
            Value::Bool(v) => Ok(*v),
            other => Err(mismatch(column, "bool", other)),
        }
    }

    fn get_timestamp(&self, column: &'static str) -> Result<DateTime<Utc>, DecodeError> {
        match self.value(column)? {
            Value::Timestamp(v) => Ok(*v),
            other => Err(mismatch(column, "timestamptz", other)),
        }
    }
}

#[derive(Debug)]
struct Table {
    rows: BTreeMap<i64, MemoryRow>,
    next_id: i64,
    latency: Option<Duration>,
    failure: Option<String>,
    fail_after: Option<usize>,
}

impl Table {
    fn allocate_id(&mut self) -> Result<i64, DbError> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| DbError::Unavailable(String::from("id sequence exhausted")))?;
        Ok(id)
    }

    fn execute(&mut self, statement: Statement) -> Result<Option<MemoryRow>, DbError> {
        match statement {
            Statement::SelectById { id } => Ok(self.rows.get(&id.into_inner()).cloned()),
            Statement::SetActive { id, active } => Ok(self.rows.get_mut(&id.into_inner()).map(
                |row| {
                    row.set("active", Value::Bool(active));
                    row.clone()
                },
            )),
            Statement::DeleteById { id } => Ok(self.rows.remove(&id.into_inner())),
            Statement::Insert { name, phone } => {
                let id = self.allocate_id()?;
                let row = MemoryRow::new()
                    .with("id", Value::Int(id))
                    .with("name", Value::Text(name))
                    .with("phone", Value::Text(phone))
                    .with("active", Value::Bool(true))
                    .with("created", Value::Timestamp(Utc::now()));
                self.rows.insert(id, row.clone());
                Ok(Some(row))
            }
            Statement::Update { id, name, phone } => {
                Ok(self.rows.get_mut(&id.into_inner()).map(|row| {
                    row.set("name", Value::Text(name));
                    row.set("phone", Value::Text(phone));
                    row.clone()
                }))
            }
            other @ (Statement::SelectAll | Statement::SelectActive) => Err(
                DbError::Unavailable(format!("{} returns many rows", other.name())),
            ),
        }
    }

    fn select(&self, statement: &Statement) -> Vec<MemoryRow> {
        let active_only = matches!(statement, Statement::SelectActive);
        self.rows
            .values()
            .filter(|row| !active_only || row.is_active())
            .cloned()
            .collect()
    }
}

#[derive(Debug, Default)]
struct CursorCounts {
    opened: AtomicUsize,
    open: AtomicUsize,
}

/// Held by a listing stream for as long as the stream is alive.
#[derive(Debug)]
struct CursorGuard(Arc<CursorCounts>);

impl CursorGuard {
    fn open(counts: &Arc<CursorCounts>) -> Self {
        counts.opened.fetch_add(1, Ordering::SeqCst);
        counts.open.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counts))
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.0.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A listing stream that releases its cursor when dropped.
struct Tracked<'a> {
    rows: BoxStream<'a, Result<MemoryRow, DbError>>,
    _cursor: CursorGuard,
}

impl Stream for Tracked<'_> {
    type Item = Result<MemoryRow, DbError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rows.poll_next_unpin(cx)
    }
}

/// In-memory customer table.
#[derive(Debug)]
pub struct MemoryCustomerStore {
    table: RwLock<Table>,
    cursors: Arc<CursorCounts>,
}

impl MemoryCustomerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
                latency: None,
                failure: None,
                fail_after: None,
            }),
            cursors: Arc::new(CursorCounts::default()),
        }
    }

    /// Plant a row as-is, bypassing the store's own defaults.
    ///
    /// The row is keyed by `id`; it does not need to decode cleanly.
    pub async fn insert_raw(&self, id: CustomerId, row: MemoryRow) {
        let mut table = self.table.write().await;
        let raw = id.into_inner();
        if raw >= table.next_id {
            table.next_id = raw.saturating_add(1);
        }
        table.rows.insert(raw, row);
    }

    /// Make every statement fail with the given message until cleared.
    pub async fn fail_with(&self, message: &str) {
        self.table.write().await.failure = Some(message.to_owned());
    }

    /// Make listings yield at most `rows` rows and then a store error, as a
    /// connection dropped mid-cursor would. Single-row statements are
    /// unaffected.
    pub async fn fail_after(&self, rows: usize) {
        self.table.write().await.fail_after = Some(rows);
    }

    /// Stop failing statements.
    pub async fn clear_failure(&self) {
        let mut table = self.table.write().await;
        table.failure = None;
        table.fail_after = None;
    }

    /// Delay every statement by `latency` before it touches the table.
    pub async fn set_latency(&self, latency: Duration) {
        self.table.write().await.latency = Some(latency);
    }

    /// Number of rows currently stored.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    /// True when no rows are stored.
    pub async fn is_empty(&self) -> bool {
        self.table.read().await.rows.is_empty()
    }

    /// Number of listing streams handed out so far.
    pub fn cursors_opened(&self) -> usize {
        self.cursors.opened.load(Ordering::SeqCst)
    }

    /// Number of listing streams not yet dropped.
    pub fn open_cursors(&self) -> usize {
        self.cursors.open.load(Ordering::SeqCst)
    }

    async fn preflight(&self) -> Result<(), DbError> {
        let (latency, failure) = {
            let table = self.table.read().await;
            (table.latency, table.failure.clone())
        };
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
        failure.map_or(Ok(()), |message| Err(DbError::Unavailable(message)))
    }

    async fn select(&self, statement: Statement) -> Vec<Result<MemoryRow, DbError>> {
        if let Err(e) = self.preflight().await {
            return vec![Err(e)];
        }
        let table = self.table.read().await;
        let rows = table.select(&statement).into_iter().map(Ok);
        let Some(limit) = table.fail_after else {
            return rows.collect();
        };
        rows.take(limit)
            .chain(std::iter::once(Err(DbError::Unavailable(String::from(
                "connection lost mid-cursor",
            )))))
            .collect()
    }
}

impl Default for MemoryCustomerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerStore for MemoryCustomerStore {
    type Row = MemoryRow;

    async fn fetch_optional(&self, statement: Statement) -> Result<Option<MemoryRow>, DbError> {
        self.preflight().await?;
        self.table.write().await.execute(statement)
    }

    fn fetch_many(&self, statement: Statement) -> BoxStream<'_, Result<MemoryRow, DbError>> {
        let cursor = CursorGuard::open(&self.cursors);
        let rows = stream::once(self.select(statement))
            .flat_map(stream::iter)
            .boxed();
        Tracked {
            rows,
            _cursor: cursor,
        }
        .boxed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures::TryStreamExt;

    use super::*;
    use crate::row::decode_customer;

    fn insert(name: &str) -> Statement {
        Statement::Insert {
            name: name.to_owned(),
            phone: String::from("555"),
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids_and_defaults() {
        let store = MemoryCustomerStore::new();
        let first = store.fetch_optional(insert("Ann")).await.unwrap().unwrap();
        let second = store.fetch_optional(insert("Bob")).await.unwrap().unwrap();

        let first = decode_customer(&first).unwrap();
        let second = decode_customer(&second).unwrap();
        assert_eq!(first.id, CustomerId(1));
        assert_eq!(second.id, CustomerId(2));
        assert!(first.active);
        assert!(second.created >= first.created);
    }

    #[tokio::test]
    async fn select_active_filters_on_flag() {
        let store = MemoryCustomerStore::new();
        store.fetch_optional(insert("Ann")).await.unwrap();
        store.fetch_optional(insert("Bob")).await.unwrap();
        store
            .fetch_optional(Statement::SetActive {
                id: CustomerId(1),
                active: false,
            })
            .await
            .unwrap();

        let rows: Vec<MemoryRow> = store
            .fetch_many(Statement::SelectActive)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.first().unwrap().get_text("name").unwrap(), "Bob");
    }

    #[tokio::test]
    async fn raw_rows_bump_the_sequence() {
        let store = MemoryCustomerStore::new();
        store
            .insert_raw(CustomerId(10), MemoryRow::new().with("id", Value::Int(10)))
            .await;
        let row = store.fetch_optional(insert("Ann")).await.unwrap().unwrap();
        assert_eq!(row.get_i64("id").unwrap(), 11);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn failure_applies_to_both_paths() {
        let store = MemoryCustomerStore::new();
        store.fail_with("connection refused").await;

        let one = store.fetch_optional(Statement::SelectAll).await;
        assert!(matches!(one, Err(DbError::Unavailable(_))));

        let many: Result<Vec<MemoryRow>, DbError> =
            store.fetch_many(Statement::SelectAll).try_collect().await;
        assert!(matches!(many, Err(DbError::Unavailable(_))));

        store.clear_failure().await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn fail_after_cuts_listing_short() {
        let store = MemoryCustomerStore::new();
        for name in ["Ann", "Bob", "Cid"] {
            store.fetch_optional(insert(name)).await.unwrap();
        }
        store.fail_after(2).await;

        let items: Vec<Result<MemoryRow, DbError>> =
            store.fetch_many(Statement::SelectAll).collect().await;
        assert_eq!(items.len(), 3);
        assert!(items.iter().take(2).all(Result::is_ok));
        assert!(matches!(items.last(), Some(Err(DbError::Unavailable(_)))));

        let one = store
            .fetch_optional(Statement::SelectById { id: CustomerId(3) })
            .await;
        assert!(one.unwrap().is_some());

        store.clear_failure().await;
        let rows: Vec<MemoryRow> = store
            .fetch_many(Statement::SelectAll)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn cursors_are_counted_until_dropped() {
        let store = MemoryCustomerStore::new();
        let first = store.fetch_many(Statement::SelectAll);
        let second = store.fetch_many(Statement::SelectActive);
        assert_eq!(store.cursors_opened(), 2);
        assert_eq!(store.open_cursors(), 2);

        drop(first);
        assert_eq!(store.open_cursors(), 1);
        drop(second);
        assert_eq!(store.open_cursors(), 0);
        assert_eq!(store.cursors_opened(), 2);
    }

    #[test]
    fn wrong_type_names_what_was_found() {
        let row = MemoryRow::new().with("active", Value::Text(String::from("yes")));
        let err = row.get_bool("active").unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidValue {
                column: "active",
                expected: "bool",
                reason: String::from("found text"),
            }
        );
    }
}
