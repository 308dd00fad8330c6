//! The seam between the gateway and a concrete relational store.

use std::future::Future;

use futures::stream::BoxStream;

use crate::error::DbError;
use crate::row::CustomerRow;
use crate::statement::Statement;

/// Executes [`Statement`]s and hands back raw rows.
///
/// Implementations do no decoding and no error classification beyond
/// "no row" (`Ok(None)`) versus "store failure" (`Err`); both are the
/// gateway's job.
pub trait CustomerStore: Send + Sync + 'static {
    /// Row type produced by this store.
    type Row: CustomerRow + Send;

    /// Run a statement expected to touch at most one row.
    fn fetch_optional(
        &self,
        statement: Statement,
    ) -> impl Future<Output = Result<Option<Self::Row>, DbError>> + Send;

    /// Run a statement yielding any number of rows.
    ///
    /// The underlying cursor is released when the returned stream is
    /// dropped, whether or not it was fully consumed.
    fn fetch_many(&self, statement: Statement) -> BoxStream<'_, Result<Self::Row, DbError>>;
}
