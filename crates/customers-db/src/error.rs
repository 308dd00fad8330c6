//! Error types for the data layer.
//!
//! [`DbError`] carries the full detail of a store failure and never leaves
//! this crate's logs. [`GatewayError`] is the coarse kind the gateway hands
//! to its callers.

/// Errors raised by a [`CustomerStore`](crate::store::CustomerStore).
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// The store could not serve the statement.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Outcome kinds reported by the [`CustomerGateway`](crate::gateway::CustomerGateway).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// No row matched the requested id.
    #[error("customer not found")]
    NotFound,

    /// Any other store failure (connectivity, constraint, malformed row).
    #[error("internal error")]
    Internal,

    /// The store did not answer within the statement timeout.
    #[error("statement timed out")]
    Timeout,
}
