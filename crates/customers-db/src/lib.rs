//! Persistence gateway for the customer records service.
//!
//! The gateway translates typed customer operations into single
//! parameterized statements against a relational store and maps the
//! outcome (row found / no row / store failure) into a small error
//! taxonomy. The store itself sits behind the [`CustomerStore`] trait so
//! the gateway contract can be exercised against an in-memory fake.
//!
//! # Architecture
//!
//! ```text
//! CustomerGateway<S: CustomerStore>
//!     |
//!     +-- Statement ----------> S::fetch_optional / S::fetch_many
//!     |                             |-- PgCustomerStore     (sqlx + PgPool)
//!     |                             +-- MemoryCustomerStore (tests)
//!     |
//!     +-- decode_customer <---- S::Row: CustomerRow
//! ```
//!
//! # Modules
//!
//! - [`gateway`] -- The typed operations and error mapping
//! - [`statement`] -- One variant per SQL statement the gateway issues
//! - [`row`] -- Store-independent field decoder for customer rows
//! - [`store`] -- The [`CustomerStore`] seam
//! - [`pg_store`] -- `PostgreSQL` implementation of the seam
//! - [`memory`] -- In-memory implementation of the seam
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`error`] -- Shared error types

pub mod error;
pub mod gateway;
pub mod memory;
pub mod pg_store;
pub mod postgres;
pub mod row;
pub mod statement;
pub mod store;

// Re-export primary types for convenience.
pub use error::{DbError, GatewayError};
pub use gateway::{CustomerGateway, GatewayConfig, ListingPolicy};
pub use memory::{MemoryCustomerStore, MemoryRow, Value};
pub use pg_store::PgCustomerStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use row::{decode_customer, CustomerRow, DecodeError};
pub use statement::Statement;
pub use store::CustomerStore;
