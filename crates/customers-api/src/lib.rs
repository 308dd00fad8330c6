//! HTTP adapter for the customer records service.
//!
//! This crate provides an Axum router that exposes the persistence
//! gateway over a small RPC-style surface:
//!
//! - **Reads**: `GET /customers.getById`, `GET /customers.getAll`,
//!   `GET /customers.getAllActive`
//! - **Writes**: `POST /customers.blockById`, `POST /customers.unblockById`,
//!   `POST /customers.removeById`, `POST /customers.save`
//! - **Liveness**: `GET /health`
//!
//! # Architecture
//!
//! Each handler parses its query or form parameters, calls exactly one
//! [`CustomerGateway`](customers_db::CustomerGateway) operation and turns
//! the result into a JSON body or an [`ApiError`]. The adapter keeps no
//! state of its own beyond the shared gateway handle in [`AppState`].

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use state::AppState;
