//! Shared type definitions for the customer records service.
//!
//! This crate is the single source of truth for the record types that flow
//! between the persistence gateway and the HTTP adapter.
//!
//! # Modules
//!
//! - [`ids`] -- Store-assigned integer identifier for customers
//! - [`structs`] -- The [`Customer`] record and the [`SaveCustomer`] upsert input

pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use ids::CustomerId;
pub use structs::{Customer, SaveCustomer};
