//! Shared application state for the HTTP adapter.

use customers_db::{CustomerGateway, CustomerStore};

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor. The gateway is the only thing handlers need; the connection
/// pool behind it is shared process-wide.
pub struct AppState<S> {
    /// The persistence gateway.
    pub gateway: CustomerGateway<S>,
}

impl<S: CustomerStore> AppState<S> {
    /// Create application state around a constructed gateway.
    pub const fn new(gateway: CustomerGateway<S>) -> Self {
        Self { gateway }
    }
}
