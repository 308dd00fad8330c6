//! Axum router construction for the customer API.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use customers_db::CustomerStore;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the customer API.
///
/// The router includes:
/// - `GET /customers.getById?id=N` -- single customer
/// - `GET /customers.getAll` -- every customer
/// - `GET /customers.getAllActive` -- active customers
/// - `POST /customers.blockById?id=N` -- deactivate
/// - `POST /customers.unblockById?id=N` -- activate
/// - `POST /customers.removeById?id=N` -- delete
/// - `POST /customers.save` -- create or update
/// - `GET /health` -- liveness
pub fn build_router<S: CustomerStore>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        // Reads
        .route("/customers.getById", get(handlers::get_by_id::<S>))
        .route("/customers.getAll", get(handlers::get_all::<S>))
        .route("/customers.getAllActive", get(handlers::get_all_active::<S>))
        // Writes
        .route("/customers.blockById", post(handlers::block_by_id::<S>))
        .route("/customers.unblockById", post(handlers::unblock_by_id::<S>))
        .route("/customers.removeById", post(handlers::remove_by_id::<S>))
        .route("/customers.save", post(handlers::save::<S>))
        // Liveness
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
