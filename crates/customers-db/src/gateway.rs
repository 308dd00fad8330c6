//! Typed customer operations over a [`CustomerStore`].
//!
//! Every operation issues exactly one [`Statement`] and classifies the
//! outcome:
//!
//! | Store outcome | Result |
//! |---------------|--------|
//! | one row, decodes | `Ok(Customer)` |
//! | no row | [`GatewayError::NotFound`] |
//! | store error or undecodable row | [`GatewayError::Internal`] |
//! | no answer within the statement timeout | [`GatewayError::Timeout`] |
//!
//! Store error detail is logged here and never handed to the caller.
//! Listings apply the configured [`ListingPolicy`] to rows that fail to
//! decode.

use std::sync::Arc;
use std::time::Duration;

use customers_types::{Customer, CustomerId, SaveCustomer};
use futures::StreamExt;
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::error::GatewayError;
use crate::row::decode_customer;
use crate::statement::Statement;
use crate::store::CustomerStore;

/// Default upper bound on a single statement, in milliseconds.
const DEFAULT_STATEMENT_TIMEOUT_MS: u64 = 5_000;

/// What a listing does with a row that fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingPolicy {
    /// Log the row at `warn` and leave it out of the result.
    #[default]
    SkipMalformed,
    /// Fail the whole listing with [`GatewayError::Internal`].
    FailFast,
}

/// Tuning knobs for [`CustomerGateway`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Upper bound on one statement, including row iteration for listings.
    pub statement_timeout: Duration,
    /// Treatment of undecodable rows in listings.
    pub listing_policy: ListingPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            statement_timeout: Duration::from_millis(DEFAULT_STATEMENT_TIMEOUT_MS),
            listing_policy: ListingPolicy::default(),
        }
    }
}

/// The persistence gateway.
///
/// Holds no per-request state; clones share the same store handle and may
/// be used from any number of concurrent requests.
pub struct CustomerGateway<S> {
    store: Arc<S>,
    config: GatewayConfig,
}

impl<S> Clone for CustomerGateway<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config,
        }
    }
}

impl<S: CustomerStore> CustomerGateway<S> {
    /// Create a gateway owning `store`.
    pub fn new(store: S, config: GatewayConfig) -> Self {
        Self::from_arc(Arc::new(store), config)
    }

    /// Create a gateway over a store handle shared with other owners.
    pub const fn from_arc(store: Arc<S>, config: GatewayConfig) -> Self {
        Self { store, config }
    }

    /// Fetch the customer with the given id.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFound`] if no row has this id.
    pub async fn by_id(&self, id: CustomerId) -> Result<Customer, GatewayError> {
        self.fetch_one(Statement::SelectById { id }).await
    }

    /// Fetch every customer, in store order.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Internal`] on store failure (or a malformed row under
    /// [`ListingPolicy::FailFast`]).
    pub async fn all(&self) -> Result<Vec<Customer>, GatewayError> {
        self.fetch_list(Statement::SelectAll).await
    }

    /// Fetch every customer whose active flag is set.
    ///
    /// # Errors
    ///
    /// Same as [`CustomerGateway::all`].
    pub async fn all_active(&self) -> Result<Vec<Customer>, GatewayError> {
        self.fetch_list(Statement::SelectActive).await
    }

    /// Set the active flag of a customer and return the updated record.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFound`] if no row has this id.
    pub async fn set_active(&self, id: CustomerId, active: bool) -> Result<Customer, GatewayError> {
        let customer = self.fetch_one(Statement::SetActive { id, active }).await?;
        debug!(%id, active, "Customer active flag set");
        Ok(customer)
    }

    /// Delete a customer and return the record as it was before deletion.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFound`] if no row has this id.
    pub async fn delete(&self, id: CustomerId) -> Result<Customer, GatewayError> {
        let customer = self.fetch_one(Statement::DeleteById { id }).await?;
        debug!(%id, "Customer deleted");
        Ok(customer)
    }

    /// Insert a new customer or update an existing one's name and phone.
    ///
    /// Without an id a row is inserted and the store fills in `id`,
    /// `active` and `created`. With an id only `name` and `phone` change.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFound`] if an id was given and no row has it.
    pub async fn save(&self, customer: SaveCustomer) -> Result<Customer, GatewayError> {
        let SaveCustomer { id, name, phone } = customer;
        let Some(id) = id else {
            // An insert always returns its row; an empty result is a store fault.
            let saved = match self.fetch_one(Statement::Insert { name, phone }).await {
                Err(GatewayError::NotFound) => Err(GatewayError::Internal),
                other => other,
            }?;
            debug!(id = %saved.id, "Customer created");
            return Ok(saved);
        };

        let saved = self.fetch_one(Statement::Update { id, name, phone }).await?;
        debug!(%id, "Customer updated");
        Ok(saved)
    }

    async fn fetch_one(&self, statement: Statement) -> Result<Customer, GatewayError> {
        let op = statement.name();
        let target = statement.target();
        let outcome =
            tokio::time::timeout(self.config.statement_timeout, self.store.fetch_optional(statement))
                .await;

        match outcome {
            Err(elapsed) => {
                warn!(op, id = ?target, %elapsed, "Customer statement timed out");
                Err(GatewayError::Timeout)
            }
            Ok(Err(e)) => {
                error!(op, id = ?target, error = %e, "Customer statement failed");
                Err(GatewayError::Internal)
            }
            Ok(Ok(None)) => Err(GatewayError::NotFound),
            Ok(Ok(Some(row))) => decode_customer(&row).map_err(|e| {
                error!(op, id = ?target, error = %e, "Customer row could not be decoded");
                GatewayError::Internal
            }),
        }
    }

    async fn fetch_list(&self, statement: Statement) -> Result<Vec<Customer>, GatewayError> {
        let op = statement.name();
        match tokio::time::timeout(self.config.statement_timeout, self.collect(statement)).await {
            Ok(result) => result,
            Err(elapsed) => {
                warn!(op, %elapsed, "Customer listing timed out");
                Err(GatewayError::Timeout)
            }
        }
    }

    /// Drain the row stream. The stream, and with it the store cursor, is
    /// dropped on every return path.
    async fn collect(&self, statement: Statement) -> Result<Vec<Customer>, GatewayError> {
        let op = statement.name();
        let mut rows = self.store.fetch_many(statement);
        let mut customers = Vec::new();
        let mut skipped: usize = 0;

        while let Some(next) = rows.next().await {
            let row = next.map_err(|e| {
                error!(op, error = %e, "Customer listing failed");
                GatewayError::Internal
            })?;

            match decode_customer(&row) {
                Ok(customer) => customers.push(customer),
                Err(e) => match self.config.listing_policy {
                    ListingPolicy::SkipMalformed => {
                        warn!(op, error = %e, "Skipping malformed customer row");
                        skipped = skipped.saturating_add(1);
                    }
                    ListingPolicy::FailFast => {
                        error!(op, error = %e, "Malformed customer row in listing");
                        return Err(GatewayError::Internal);
                    }
                },
            }
        }

        debug!(op, count = customers.len(), skipped, "Customer listing complete");
        Ok(customers)
    }
}
