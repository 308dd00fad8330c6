//! Error types for the HTTP adapter.
//!
//! [`ApiError`] unifies the adapter's own input failures with the
//! gateway's outcome kinds and converts into an Axum response whose body is
//! the plain-text status phrase. No error detail reaches the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use customers_db::GatewayError;

/// Errors that can occur while serving a customer request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A query or form parameter was missing or malformed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The gateway reported a failure.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl ApiError {
    /// The HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Gateway(GatewayError::NotFound) => StatusCode::NOT_FOUND,
            Self::Gateway(GatewayError::Internal | GatewayError::Timeout) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let phrase = status.canonical_reason().unwrap_or("Error");
        (status, phrase).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(
            ApiError::BadRequest(String::from("id")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(GatewayError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(GatewayError::Internal).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(GatewayError::Timeout).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
