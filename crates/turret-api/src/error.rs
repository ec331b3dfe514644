//! Error-to-response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use turret_core::{AccountId, Amount, TurretError};

/// Wire shape of every error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub message: String,
    /// Exact cost to pay, on payment-required responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<Amount>,
    /// Fee destination, on payment-required responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turret: Option<AccountId>,
}

/// A [`TurretError`] leaving through HTTP.
#[derive(Debug)]
pub struct ApiError {
    /// The underlying error.
    pub error: TurretError,
    /// Turret address attached to payment-required responses.
    pub turret: Option<AccountId>,
}

impl ApiError {
    /// Status code for each error kind.
    pub fn status(&self) -> StatusCode {
        match &self.error {
            TurretError::Validation { .. } => StatusCode::BAD_REQUEST,
            TurretError::Payment { .. } => StatusCode::PAYMENT_REQUIRED,
            TurretError::Forbidden { .. } => StatusCode::FORBIDDEN,
            TurretError::NotFound { .. } => StatusCode::NOT_FOUND,
            TurretError::Conflict { .. } => StatusCode::CONFLICT,
            TurretError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            TurretError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TurretError> for ApiError {
    fn from(error: TurretError) -> Self {
        Self {
            error,
            turret: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, cost) = match &self.error {
            TurretError::Payment { reason, cost } => (reason.clone(), *cost),
            other => (other.to_string(), None),
        };
        if status.is_server_error() {
            tracing::warn!(%status, %message, "request failed");
        }
        let turret = cost.and(self.turret);
        (status, Json(ErrorBody { message, cost, turret })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_the_taxonomy() {
        let cases = [
            (TurretError::validation("x"), StatusCode::BAD_REQUEST),
            (TurretError::payment("x"), StatusCode::PAYMENT_REQUIRED),
            (TurretError::forbidden("x"), StatusCode::FORBIDDEN),
            (TurretError::not_found("x"), StatusCode::NOT_FOUND),
            (TurretError::conflict("x"), StatusCode::CONFLICT),
            (TurretError::unavailable("x"), StatusCode::SERVICE_UNAVAILABLE),
            (TurretError::config("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status(), expected);
        }
    }

    #[test]
    fn payment_body_serializes_cost_and_turret() {
        let body = ErrorBody {
            message: "fee payment too low".into(),
            cost: Some(Amount::from_stroops(5_000_000)),
            turret: Some(AccountId::from_bytes([1; 32])),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["cost"], "0.5000000");
        assert!(json["turret"].is_string());

        let body = ErrorBody {
            message: "not found".into(),
            cost: None,
            turret: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("cost").is_none());
    }
}
