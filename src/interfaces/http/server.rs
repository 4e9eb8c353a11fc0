use crate::domain::checkout::{CheckoutRequest, PreferenceResponse};
use crate::domain::input::{Amount, PayerEmail};
use crate::domain::ports::CheckoutGatewayRef;
use crate::error::{CheckoutError, GENERIC_FAILURE_MESSAGE, ValidationError};
use crate::infrastructure::relay::RELAY_PREFERENCES_PATH;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

pub struct RelayState {
    pub gateway: CheckoutGatewayRef,
}

pub fn router(state: Arc<RelayState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route(RELAY_PREFERENCES_PATH, post(create_preference))
        .with_state(state)
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn create_preference(
    State(state): State<Arc<RelayState>>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<PreferenceResponse>, RelayError> {
    check_request(&request)?;
    info!(
        external_reference = %request.external_reference,
        "relaying checkout preference"
    );
    let preference = state.gateway.create_preference(&request).await?;
    Ok(Json(preference))
}

/// Re-applies the form rules; the browser side is not trusted.
fn check_request(request: &CheckoutRequest) -> Result<(), ValidationError> {
    if request.items.is_empty() {
        return Err(ValidationError::InvalidAmount);
    }
    for item in &request.items {
        Amount::new(item.unit_price)?;
    }
    PayerEmail::new(request.payer.email.as_str())?;
    Ok(())
}

/// Error body in the provider's own shape, so relay clients decode it the same way.
#[derive(Debug, Serialize)]
pub struct RelayError {
    #[serde(skip)]
    status: StatusCode,
    message: String,
}

impl RelayError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for RelayError {
    fn from(err: ValidationError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err.to_string())
    }
}

impl From<CheckoutError> for RelayError {
    fn from(err: CheckoutError) -> Self {
        warn!(%err, "relayed preference failed");
        let status = match &err {
            CheckoutError::Provider { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            CheckoutError::Validation(_) => StatusCode::BAD_REQUEST,
            // Transport errors name the upstream URL; keep it off the wire.
            CheckoutError::Transport(_) => {
                return Self::new(StatusCode::BAD_GATEWAY, GENERIC_FAILURE_MESSAGE);
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.reason())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
