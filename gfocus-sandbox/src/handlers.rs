//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use gfocus_types::{CheckPaymentStatusRequest, ConfirmTransactionRequest};

use crate::store::{SandboxError, SandboxStore, SettleRequest};

/// Wrapper to implement IntoResponse for SandboxError (orphan rule workaround).
pub struct ApiError(pub SandboxError);

impl From<SandboxError> for ApiError {
    fn from(err: SandboxError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SandboxError::Invalid(_) => StatusCode::BAD_REQUEST,
            SandboxError::UnknownTransaction(_) => StatusCode::NOT_FOUND,
        };

        let body = serde_json::json!({
            "error": self.0.to_string(),
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Register a pending transaction.
#[tracing::instrument(skip(store, req), fields(note = %req.transaction_note, plan = %req.plan))]
pub async fn confirm_transaction(
    State(store): State<Arc<SandboxStore>>,
    Json(req): Json<ConfirmTransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    store.register(&req)?;
    Ok(Json(serde_json::json!({ "status": "pending" })))
}

/// Report the status of a registered transaction.
#[tracing::instrument(skip(store, req), fields(note = %req.transaction_note))]
pub async fn check_payment_status(
    State(store): State<Arc<SandboxStore>>,
    Json(req): Json<CheckPaymentStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let report = store.status(&req.transaction_note)?;
    Ok(Json(report))
}

/// Settle a pending transaction by hand.
#[tracing::instrument(skip(store, req), fields(note = %req.transaction_note, paid = req.paid_amount))]
pub async fn settle(
    State(store): State<Arc<SandboxStore>>,
    Json(req): Json<SettleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let report = store.settle(&req)?;
    Ok(Json(report))
}
