//! Wire bodies of the payment backend endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::RemoteStatus;

// ─────────────────────────────────────────────────────────────────────────────
// POST /confirm_transaction
// ─────────────────────────────────────────────────────────────────────────────

/// Registers a pending transaction before the payer completes payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmTransactionRequest {
    /// Client-generated transaction code
    pub transaction_note: String,
    pub email: String,
    /// Plan name as shown to the payer
    pub plan: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// POST /check_payment_status
// ─────────────────────────────────────────────────────────────────────────────

/// Asks for the current status of a registered transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckPaymentStatusRequest {
    pub transaction_note: String,
}

/// Status report for a registered transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentStatusResponse {
    pub status: RemoteStatus,
    /// Present when `status` is `success`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_key: Option<String>,
    /// Present when `status` is `failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<f64>,
    /// Present when `status` is `failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_amount: Option<f64>,
}

impl PaymentStatusResponse {
    pub fn pending() -> Self {
        Self {
            status: RemoteStatus::Pending,
            license_key: None,
            paid_amount: None,
            required_amount: None,
        }
    }

    pub fn success(license_key: impl Into<String>) -> Self {
        Self {
            status: RemoteStatus::Success,
            license_key: Some(license_key.into()),
            ..Self::pending()
        }
    }

    pub fn failed(paid_amount: f64, required_amount: f64) -> Self {
        Self {
            status: RemoteStatus::Failed,
            paid_amount: Some(paid_amount),
            required_amount: Some(required_amount),
            ..Self::pending()
        }
    }
}
