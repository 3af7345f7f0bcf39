//! Payment backend port.
//!
//! Implementations can be HTTP clients, scripted mocks, etc.

use crate::domain::TransactionCode;
use crate::dto::{ConfirmTransactionRequest, PaymentStatusResponse};
use crate::error::BackendError;

/// The two calls the checkout makes against the payment backend.
#[async_trait::async_trait]
pub trait PaymentBackend: Send + Sync {
    /// Records a pending transaction. Any 2xx counts as accepted.
    async fn register_transaction(
        &self,
        req: &ConfirmTransactionRequest,
    ) -> Result<(), BackendError>;

    /// Fetches the current status of a registered transaction.
    async fn check_payment_status(
        &self,
        code: &TransactionCode,
    ) -> Result<PaymentStatusResponse, BackendError>;
}

#[async_trait::async_trait]
impl<B: PaymentBackend + ?Sized> PaymentBackend for std::sync::Arc<B> {
    async fn register_transaction(
        &self,
        req: &ConfirmTransactionRequest,
    ) -> Result<(), BackendError> {
        (**self).register_transaction(req).await
    }

    async fn check_payment_status(
        &self,
        code: &TransactionCode,
    ) -> Result<PaymentStatusResponse, BackendError> {
        (**self).check_payment_status(code).await
    }
}
