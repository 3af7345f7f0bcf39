//! Error types for the checkout.

/// Input rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid email address: {0:?}")]
    InvalidEmail(String),

    #[error("Plan name cannot be empty")]
    EmptyPlan,

    #[error("Unknown plan: {0}")]
    UnknownPlan(String),

    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    #[error("Invalid transaction code: {0}")]
    InvalidTransactionCode(String),

    #[error("Invalid transaction code prefix: {0:?}")]
    InvalidCodePrefix(String),
}

/// Failure talking to the payment backend.
///
/// Adapter-specific errors are flattened into these variants so the port
/// stays free of HTTP client types.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend unreachable: {0}")]
    Transport(String),

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed backend response: {0}")]
    Decode(String),
}

/// Errors surfaced to whoever started the checkout.
///
/// Status-check failures are not here: they are retried on the next tick.
/// Timeouts and cancellation are outcomes, not errors.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Could not register transaction: {0}")]
    Registration(#[source] BackendError),
}
