//! # GFocus Types
//!
//! Domain types and the backend port for the GFocus checkout.
//! This crate has ZERO IO dependencies - only data structures,
//! validation rules, and trait definitions.
//!
//! ## Layout
//!
//! - `domain/` - Transaction codes, transactions, plan catalog, payment methods
//! - `ports/` - The `PaymentBackend` trait that HTTP and test adapters implement
//! - `dto/` - Wire bodies of the two backend endpoints
//! - `error/` - Validation, backend and checkout error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    BillingCycle, PaymentMethod, Plan, PlanKey, Price, RemoteStatus, Transaction,
    TransactionCode, TransactionStatus,
};
pub use dto::*;
pub use error::{BackendError, CheckoutError, ValidationError};
pub use ports::PaymentBackend;
