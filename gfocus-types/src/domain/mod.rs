//! Domain models for the checkout.

pub mod payment_method;
pub mod plan;
pub mod transaction;

pub use payment_method::PaymentMethod;
pub use plan::{BillingCycle, Plan, PlanKey, Price};
pub use transaction::{RemoteStatus, Transaction, TransactionCode, TransactionStatus};
