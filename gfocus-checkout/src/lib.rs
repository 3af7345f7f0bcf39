//! # GFocus Checkout
//!
//! The payment confirmation workflow: register a pending transaction with
//! the payment backend, then poll its status until it resolves, the caller
//! cancels, or the timeout passes.
//!
//! ## Layout
//!
//! - `workflow/` - The registration + polling state machine
//! - `cancel/` - Cancellation handle handed to the caller
//!
//! The workflow is generic over `B: PaymentBackend`, so the HTTP client and
//! test doubles plug in the same way.

pub mod cancel;
pub mod workflow;

#[cfg(test)]
mod workflow_tests;

pub use cancel::{CancelHandle, CancelToken, cancel_pair};
pub use workflow::{CheckoutOutcome, CheckoutReport, PaymentConfirmationWorkflow, PollPolicy};
