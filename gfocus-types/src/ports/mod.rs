//! Port traits (interfaces for adapters).
//!
//! The checkout workflow depends on these traits, not on an HTTP client.

mod backend;

pub use backend::PaymentBackend;
