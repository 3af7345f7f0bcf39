//! # GFocus Sandbox
//!
//! A local stand-in for the payment backend, for development and tests.
//! It serves the same two endpoints as the real service from an in-memory
//! store and adds a hook to settle payments by hand.
//!
//! - `store/` - Registered transactions and settlement rules
//! - `handlers/` - Axum handlers
//! - `server/` - Router and listener

pub mod handlers;
pub mod server;
pub mod store;

pub use server::SandboxServer;
pub use store::{SandboxError, SandboxStore, SettleRequest};
