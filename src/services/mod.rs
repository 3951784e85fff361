//! Business logic and API.

pub mod api_server;
pub mod identity_ledger;
pub mod verifier;
