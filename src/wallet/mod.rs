//! Off-chain signing keys.

pub mod key_management;
