//! Data structures shared by the registry, the minter and the API layer.

pub mod did;
pub mod token;
