// src/models/token.rs
//! Minted asset record.

use ethers::types::Address;
use serde::{Deserialize, Serialize};

/// A token created by a successful, signature-authorized mint.
///
/// `content` is the exact message the authority signed and doubles as the
/// token URI.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    /// Sequential token id starting at 1
    pub token_id: u64,

    /// Recipient supplied with the mint request
    pub owner: Address,

    /// Signed message payload
    pub content: String,
}
