// src/models/did.rs
//! Decentralized Identifier (DID) data model implementation.
//!
//! A DID document here is the flat registry record: a sequential id, the
//! owning account and three opaque metadata strings. The all-zero value
//! doubles as the "does not exist" answer for lookups.

use ethers::types::Address;
use serde::{Deserialize, Serialize};

/// A DID Document representing a decentralized identity.
///
/// # Fields
/// - `id`: Sequential registry id, `0` when the document does not exist
/// - `owner`: Account that created the record, zero address when absent
/// - `public_key`: Key material, compared as an address by the minter
/// - `authentication`: Method-specific authentication descriptor
/// - `service_endpoint`: URI for interacting with the DID subject
///
/// # DID Format
/// The DID string that keys the document usually follows DID syntax:
/// ```text
/// did:<method>:<method-specific-id>
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DIDDocument {
    /// Sequential registry id starting at 1
    pub id: u64,

    /// Creator and sole mutator of the record
    pub owner: Address,

    /// Example: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
    pub public_key: String,

    /// Example: "secp256k1-personal-sign"
    pub authentication: String,

    /// Example: "https://example.com/did-ops"
    pub service_endpoint: String,
}

impl DIDDocument {
    /// Returns true when the document refers to a created, undeleted DID.
    pub fn is_live(&self) -> bool {
        self.id != 0
    }
}

/// The three fields an owner may replace with `update_did`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DIDMetadata {
    pub public_key: String,
    pub authentication: String,
    pub service_endpoint: String,
}

impl DIDMetadata {
    pub fn new(
        public_key: impl Into<String>,
        authentication: impl Into<String>,
        service_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            authentication: authentication.into(),
            service_endpoint: service_endpoint.into(),
        }
    }
}
