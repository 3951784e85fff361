// src/error.rs
//! Error taxonomy shared by the DID registry and the signed NFT minter.
//!
//! Every failure rejects the whole operation before any state is written.
//! The `Display` text of each variant is the stable reason string callers
//! and tests assert on.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure signals surfaced by registry and minter operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The referenced DID document or token does not exist.
    #[error("Not found")]
    NotFound,

    /// The caller is not the owner of the record it tried to mutate.
    #[error("Not authorized")]
    NotAuthorized,

    /// `create_did` collided with a live document.
    #[error("DID already exists")]
    AlreadyExists,

    /// Recovered signer does not match the expected authority, or the
    /// signature is structurally malformed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The caller is the zero address, which marks absent records.
    #[error("Invalid caller")]
    InvalidCaller,

    /// The DID string is empty.
    #[error("Invalid DID")]
    InvalidDid,

    /// The public key is not a canonical address while the registry
    /// requires one.
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Mint recipient is the zero address.
    #[error("Mint to the zero address")]
    InvalidRecipient,

    /// The mint entry point does not match the configured authority.
    #[error("Mint authority mismatch")]
    AuthorityMismatch,

    /// Shared state could not be accessed (a writer panicked mid-operation).
    #[error("State unavailable")]
    StateUnavailable,
}

impl Error {
    /// Stable machine-readable code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound => "NOT_FOUND",
            Error::NotAuthorized => "NOT_AUTHORIZED",
            Error::AlreadyExists => "ALREADY_EXISTS",
            Error::InvalidSignature => "INVALID_SIGNATURE",
            Error::InvalidCaller => "INVALID_CALLER",
            Error::InvalidDid => "INVALID_DID",
            Error::InvalidPublicKey => "INVALID_PUBLIC_KEY",
            Error::InvalidRecipient => "INVALID_RECIPIENT",
            Error::AuthorityMismatch => "AUTHORITY_MISMATCH",
            Error::StateUnavailable => "STATE_UNAVAILABLE",
        }
    }

    /// Human-readable reason string, identical to the `Display` output.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings_are_stable() {
        assert_eq!(Error::NotAuthorized.reason(), "Not authorized");
        assert_eq!(Error::InvalidSignature.reason(), "Invalid signature");
        assert_eq!(Error::NotFound.reason(), "Not found");
        assert_eq!(Error::AlreadyExists.reason(), "DID already exists");
    }

    #[test]
    fn test_codes_are_distinct() {
        let all = [
            Error::NotFound,
            Error::NotAuthorized,
            Error::AlreadyExists,
            Error::InvalidSignature,
            Error::InvalidCaller,
            Error::InvalidDid,
            Error::InvalidPublicKey,
            Error::InvalidRecipient,
            Error::AuthorityMismatch,
            Error::StateUnavailable,
        ];
        let mut codes: Vec<_> = all.iter().map(Error::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }
}
