// src/wallet/key_management.rs
//! Cryptographic key management for off-chain signers.
//!
//! Produces signatures in exactly the form the minter verifies:
//! - secp256k1 curve (via `k256` crate)
//! - Keccak-256 message digest wrapped in the personal-message envelope
//! - 65-byte `r || s || v` encoding with `v` in {27, 28}

use crate::utils::crypto::{format_address, signing_digest};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use ethers::utils::hex;
use k256::ecdsa::SigningKey;
use thiserror::Error;

/// Failures while importing a key or producing a signature.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

/// Secp256k1 key holder able to authorize mints.
///
/// # Security Notes
/// - The secret key is only exported through [`KeyManager::private_key_hex`],
///   which exists for development tooling
/// - Signing is deterministic (RFC 6979)
#[derive(Clone)]
pub struct KeyManager {
    wallet: LocalWallet,
}

impl KeyManager {
    /// Generates a KeyManager with a fresh random key.
    pub fn new() -> Self {
        KeyManager {
            wallet: LocalWallet::new(&mut rand::thread_rng()),
        }
    }

    /// Imports a hex-encoded 32-byte private key (with or without 0x prefix).
    pub fn from_private_key(private_key: &str) -> Result<Self, KeyError> {
        let digits = private_key.strip_prefix("0x").unwrap_or(private_key);
        let bytes = hex::decode(digits).map_err(|e| KeyError::InvalidPrivateKey(e.to_string()))?;
        let signing_key =
            SigningKey::from_slice(&bytes).map_err(|e| KeyError::InvalidPrivateKey(e.to_string()))?;
        Ok(KeyManager {
            wallet: LocalWallet::from(signing_key),
        })
    }

    /// Address derived from the public key; this is what goes into a DID
    /// document's `public_key` field.
    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// Checksummed text form of [`KeyManager::address`].
    pub fn address_string(&self) -> String {
        format_address(&self.address())
    }

    /// Hex-encoded private key with 0x prefix.
    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.wallet.signer().to_bytes()))
    }

    /// Signs a message for minting.
    ///
    /// # Process Flow
    /// 1. Hashes message with Keccak-256
    /// 2. Wraps the hash in the personal-message envelope and hashes again
    /// 3. Signs the digest with recoverable ECDSA
    ///
    /// # Returns
    /// 65-byte signature (R || S || V)
    pub fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, KeyError> {
        let signature = self
            .wallet
            .sign_hash(signing_digest(message))
            .map_err(|e| KeyError::Signing(e.to_string()))?;
        Ok(signature.to_vec())
    }
}

impl Default for KeyManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known development key #0 of the hardhat/anvil test mnemonic.
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_import_known_key() {
        let keys = KeyManager::from_private_key(DEV_KEY).unwrap();
        assert_eq!(keys.address_string(), DEV_ADDRESS);
        assert_eq!(keys.private_key_hex(), DEV_KEY);
    }

    #[test]
    fn test_import_without_prefix() {
        let keys = KeyManager::from_private_key(&DEV_KEY[2..]).unwrap();
        assert_eq!(keys.address_string(), DEV_ADDRESS);
    }

    #[test]
    fn test_import_rejects_garbage() {
        assert!(KeyManager::from_private_key("not hex").is_err());
        assert!(KeyManager::from_private_key("0x1234").is_err());
        assert!(KeyManager::from_private_key(&format!("0x{}", "00".repeat(32))).is_err());
    }

    #[test]
    fn test_signatures_are_deterministic() {
        let keys = KeyManager::from_private_key(DEV_KEY).unwrap();
        let first = keys.sign_message(b"Hello, NFT!").unwrap();
        let second = keys.sign_message(b"Hello, NFT!").unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 65);
        assert!(first[64] == 27 || first[64] == 28);
    }

    #[test]
    fn test_fresh_keys_differ() {
        assert_ne!(KeyManager::new().address(), KeyManager::new().address());
    }
}
