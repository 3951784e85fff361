// src/services/identity_ledger.rs
//! Identity Ledger Service
//!
//! Hosts the DID registry and the signed NFT minter behind one service object
//! and supplies what a chain would: a caller identity for each call and a
//! single serialized order of mutations.
//!
//! Lock order is always minter before registry, and registry operations never
//! take the minter lock, so mint authorization reads the registry as of the
//! latest committed DID mutation.

use crate::contracts::did_registry::{DIDRegistry, RegistryConfig, RegistryHandle};
use crate::contracts::signed_nft::{MintAuthority, SignedNFT};
use crate::error::{Error, Result};
use crate::models::did::{DIDDocument, DIDMetadata};
use ethers::types::Address;
use std::sync::{Arc, Mutex, MutexGuard};

/// How the ledger's minter authorizes mints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintMode {
    /// Signatures must come from this verifier address.
    Fixed(Address),
    /// Signatures must come from the key stored in a DID document.
    DidBound,
}

/// Shared service for DID lifecycle management and identity-gated minting.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct IdentityLedger {
    registry: RegistryHandle,
    minter: Arc<Mutex<SignedNFT>>,
}

impl IdentityLedger {
    /// Creates a ledger with an empty registry and an empty collection.
    pub fn new(registry_config: RegistryConfig, mode: MintMode) -> Self {
        let registry = RegistryHandle::new(DIDRegistry::with_config(registry_config));
        let authority = match mode {
            MintMode::Fixed(verifier) => MintAuthority::Fixed(verifier),
            MintMode::DidBound => MintAuthority::DidBound(registry.reader()),
        };
        log::debug!("ledger created with {:?} mint authority", mode);
        IdentityLedger {
            registry,
            minter: Arc::new(Mutex::new(SignedNFT::new(authority))),
        }
    }

    fn minter(&self) -> Result<MutexGuard<'_, SignedNFT>> {
        self.minter.lock().map_err(|_| Error::StateUnavailable)
    }

    // =====================
    // DID Registry
    // =====================

    pub fn create_did(&self, caller: Address, did: &str, metadata: DIDMetadata) -> Result<u64> {
        self.registry.write()?.create_did(caller, did, metadata)
    }

    pub fn update_did(&self, caller: Address, did: &str, metadata: DIDMetadata) -> Result<()> {
        self.registry.write()?.update_did(caller, did, metadata)
    }

    pub fn delete_did(&self, caller: Address, did: &str) -> Result<()> {
        self.registry.write()?.delete_did(caller, did)
    }

    pub fn did_documents(&self, did: &str) -> Result<DIDDocument> {
        Ok(self.registry.read()?.did_documents(did))
    }

    pub fn get_did_by_id(&self, id: u64) -> Result<String> {
        Ok(self.registry.read()?.get_did_by_id(id))
    }

    pub fn get_did_document_by_id(&self, id: u64) -> Result<DIDDocument> {
        Ok(self.registry.read()?.get_did_document_by_id(id))
    }

    // =====================
    // Minter
    // =====================

    /// Mints through whichever entry point matches the configured authority:
    /// `did_id` must be given for a DID-bound minter and omitted otherwise.
    pub fn mint_nft(
        &self,
        did_id: Option<u64>,
        message: &str,
        signature: &[u8],
        to: Address,
    ) -> Result<u64> {
        let mut minter = self.minter()?;
        match did_id {
            Some(did_id) => minter.mint_nft_with_did(did_id, message, signature, to),
            None => minter.mint_nft(message, signature, to),
        }
    }

    pub fn token_uri(&self, token_id: u64) -> Result<String> {
        self.minter()?.token_uri(token_id)
    }

    pub fn owner_of(&self, token_id: u64) -> Result<Address> {
        self.minter()?.owner_of(token_id)
    }

    pub fn total_supply(&self) -> Result<u64> {
        Ok(self.minter()?.total_supply())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::did_registry::PublicKeyPolicy;
    use crate::wallet::key_management::KeyManager;
    use std::thread;
    use tokio_test::{assert_err, assert_ok};

    fn did_ledger() -> IdentityLedger {
        IdentityLedger::new(
            RegistryConfig {
                public_key_policy: PublicKeyPolicy::Address,
                ..RegistryConfig::default()
            },
            MintMode::DidBound,
        )
    }

    #[test]
    fn test_hello_nft_scenario() {
        let ledger = did_ledger();
        let signer = KeyManager::new();
        let creator = Address::repeat_byte(0x01);
        let user = Address::repeat_byte(0x02);

        let id = ledger
            .create_did(
                creator,
                "did:example:123",
                DIDMetadata::new(signer.address_string(), "authentication", "serviceEndpoint"),
            )
            .unwrap();
        assert_eq!(id, 1);

        let signature = signer.sign_message(b"Hello, NFT!").unwrap();
        let token_id = ledger
            .mint_nft(Some(1), "Hello, NFT!", &signature, user)
            .unwrap();

        assert_eq!(token_id, 1);
        assert_eq!(ledger.token_uri(1).unwrap(), "Hello, NFT!");
        assert_eq!(ledger.owner_of(1).unwrap(), user);
        assert_eq!(ledger.get_did_by_id(1).unwrap(), "did:example:123");

        let junk = [0x12u8; 65];
        assert_eq!(
            ledger.mint_nft(Some(1), "Hello, NFT!", &junk, user),
            Err(Error::InvalidSignature)
        );
        assert_eq!(ledger.total_supply().unwrap(), 1);
    }

    #[test]
    fn test_fixed_mode_ignores_registry() {
        let verifier = KeyManager::new();
        let ledger = IdentityLedger::new(RegistryConfig::default(), MintMode::Fixed(verifier.address()));
        let signature = verifier.sign_message(b"payload").unwrap();

        assert_err!(ledger.create_did(Address::repeat_byte(0x01), "", DIDMetadata::default()));
        assert_ok!(ledger.create_did(
            Address::repeat_byte(0x01),
            "did:example:opaque",
            DIDMetadata::new("publicKeyExample", "auth", "endpoint"),
        ));
        assert_eq!(
            ledger.mint_nft(Some(1), "payload", &signature, Address::repeat_byte(0x02)),
            Err(Error::AuthorityMismatch)
        );
        assert_eq!(
            ledger.mint_nft(None, "payload", &signature, Address::repeat_byte(0x02)),
            Ok(1)
        );
    }

    #[test]
    fn test_concurrent_creates_get_unique_ids() {
        let ledger = did_ledger();
        let key = KeyManager::new().address_string();

        let workers: Vec<_> = (0..8u8)
            .map(|i| {
                let ledger = ledger.clone();
                let key = key.clone();
                thread::spawn(move || {
                    ledger
                        .create_did(
                            Address::repeat_byte(i + 1),
                            &format!("did:example:{}", i),
                            DIDMetadata::new(key, "auth", "endpoint"),
                        )
                        .unwrap()
                })
            })
            .collect();

        let mut ids: Vec<u64> = workers.into_iter().map(|w| w.join().unwrap()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=8).collect::<Vec<u64>>());
        for id in 1..=8u64 {
            let did = ledger.get_did_by_id(id).unwrap();
            assert_eq!(ledger.did_documents(&did).unwrap().id, id);
        }
    }
}
