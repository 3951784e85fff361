// src/contracts/did_registry.rs
//! DID Registry state machine.
//!
//! Owns the mapping from DID string to [`DIDDocument`] and the reverse mapping
//! from sequential id to DID string. Supports create, update, delete and
//! lookup with strict ownership: only the account that created a DID may
//! mutate or delete it.
//!
//! Every mutation validates fully before writing, so a rejected call leaves
//! the registry untouched.

use crate::error::{Error, Result};
use crate::models::did::{DIDDocument, DIDMetadata};
use crate::utils::crypto::parse_address;
use ethers::types::Address;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// How `delete_did` reports a DID that has no live document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Existence is checked before ownership; a missing DID is `NotFound`.
    #[default]
    Explicit,
    /// Ownership is checked against the zero-valued record, so a missing DID
    /// is `NotAuthorized`.
    Legacy,
}

/// Which public keys `create_did` and `update_did` accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicKeyPolicy {
    /// Any string is stored verbatim.
    #[default]
    Opaque,
    /// Only `0x`-prefixed 20-byte hex addresses are accepted.
    Address,
}

/// Registry behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub delete_policy: DeletePolicy,
    #[serde(default)]
    pub public_key_policy: PublicKeyPolicy,
}

/// In-memory DID Registry.
///
/// # Invariants
/// - a DID string maps to at most one live document
/// - ids are assigned from one global counter starting at 1 and never reused
/// - the reverse mapping is written at creation only and is not cleared on
///   delete
#[derive(Debug, Default)]
pub struct DIDRegistry {
    config: RegistryConfig,
    did_documents: HashMap<String, DIDDocument>,
    id_to_did: HashMap<u64, String>,
    /// Last id handed out; `0` before the first creation.
    last_id: u64,
}

impl DIDRegistry {
    /// Creates an empty registry with default policies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the given policies.
    pub fn with_config(config: RegistryConfig) -> Self {
        DIDRegistry {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    /// Registers a new DID owned by `caller`.
    ///
    /// # Returns
    /// The newly assigned id.
    ///
    /// # Errors
    /// - `InvalidCaller` if `caller` is the zero address
    /// - `InvalidDid` if `did` is empty
    /// - `AlreadyExists` if `did` already has a live document
    /// - `InvalidPublicKey` if the key policy rejects `metadata.public_key`
    pub fn create_did(&mut self, caller: Address, did: &str, metadata: DIDMetadata) -> Result<u64> {
        check_caller(&caller)?;
        if did.is_empty() {
            return Err(Error::InvalidDid);
        }
        if self.did_documents.get(did).is_some_and(DIDDocument::is_live) {
            log::warn!("create_did rejected: {} already exists", did);
            return Err(Error::AlreadyExists);
        }
        self.check_public_key(&metadata.public_key)?;

        let id = self.last_id + 1;
        self.last_id = id;
        self.did_documents.insert(
            did.to_string(),
            DIDDocument {
                id,
                owner: caller,
                public_key: metadata.public_key,
                authentication: metadata.authentication,
                service_endpoint: metadata.service_endpoint,
            },
        );
        self.id_to_did.insert(id, did.to_string());

        log::info!("DID {} created with id {} by {:?}", did, id, caller);
        Ok(id)
    }

    /// Replaces the mutable fields of a live DID. `id` and `owner` are kept.
    ///
    /// # Errors
    /// - `InvalidCaller` if `caller` is the zero address
    /// - `NotFound` if `did` has no live document
    /// - `NotAuthorized` if `caller` is not the owner
    /// - `InvalidPublicKey` if the key policy rejects `metadata.public_key`
    pub fn update_did(&mut self, caller: Address, did: &str, metadata: DIDMetadata) -> Result<()> {
        check_caller(&caller)?;
        let document = match self.did_documents.get(did) {
            Some(document) if document.is_live() => document,
            _ => return Err(Error::NotFound),
        };
        if document.owner != caller {
            log::warn!("update_did rejected: {:?} does not own {}", caller, did);
            return Err(Error::NotAuthorized);
        }
        self.check_public_key(&metadata.public_key)?;

        if let Some(document) = self.did_documents.get_mut(did) {
            document.public_key = metadata.public_key;
            document.authentication = metadata.authentication;
            document.service_endpoint = metadata.service_endpoint;
        }
        log::info!("DID {} updated", did);
        Ok(())
    }

    /// Zeroes the document of a DID owned by `caller`.
    ///
    /// The id is not recycled and `get_did_by_id` keeps returning the DID
    /// string.
    ///
    /// # Errors
    /// - `InvalidCaller` if `caller` is the zero address
    /// - `NotAuthorized` if `caller` is not the owner
    /// - `NotFound` for a missing DID under [`DeletePolicy::Explicit`]
    pub fn delete_did(&mut self, caller: Address, did: &str) -> Result<()> {
        check_caller(&caller)?;
        let document = self.did_documents(did);
        if !document.is_live() && self.config.delete_policy == DeletePolicy::Explicit {
            return Err(Error::NotFound);
        }
        if document.owner != caller {
            log::warn!("delete_did rejected: {:?} does not own {}", caller, did);
            return Err(Error::NotAuthorized);
        }

        self.did_documents.remove(did);
        log::info!("DID {} deleted", did);
        Ok(())
    }

    /// DID string recorded for `id` at creation, or the empty string.
    pub fn get_did_by_id(&self, id: u64) -> String {
        self.id_to_did.get(&id).cloned().unwrap_or_default()
    }

    /// Document for the DID created with `id`.
    ///
    /// Returns the all-zero document when `id` was never issued or its DID
    /// has been deleted. A DID string re-created after deletion carries a new
    /// id, so the old id keeps resolving to the zero document.
    pub fn get_did_document_by_id(&self, id: u64) -> DIDDocument {
        match self.id_to_did.get(&id) {
            Some(did) => {
                let document = self.did_documents(did);
                if document.id == id {
                    document
                } else {
                    DIDDocument::default()
                }
            }
            None => DIDDocument::default(),
        }
    }

    /// Direct lookup by DID string; the all-zero document when absent.
    pub fn did_documents(&self, did: &str) -> DIDDocument {
        self.did_documents.get(did).cloned().unwrap_or_default()
    }

    /// Number of ids issued so far, including deleted DIDs.
    pub fn did_count(&self) -> u64 {
        self.last_id
    }

    fn check_public_key(&self, public_key: &str) -> Result<()> {
        match self.config.public_key_policy {
            PublicKeyPolicy::Opaque => Ok(()),
            PublicKeyPolicy::Address => parse_address(public_key)
                .map(|_| ())
                .ok_or(Error::InvalidPublicKey),
        }
    }
}

/// The zero address is what an absent record reports as its owner, so it can
/// never act as a caller.
fn check_caller(caller: &Address) -> Result<()> {
    if caller.is_zero() {
        return Err(Error::InvalidCaller);
    }
    Ok(())
}

/// Shared handle to a live registry.
///
/// All mutations go through the write lock, so they are applied one at a
/// time in a single total order; readers always see the latest commit.
#[derive(Debug, Clone, Default)]
pub struct RegistryHandle {
    inner: Arc<RwLock<DIDRegistry>>,
}

impl RegistryHandle {
    pub fn new(registry: DIDRegistry) -> Self {
        RegistryHandle {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, DIDRegistry>> {
        self.inner.read().map_err(|_| Error::StateUnavailable)
    }

    pub fn write(&self) -> Result<RwLockWriteGuard<'_, DIDRegistry>> {
        self.inner.write().map_err(|_| Error::StateUnavailable)
    }

    /// A read-only view of the same registry, for consumers that must not
    /// mutate it.
    pub fn reader(&self) -> RegistryReader {
        RegistryReader {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Read-only view of a shared registry.
#[derive(Debug, Clone)]
pub struct RegistryReader {
    inner: Arc<RwLock<DIDRegistry>>,
}

impl RegistryReader {
    pub fn read(&self) -> Result<RwLockReadGuard<'_, DIDRegistry>> {
        self.inner.read().map_err(|_| Error::StateUnavailable)
    }
}
