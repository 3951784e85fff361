// src/contracts/signed_nft.rs
//! Identity-gated NFT minter.
//!
//! A mint succeeds only when the supplied signature over the message was
//! produced by the configured authority: either a fixed verifier address or
//! the address stored as `public_key` in a DID document. The caller of the
//! mint is irrelevant; the token goes to the `to` address of the request.

use crate::contracts::did_registry::RegistryReader;
use crate::error::{Error, Result};
use crate::models::token::AssetRecord;
use crate::services::verifier::verify_signer;
use crate::utils::crypto::parse_address;
use ethers::types::Address;
use std::collections::BTreeMap;

/// Who must have signed a mint request. Chosen at construction.
#[derive(Debug, Clone)]
pub enum MintAuthority {
    /// A single verifier address fixed at deployment.
    Fixed(Address),
    /// The `public_key` of a DID document looked up by id in a registry.
    DidBound(RegistryReader),
}

/// Signature-gated NFT collection.
///
/// # Invariants
/// - token ids are assigned sequentially from 1 and never overwritten
/// - the counter advances only when a mint commits
#[derive(Debug)]
pub struct SignedNFT {
    authority: MintAuthority,
    tokens: BTreeMap<u64, AssetRecord>,
    last_token_id: u64,
}

impl SignedNFT {
    pub fn new(authority: MintAuthority) -> Self {
        SignedNFT {
            authority,
            tokens: BTreeMap::new(),
            last_token_id: 0,
        }
    }

    /// Minter authorized by a fixed verifier address.
    pub fn with_verifier(verifier: Address) -> Self {
        Self::new(MintAuthority::Fixed(verifier))
    }

    /// Minter authorized by DID documents in `registry`.
    pub fn with_registry(registry: RegistryReader) -> Self {
        Self::new(MintAuthority::DidBound(registry))
    }

    pub fn authority(&self) -> &MintAuthority {
        &self.authority
    }

    /// Mints a token for `to` if `signature` over `message` comes from the
    /// fixed verifier.
    ///
    /// # Errors
    /// - `AuthorityMismatch` if the minter is DID-bound
    /// - `InvalidRecipient` if `to` is the zero address
    /// - `InvalidSignature` if the signature is malformed or from another key
    pub fn mint_nft(&mut self, message: &str, signature: &[u8], to: Address) -> Result<u64> {
        let verifier = match &self.authority {
            MintAuthority::Fixed(verifier) => *verifier,
            MintAuthority::DidBound(_) => return Err(Error::AuthorityMismatch),
        };
        check_recipient(&to)?;
        if let Err(err) = verify_signer(message.as_bytes(), signature, &verifier) {
            log::warn!("mint rejected: signature does not match verifier");
            return Err(err);
        }
        Ok(self.commit_mint(message, to))
    }

    /// Mints a token for `to` if `signature` over `message` comes from the
    /// address stored in the DID document with id `did_id`.
    ///
    /// An unknown or deleted DID has an empty public key, which never matches
    /// a recovered signer.
    ///
    /// # Errors
    /// - `AuthorityMismatch` if the minter uses a fixed verifier
    /// - `InvalidRecipient` if `to` is the zero address
    /// - `InvalidSignature` if the signature is malformed, the DID is missing,
    ///   or the signer is not the DID's key
    pub fn mint_nft_with_did(
        &mut self,
        did_id: u64,
        message: &str,
        signature: &[u8],
        to: Address,
    ) -> Result<u64> {
        let registry = match &self.authority {
            MintAuthority::DidBound(registry) => registry,
            MintAuthority::Fixed(_) => return Err(Error::AuthorityMismatch),
        };
        check_recipient(&to)?;

        let document = registry.read()?.get_did_document_by_id(did_id);
        let expected = match parse_address(&document.public_key) {
            Some(address) => address,
            None => {
                log::warn!("mint rejected: DID {} has no address key", did_id);
                return Err(Error::InvalidSignature);
            }
        };
        if let Err(err) = verify_signer(message.as_bytes(), signature, &expected) {
            log::warn!("mint rejected: signature does not match DID {}", did_id);
            return Err(err);
        }
        Ok(self.commit_mint(message, to))
    }

    /// Content of a minted token.
    pub fn token_uri(&self, token_id: u64) -> Result<String> {
        self.tokens
            .get(&token_id)
            .map(|token| token.content.clone())
            .ok_or(Error::NotFound)
    }

    /// Owner of a minted token.
    pub fn owner_of(&self, token_id: u64) -> Result<Address> {
        self.tokens
            .get(&token_id)
            .map(|token| token.owner)
            .ok_or(Error::NotFound)
    }

    pub fn token(&self, token_id: u64) -> Option<&AssetRecord> {
        self.tokens.get(&token_id)
    }

    /// Number of tokens minted so far.
    pub fn total_supply(&self) -> u64 {
        self.last_token_id
    }

    /// Pass-through to the registry's reverse lookup. A fixed-verifier minter
    /// has no registry and always answers with the empty string.
    pub fn get_did_by_id(&self, id: u64) -> Result<String> {
        match &self.authority {
            MintAuthority::DidBound(registry) => Ok(registry.read()?.get_did_by_id(id)),
            MintAuthority::Fixed(_) => Ok(String::new()),
        }
    }

    fn commit_mint(&mut self, message: &str, to: Address) -> u64 {
        let token_id = self.last_token_id + 1;
        self.last_token_id = token_id;
        self.tokens.insert(
            token_id,
            AssetRecord {
                token_id,
                owner: to,
                content: message.to_string(),
            },
        );
        log::info!("minted token {} to {:?}", token_id, to);
        token_id
    }
}

fn check_recipient(to: &Address) -> Result<()> {
    if to.is_zero() {
        return Err(Error::InvalidRecipient);
    }
    Ok(())
}
