//! # DID Registry and Signed NFT Minter
//!
//! Self-sovereign identity anchoring plus identity-authenticated asset
//! issuance:
//! 1. **Contracts**: the DID registry state machine and the signature-gated
//!    NFT minter
//! 2. **Services**: signer recovery, the serialized ledger hosting both
//!    contracts, and the HTTP API
//! 3. **Wallet**: secp256k1 keys that produce mint signatures
//!
//! ```no_run
//! use did_signed_nft::contracts::did_registry::{DIDRegistry, RegistryHandle};
//! use did_signed_nft::contracts::signed_nft::SignedNFT;
//! use did_signed_nft::models::did::DIDMetadata;
//! use did_signed_nft::wallet::key_management::KeyManager;
//! use ethers::types::Address;
//!
//! let signer = KeyManager::new();
//! let registry = RegistryHandle::new(DIDRegistry::new());
//! registry.write()?.create_did(
//!     Address::repeat_byte(1),
//!     "did:example:123",
//!     DIDMetadata::new(signer.address_string(), "auth", "https://example.com"),
//! )?;
//!
//! let mut nft = SignedNFT::with_registry(registry.reader());
//! let signature = signer.sign_message(b"Hello, NFT!")?;
//! let token_id = nft.mint_nft_with_did(1, "Hello, NFT!", &signature, Address::repeat_byte(2))?;
//! assert_eq!(nft.token_uri(token_id)?, "Hello, NFT!");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod contracts;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod wallet;

pub use error::{Error, Result};
