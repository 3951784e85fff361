//! In-process contract state machines: the DID registry and the signed NFT
//! minter.

pub mod did_registry;
pub mod signed_nft;
