// src/utils/crypto.rs
//! Cryptographic utilities optimized for blockchain compatibility.
//!
//! Uses Keccak-256 (Ethereum's standard hash function) for all operations and
//! the EIP-191 personal-message envelope for anything that gets signed.

use ethers::types::{Address, H256};
use ethers::utils::{hash_message, hex, keccak256, to_checksum};

/// Computes a Keccak-256 hash of the input data (Ethereum-compatible).
///
/// # Arguments
/// * `data` - Binary data to hash (as bytes slice)
///
/// # Returns
/// Fixed-size 32-byte array (`[u8; 32]`) containing the hash.
pub fn hash_data(data: &[u8]) -> [u8; 32] {
    keccak256(data)
}

/// Digest that mint signatures are produced over.
///
/// The message is first hashed with Keccak-256, then the 32-byte digest is
/// wrapped in the personal-message envelope
/// (`"\x19Ethereum Signed Message:\n32" || digest`) and hashed again. This is
/// what an Ethereum wallet produces for `signMessage(keccak256(message))`.
pub fn signing_digest(message: &[u8]) -> H256 {
    hash_message(hash_data(message))
}

/// Parses the canonical textual form of an identity: `0x` followed by
/// exactly 40 hex digits. Checksum casing is accepted but not enforced.
pub fn parse_address(value: &str) -> Option<Address> {
    let digits = value.strip_prefix("0x")?;
    if digits.len() != 40 {
        return None;
    }
    let bytes = hex::decode(digits).ok()?;
    Some(Address::from_slice(&bytes))
}

/// Formats an address in its EIP-55 checksummed form.
pub fn format_address(address: &Address) -> String {
    to_checksum(address, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_data_matches_known_vector() {
        // keccak256("") is a well known constant.
        let hash = hash_data(b"");
        assert_eq!(
            hex::encode(hash),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_signing_digest_differs_from_plain_hash() {
        let digest = signing_digest(b"Hello, NFT!");
        assert_ne!(digest.as_bytes(), &hash_data(b"Hello, NFT!")[..]);
    }

    #[test]
    fn test_parse_address_round_trip() {
        let text = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        let address = parse_address(text).expect("valid address");
        assert_eq!(format_address(&address), text);
        assert_eq!(parse_address(&text.to_lowercase()), Some(address));
    }

    #[test]
    fn test_parse_address_rejects_non_canonical_forms() {
        assert_eq!(parse_address("publicKeyExample"), None);
        assert_eq!(parse_address("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"), None);
        assert_eq!(parse_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeA"), None);
        assert_eq!(parse_address("0xZZAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"), None);
        assert_eq!(parse_address(""), None);
    }
}
