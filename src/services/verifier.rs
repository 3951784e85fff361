// src/services/verifier.rs
//! Signature verification for identity-gated minting.
//!
//! Recovers the Ethereum address that produced a 65-byte `r || s || v`
//! signature over [`signing_digest`] of a message. Recovery is strict: the
//! signature must be in canonical low-`s` form with `v` in {0, 1, 27, 28},
//! so a malformed signature of the right length can never resolve to some
//! unintended address.

use crate::error::{Error, Result};
use crate::utils::crypto::signing_digest;
use ethers::types::{Address, Signature, U256};

/// Length of an `r || s || v` signature in bytes.
pub const SIGNATURE_LENGTH: usize = 65;

/// secp256k1 group order divided by two, big-endian. Signatures with a larger
/// `s` are the malleable twin of a canonical signature and are rejected.
const HALF_CURVE_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

/// Recovers the signer of `message` from `signature`.
///
/// # Errors
/// Returns [`Error::InvalidSignature`] if:
/// - the signature is not exactly 65 bytes
/// - `r` or `s` is zero, or `s` is in the upper half of the curve order
/// - `v` is not a recognised recovery id
/// - public key recovery fails
pub fn recover_signer(message: &[u8], signature: &[u8]) -> Result<Address> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(Error::InvalidSignature);
    }
    let (r, rest) = signature.split_at(32);
    let (s, v) = rest.split_at(32);

    if is_zero(r) || is_zero(s) || s > &HALF_CURVE_ORDER[..] {
        return Err(Error::InvalidSignature);
    }
    let v = match v[0] {
        0 | 27 => 27,
        1 | 28 => 28,
        _ => return Err(Error::InvalidSignature),
    };

    let signature = Signature {
        r: U256::from_big_endian(r),
        s: U256::from_big_endian(s),
        v,
    };
    signature
        .recover(signing_digest(message))
        .map_err(|_| Error::InvalidSignature)
}

/// Checks that `signature` over `message` was produced by `expected`.
pub fn verify_signer(message: &[u8], signature: &[u8], expected: &Address) -> Result<()> {
    let signer = recover_signer(message, signature)?;
    if signer != *expected || expected.is_zero() {
        log::debug!("recovered signer {:?} does not match {:?}", signer, expected);
        return Err(Error::InvalidSignature);
    }
    Ok(())
}

fn is_zero(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| *b == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::key_management::KeyManager;

    #[test]
    fn test_recovers_signer_address() {
        let keys = KeyManager::new();
        let signature = keys.sign_message(b"Hello, NFT!").unwrap();

        assert_eq!(signature.len(), SIGNATURE_LENGTH);
        assert_eq!(recover_signer(b"Hello, NFT!", &signature), Ok(keys.address()));
    }

    #[test]
    fn test_different_message_recovers_other_address() {
        let keys = KeyManager::new();
        let signature = keys.sign_message(b"Hello, NFT!").unwrap();

        let recovered = recover_signer(b"Goodbye, NFT!", &signature);
        assert_ne!(recovered, Ok(keys.address()));
        assert_eq!(
            verify_signer(b"Goodbye, NFT!", &signature, &keys.address()),
            Err(Error::InvalidSignature)
        );
    }

    #[test]
    fn test_rejects_wrong_length() {
        let keys = KeyManager::new();
        let signature = keys.sign_message(b"msg").unwrap();

        assert_eq!(recover_signer(b"msg", &signature[..64]), Err(Error::InvalidSignature));
        assert_eq!(recover_signer(b"msg", &[]), Err(Error::InvalidSignature));
        let mut long = signature.clone();
        long.push(0);
        assert_eq!(recover_signer(b"msg", &long), Err(Error::InvalidSignature));
    }

    #[test]
    fn test_rejects_junk_of_correct_length() {
        let junk = [0x12u8; SIGNATURE_LENGTH];
        assert_eq!(recover_signer(b"Hello, NFT!", &junk), Err(Error::InvalidSignature));
    }

    #[test]
    fn test_rejects_zero_signature() {
        let mut zero = [0u8; SIGNATURE_LENGTH];
        zero[64] = 27;
        assert_eq!(recover_signer(b"msg", &zero), Err(Error::InvalidSignature));
    }

    #[test]
    fn test_rejects_high_s_twin() {
        let keys = KeyManager::new();
        let mut signature = keys.sign_message(b"msg").unwrap();

        // s' = n - s yields a signature that recovers the same key under the
        // flipped v; it must not be accepted.
        let order = U256::from_str_radix(
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141",
            16,
        )
        .unwrap();
        let s = U256::from_big_endian(&signature[32..64]);
        let mut twin = [0u8; 32];
        (order - s).to_big_endian(&mut twin);
        signature[32..64].copy_from_slice(&twin);
        signature[64] = if signature[64] == 27 { 28 } else { 27 };

        assert_eq!(recover_signer(b"msg", &signature), Err(Error::InvalidSignature));
    }

    #[test]
    fn test_accepts_zero_based_recovery_id() {
        let keys = KeyManager::new();
        let mut signature = keys.sign_message(b"msg").unwrap();
        signature[64] -= 27;

        assert_eq!(recover_signer(b"msg", &signature), Ok(keys.address()));
    }

    #[test]
    fn test_rejects_unknown_recovery_id() {
        let keys = KeyManager::new();
        let mut signature = keys.sign_message(b"msg").unwrap();
        signature[64] = 29;

        assert_eq!(recover_signer(b"msg", &signature), Err(Error::InvalidSignature));
    }

    #[test]
    fn test_zero_expected_never_matches() {
        let junk = [0x12u8; SIGNATURE_LENGTH];
        assert_eq!(
            verify_signer(b"msg", &junk, &Address::zero()),
            Err(Error::InvalidSignature)
        );
    }
}
