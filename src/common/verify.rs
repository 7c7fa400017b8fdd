use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};
use thiserror::Error;

use crate::common::types::VerificationResult;

/// Prefix applied to every personal message before hashing (EIP-191, version 0x45)
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Length of an `r || s || v` signature in bytes
pub const SIGNATURE_LENGTH: usize = 65;

/// 20-byte account address
pub type Address = [u8; 20];

/// Reasons a signature could not be turned into a signer address
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("signature must be 0x-prefixed")]
    MissingPrefix,

    #[error("signature is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("signature must be 65 bytes, got {0}")]
    InvalidLength(usize),

    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("invalid signature scalars")]
    InvalidScalars,

    #[error("failed to recover public key")]
    RecoveryFailed,
}

/// Keccak-256 of arbitrary bytes
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Digest signed by `personal_sign`: keccak256(prefix || len(message) || message),
/// where the length is the UTF-8 byte length written in decimal.
pub fn hash_personal_message(message: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message.as_bytes());
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Derive the account address from a public key.
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let encoded = key.to_encoded_point(false);
    // Skip the 0x04 uncompressed tag
    let hash = keccak256(&encoded.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Lowercase `0x`-prefixed hex form of an address
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// Split a `0x`-prefixed hex signature into its ECDSA part and recovery id.
///
/// `v` may be given as 27/28, as the raw parity bit 0/1, or in EIP-155 form
/// (`chain_id * 2 + 35 + parity`, so odd is parity 0 and even is parity 1).
pub fn decode_signature(signature: &str) -> Result<(Signature, RecoveryId), RecoveryError> {
    let hex_digits = signature
        .strip_prefix("0x")
        .ok_or(RecoveryError::MissingPrefix)?;

    let bytes = hex::decode(hex_digits)?;
    if bytes.len() != SIGNATURE_LENGTH {
        return Err(RecoveryError::InvalidLength(bytes.len()));
    }

    let v = bytes[64];
    let parity = match v {
        0 | 1 => v,
        27 | 28 => v - 27,
        35..=255 => (v - 35) % 2,
        _ => return Err(RecoveryError::InvalidRecoveryId(v)),
    };
    let recovery_id =
        RecoveryId::from_byte(parity).ok_or(RecoveryError::InvalidRecoveryId(v))?;

    let ecdsa = Signature::from_slice(&bytes[..64]).map_err(|_| RecoveryError::InvalidScalars)?;

    Ok((ecdsa, recovery_id))
}

/// Recover the address that signed `message` with `personal_sign`.
///
/// A well-formed signature over a different message still recovers an address;
/// callers that expect a particular signer compare it themselves.
pub fn recover_signer(message: &str, signature: &str) -> Result<Address, RecoveryError> {
    let (ecdsa, recovery_id) = decode_signature(signature)?;
    let digest = hash_personal_message(message);

    let key = VerifyingKey::recover_from_prehash(&digest, &ecdsa, recovery_id)
        .map_err(|_| RecoveryError::RecoveryFailed)?;

    Ok(address_from_verifying_key(&key))
}

/// Verifies a personal-message signature and reports the recovered signer.
///
/// Never fails: any recovery error is logged and reported as an invalid
/// result carrying the zero address.
pub fn verify_message(message: &str, signature: &str) -> VerificationResult {
    match recover_signer(message, signature) {
        Ok(address) => VerificationResult::valid(format_address(&address)),
        Err(e) => {
            tracing::warn!(error = %e, "Signature verification failed");
            VerificationResult::invalid()
        }
    }
}
