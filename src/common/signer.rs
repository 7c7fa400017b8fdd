use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::common::types::SignedMessage;
use crate::common::verify::{address_from_verifying_key, format_address, hash_personal_message, Address};

/// Key file read when `SIGNER_PRIVATE_KEY` is not set
pub const DEFAULT_KEY_FILE: &str = "signer.key";

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("private key is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("private key is not a valid secp256k1 scalar")]
    InvalidKey,

    #[error("failed to read key file: {0}")]
    Io(#[from] std::io::Error),

    #[error("signing failed")]
    SigningFailed,
}

/// A local secp256k1 key that produces `personal_sign` signatures.
pub struct Wallet {
    key: SigningKey,
    address: Address,
}

// Never print the secret
impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address_string())
            .finish_non_exhaustive()
    }
}

impl Wallet {
    pub fn from_signing_key(key: SigningKey) -> Self {
        let address = address_from_verifying_key(key.verifying_key());
        Self { key, address }
    }

    /// Generates a fresh key from the operating system RNG
    pub fn random() -> Self {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    /// Parses a 32-byte private key written as hex, with or without `0x`
    pub fn from_hex(private_key: &str) -> Result<Self, SignerError> {
        let trimmed = private_key.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(digits)?;
        let key = SigningKey::from_slice(&bytes).map_err(|_| SignerError::InvalidKey)?;
        Ok(Self::from_signing_key(key))
    }

    /// Loads the key from `SIGNER_PRIVATE_KEY`, falling back to a key file
    pub fn load(key_file: impl AsRef<Path>) -> Result<Self, SignerError> {
        let private_key = match env::var("SIGNER_PRIVATE_KEY") {
            Ok(key) => key,
            Err(_) => fs::read_to_string(key_file)?,
        };
        Self::from_hex(&private_key)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn address_string(&self) -> String {
        format_address(&self.address)
    }

    /// Hex form of the private key, as written by `keygen`
    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.key.to_bytes()))
    }

    /// Signs `message` with the personal-message prefix and returns
    /// `0x || r || s || v` with `v` in {27, 28}.
    pub fn sign_message(&self, message: &str) -> Result<String, SignerError> {
        let digest = hash_personal_message(message);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest)
            .map_err(|_| SignerError::SigningFailed)?;

        let mut bytes = Vec::with_capacity(65);
        bytes.extend_from_slice(&signature.to_bytes());
        bytes.push(recovery_id.to_byte() + 27);

        Ok(format!("0x{}", hex::encode(bytes)))
    }

    pub fn sign(&self, message: &str) -> Result<SignedMessage, SignerError> {
        Ok(SignedMessage {
            message: message.to_string(),
            signature: self.sign_message(message)?,
        })
    }
}
