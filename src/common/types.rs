use serde::{Deserialize, Serialize};

/// Address reported when a signature cannot be recovered.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Request structure for the verification endpoint
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerificationRequest {
    pub message: String,
    pub signature: String,
}

/// Outcome of recovering the signer of a personal message
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub is_valid: bool,
    pub signer: String,
}

impl VerificationResult {
    pub fn valid(signer: String) -> Self {
        Self {
            is_valid: true,
            signer,
        }
    }

    pub fn invalid() -> Self {
        Self {
            is_valid: false,
            signer: ZERO_ADDRESS.to_string(),
        }
    }
}

/// Response structure for the verification endpoint
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifySignatureResponse {
    pub is_valid: bool,
    pub signer: String,
    pub original_message: String,
}

impl VerifySignatureResponse {
    pub fn new(result: VerificationResult, original_message: String) -> Self {
        Self {
            is_valid: result.is_valid,
            signer: result.signer,
            original_message,
        }
    }
}

/// Body of `GET /health`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

/// A message together with its personal-sign signature
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedMessage {
    pub message: String,
    pub signature: String,
}
