use thiserror::Error;

use crate::common::signer::{SignerError, Wallet};
use crate::common::types::{SignedMessage, VerifySignatureResponse};
use crate::history::{HistoryError, HistoryStorage, SignatureHistory, SignatureRecord};

pub const VERIFY_PATH: &str = "/api/verify-signature";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Please enter a message to sign")]
    EmptyMessage,

    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error("request to verifier failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("verifier returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// HTTP client for the verification endpoint
#[derive(Debug, Clone)]
pub struct VerifierClient {
    http: reqwest::Client,
    endpoint: String,
}

impl VerifierClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), VERIFY_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn verify(&self, signed: &SignedMessage) -> Result<VerifySignatureResponse, ClientError> {
        tracing::debug!(endpoint = %self.endpoint, "Sending verification request");

        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(signed)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        Ok(response.json::<VerifySignatureResponse>().await?)
    }
}

/// Signs a message, has the verifier check it, and records the outcome.
///
/// The message is trimmed first; a blank message is rejected before signing.
/// Nothing is recorded when the verifier cannot be reached.
pub async fn sign_and_verify<S: HistoryStorage>(
    wallet: &Wallet,
    client: &VerifierClient,
    history: &mut SignatureHistory<S>,
    message: &str,
) -> Result<SignatureRecord, ClientError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(ClientError::EmptyMessage);
    }

    let signed = wallet.sign(message)?;
    let verification = client.verify(&signed).await?;

    let record = SignatureRecord::new(signed, Some(verification));
    history.record(record.clone())?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::handler;
    use crate::history::MemoryHistoryStorage;
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    /// Mock verifier that runs the real request pipeline
    async fn start_verifier() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(VERIFY_PATH))
            .respond_with(|request: &Request| match handler::handle_verify_body(&request.body) {
                Ok(response) => ResponseTemplate::new(200).set_body_json(response),
                Err(e) => ResponseTemplate::new(e.status_code().as_u16()).set_body_json(e.body()),
            })
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        assert_eq!(
            VerifierClient::new("http://localhost:3001/").endpoint(),
            "http://localhost:3001/api/verify-signature"
        );
        assert_eq!(
            VerifierClient::new("http://localhost:3001").endpoint(),
            "http://localhost:3001/api/verify-signature"
        );
    }

    #[tokio::test]
    async fn test_verify_valid_signature() {
        let server = start_verifier().await;
        let client = VerifierClient::new(&server.uri());
        let wallet = Wallet::random();
        let signed = wallet.sign("Hello, Web3!").unwrap();

        let response = client.verify(&signed).await.unwrap();

        assert!(response.is_valid);
        assert_eq!(response.signer, wallet.address_string());
        assert_eq!(response.original_message, "Hello, Web3!");
    }

    #[tokio::test]
    async fn test_verify_surfaces_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(VERIFY_PATH))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({ "error": "Failed to verify signature" })),
            )
            .mount(&server)
            .await;
        let client = VerifierClient::new(&server.uri());
        let signed = Wallet::random().sign("boom").unwrap();

        let result = client.verify(&signed).await;

        assert_matches!(result, Err(ClientError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_sign_and_verify_records_history() {
        let server = start_verifier().await;
        let client = VerifierClient::new(&server.uri());
        let wallet = Wallet::random();
        let mut history = SignatureHistory::load(MemoryHistoryStorage::default()).unwrap();

        let record = sign_and_verify(&wallet, &client, &mut history, "  padded message  ")
            .await
            .unwrap();

        assert_eq!(record.message, "padded message");
        assert!(record.is_valid());
        assert_eq!(history.len(), 1);
        assert_eq!(history.entries()[0], record);

        let verification = record.verification_result.unwrap();
        assert_eq!(verification.signer, wallet.address_string());
    }

    #[tokio::test]
    async fn test_sign_and_verify_rejects_blank_message() {
        let client = VerifierClient::new("http://127.0.0.1:9");
        let mut history = SignatureHistory::load(MemoryHistoryStorage::default()).unwrap();

        let result = sign_and_verify(&Wallet::random(), &client, &mut history, "   ").await;

        assert_matches!(result, Err(ClientError::EmptyMessage));
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_sign_and_verify_failure_records_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let client = VerifierClient::new(&server.uri());
        let mut history = SignatureHistory::load(MemoryHistoryStorage::default()).unwrap();

        let result = sign_and_verify(&Wallet::random(), &client, &mut history, "lost").await;

        assert_matches!(result, Err(ClientError::Status { status: 503, .. }));
        assert!(history.is_empty());
    }
}
