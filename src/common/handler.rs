use serde_json::Value;

use crate::common::types::{VerificationRequest, VerifySignatureResponse};
use crate::common::verify;
use crate::error::{ApiError, ApiResult};

pub const MESSAGE_REQUIRED: &str = "Message is required and must be a string";
pub const SIGNATURE_REQUIRED: &str = "Signature is required and must be a string";

/// Largest accepted request body, 100 KiB
pub const MAX_BODY_BYTES: usize = 100 * 1024;

/// Checks the shape of a verification body.
///
/// `message` is checked before `signature`. The empty string is a valid message.
/// A body that is not a JSON object has no `message`.
pub fn parse_request(body: &[u8]) -> ApiResult<VerificationRequest> {
    let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

    let message = match value.get("message") {
        Some(Value::String(message)) => message.clone(),
        _ => return Err(ApiError::InvalidRequest(MESSAGE_REQUIRED.to_string())),
    };

    let signature = match value.get("signature") {
        Some(Value::String(signature)) => signature.clone(),
        _ => return Err(ApiError::InvalidRequest(SIGNATURE_REQUIRED.to_string())),
    };

    Ok(VerificationRequest { message, signature })
}

/// Runs verification for an already validated request
pub fn respond(request: VerificationRequest) -> VerifySignatureResponse {
    let result = verify::verify_message(&request.message, &request.signature);
    tracing::info!(is_valid = result.is_valid, signer = %result.signer, "Verified signature");
    VerifySignatureResponse::new(result, request.message)
}

/// Validate then verify, on the current thread
pub fn handle_verify_body(body: &[u8]) -> ApiResult<VerifySignatureResponse> {
    if body.len() > MAX_BODY_BYTES {
        return Err(ApiError::PayloadTooLarge);
    }
    let request = parse_request(body)?;
    Ok(respond(request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::ZERO_ADDRESS;
    use crate::test_utils;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_parse_valid_request() {
        let request = parse_request(&body(json!({ "message": "hi", "signature": "0x12" }))).unwrap();

        assert_eq!(request.message, "hi");
        assert_eq!(request.signature, "0x12");
    }

    #[test]
    fn test_parse_empty_message_is_allowed() {
        let request = parse_request(&body(json!({ "message": "", "signature": "0x12" }))).unwrap();

        assert_eq!(request.message, "");
    }

    #[test]
    fn test_parse_missing_message() {
        let result = parse_request(&body(json!({ "signature": "0x12" })));

        assert_matches!(result, Err(ApiError::InvalidRequest(hint)) if hint == MESSAGE_REQUIRED);
    }

    #[test]
    fn test_parse_wrong_message_type() {
        let result = parse_request(&body(json!({ "message": 123, "signature": "0x123" })));

        assert_matches!(result, Err(ApiError::InvalidRequest(hint)) if hint == MESSAGE_REQUIRED);
    }

    #[test]
    fn test_parse_null_message() {
        let result = parse_request(&body(json!({ "message": null, "signature": "0x123" })));

        assert_matches!(result, Err(ApiError::InvalidRequest(_)));
    }

    #[test]
    fn test_parse_missing_signature() {
        let result = parse_request(&body(json!({ "message": "test" })));

        assert_matches!(result, Err(ApiError::InvalidRequest(hint)) if hint == SIGNATURE_REQUIRED);
    }

    #[test]
    fn test_parse_wrong_signature_type() {
        let result = parse_request(&body(json!({ "message": "test", "signature": 123 })));

        assert_matches!(result, Err(ApiError::InvalidRequest(hint)) if hint == SIGNATURE_REQUIRED);
    }

    #[test]
    fn test_parse_message_checked_first() {
        let result = parse_request(&body(json!({})));

        assert_matches!(result, Err(ApiError::InvalidRequest(hint)) if hint == MESSAGE_REQUIRED);
    }

    #[test]
    fn test_parse_non_json_body() {
        assert_matches!(parse_request(b"not json"), Err(ApiError::InvalidRequest(_)));
        assert_matches!(parse_request(b""), Err(ApiError::InvalidRequest(_)));
        assert_matches!(parse_request(b"[\"message\"]"), Err(ApiError::InvalidRequest(_)));
    }

    #[test]
    fn test_handle_oversized_body() {
        let message = "A".repeat(MAX_BODY_BYTES);
        let result = handle_verify_body(&body(json!({ "message": message, "signature": "0x12" })));

        assert_matches!(result, Err(ApiError::PayloadTooLarge));
    }

    #[test]
    fn test_handle_echoes_message_when_invalid() {
        let response =
            handle_verify_body(&body(json!({ "message": "echo me", "signature": "0xinvalid" })))
                .unwrap();

        assert!(!response.is_valid);
        assert_eq!(response.signer, ZERO_ADDRESS);
        assert_eq!(response.original_message, "echo me");
    }

    #[test]
    fn test_handle_valid_signature() {
        let (wallet, signed) = test_utils::create_signed_message("Hello, Web3!");

        let response = handle_verify_body(&body(json!({
            "message": signed.message,
            "signature": signed.signature,
        })))
        .unwrap();

        assert!(response.is_valid);
        assert_eq!(response.signer, wallet.address_string());
        assert_eq!(response.original_message, "Hello, Web3!");
    }
}
