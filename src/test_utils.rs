use crate::common::signer::Wallet;
use crate::common::types::SignedMessage;
use crate::history::SignatureRecord;
use serde_json::json;

/// Creates a fresh wallet and signs `message` with it
pub fn create_signed_message(message: &str) -> (Wallet, SignedMessage) {
    let wallet = Wallet::random();
    let signed = wallet.sign(message).unwrap();
    (wallet, signed)
}

/// JSON body for `POST /api/verify-signature`
pub fn verify_request_body(message: &str, signature: &str) -> String {
    json!({
        "message": message,
        "signature": signature
    })
    .to_string()
}

/// A history record without a verification result
pub fn unverified_record(message: &str) -> SignatureRecord {
    let (_, signed) = create_signed_message(message);
    SignatureRecord::new(signed, None)
}
