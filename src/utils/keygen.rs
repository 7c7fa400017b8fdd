use message_signature_verifier::common::signer::{Wallet, DEFAULT_KEY_FILE};
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Output path from the first argument, or the default key file
    let key_file = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_KEY_FILE.to_string());

    // Generate a new secp256k1 key
    let wallet = Wallet::random();

    // Save the private key to a file
    fs::write(&key_file, format!("{}\n", wallet.private_key_hex()))?;
    println!("Private key saved to {}", key_file);
    println!("Address: {}", wallet.address_string());

    Ok(())
}
