use clap::{Parser, Subcommand};
use message_signature_verifier::common::client::{sign_and_verify, VerifierClient};
use message_signature_verifier::common::signer::{Wallet, DEFAULT_KEY_FILE};
use message_signature_verifier::config::{self, DEFAULT_VERIFIER_URL};
use message_signature_verifier::history::{
    truncate_address, truncate_signature, FileHistoryStorage, SignatureHistory,
    SignatureRecord, DEFAULT_HISTORY_FILE,
};

/// Sign messages with a local key and have the verifier check them
#[derive(Parser, Debug)]
#[command(name = "holder", version)]
struct Cli {
    /// Private key file, used when SIGNER_PRIVATE_KEY is unset
    #[arg(long, env = "SIGNER_KEY_FILE", default_value = DEFAULT_KEY_FILE)]
    key_file: String,

    /// File holding the local signature history
    #[arg(long, env = "HISTORY_FILE", default_value = DEFAULT_HISTORY_FILE)]
    history_file: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign a message and submit it for verification
    Sign {
        message: String,

        /// Base URL of the verifier service
        #[arg(long, env = "VERIFIER_URL", default_value = DEFAULT_VERIFIER_URL)]
        verifier_url: String,
    },
    /// Print the signing address
    Address,
    /// List signed messages, newest first
    History,
    /// Forget all signed messages
    ClearHistory,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::load_dotenv();
    config::init_tracing();

    let cli = Cli::parse();
    let storage = FileHistoryStorage::new(&cli.history_file);

    match cli.command {
        Command::Sign { message, verifier_url } => {
            let wallet = Wallet::load(&cli.key_file)?;
            let client = VerifierClient::new(&verifier_url);
            let mut history = SignatureHistory::load(storage)?;

            println!("Connected wallet: {}", wallet.address_string());
            println!("Using verifier service at: {}", client.endpoint());

            let record = sign_and_verify(&wallet, &client, &mut history, &message).await?;
            print_record(&record);
        }
        Command::Address => {
            let wallet = Wallet::load(&cli.key_file)?;
            println!("{}", wallet.address_string());
        }
        Command::History => {
            let history = SignatureHistory::load(storage)?;
            if history.is_empty() {
                println!("No signed messages yet");
            }
            for record in history.entries() {
                print_record(record);
            }
        }
        Command::ClearHistory => {
            let mut history = SignatureHistory::load(storage)?;
            history.clear()?;
            println!("History cleared");
        }
    }

    Ok(())
}

fn print_record(record: &SignatureRecord) {
    let status = if record.is_valid() { "Valid" } else { "Invalid" };
    let when = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(record.timestamp)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| record.timestamp.to_string());

    println!("[{}] {}", status, when);
    println!("  Message:   {}", record.message);
    if let Some(result) = &record.verification_result {
        println!("  Signer:    {}", truncate_address(&result.signer));
    }
    println!("  Signature: {}", truncate_signature(&record.signature));
}
