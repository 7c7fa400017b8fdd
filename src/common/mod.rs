pub mod client;
pub mod handler;
pub mod signer;
pub mod types;
pub mod verify;
