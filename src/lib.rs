pub mod common;
pub mod config;
pub mod error;
pub mod history;
pub mod test_utils;
