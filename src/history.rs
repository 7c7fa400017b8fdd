//! Local history of signed and verified messages.
//!
//! Storage is injected through [`HistoryStorage`] so the client can keep its
//! history in a file, in memory, or anywhere else that can hold a JSON list.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

use crate::common::types::{SignedMessage, VerifySignatureResponse};

/// History file used by the holder CLI when `HISTORY_FILE` is not set
pub const DEFAULT_HISTORY_FILE: &str = "signature_history.json";

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode history: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("history storage lock poisoned")]
    Poisoned,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRecord {
    pub id: String,
    pub message: String,
    pub signature: String,
    /// Unix milliseconds
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_result: Option<VerifySignatureResponse>,
}

impl SignatureRecord {
    pub fn new(signed: SignedMessage, verification_result: Option<VerifySignatureResponse>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            message: signed.message,
            signature: signed.signature,
            timestamp: chrono::Utc::now().timestamp_millis(),
            verification_result,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.verification_result
            .as_ref()
            .map(|result| result.is_valid)
            .unwrap_or(false)
    }
}

pub trait HistoryStorage: Send + Sync {
    fn load(&self) -> Result<Vec<SignatureRecord>, HistoryError>;
    fn save(&self, records: &[SignatureRecord]) -> Result<(), HistoryError>;
    fn clear(&self) -> Result<(), HistoryError>;
}

impl<T: HistoryStorage + ?Sized> HistoryStorage for &T {
    fn load(&self) -> Result<Vec<SignatureRecord>, HistoryError> {
        (**self).load()
    }

    fn save(&self, records: &[SignatureRecord]) -> Result<(), HistoryError> {
        (**self).save(records)
    }

    fn clear(&self) -> Result<(), HistoryError> {
        (**self).clear()
    }
}

/// History kept as a JSON array in a file
#[derive(Debug, Clone)]
pub struct FileHistoryStorage {
    path: PathBuf,
}

impl FileHistoryStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStorage for FileHistoryStorage {
    fn load(&self) -> Result<Vec<SignatureRecord>, HistoryError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&contents) {
            Ok(records) => Ok(records),
            Err(e) => {
                // A corrupt file should not lock the user out of signing
                tracing::error!(path = %self.path.display(), error = %e, "Failed to load history");
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, records: &[SignatureRecord]) -> Result<(), HistoryError> {
        let contents = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), HistoryError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryHistoryStorage {
    records: Mutex<Vec<SignatureRecord>>,
}

impl HistoryStorage for MemoryHistoryStorage {
    fn load(&self) -> Result<Vec<SignatureRecord>, HistoryError> {
        let records = self.records.lock().map_err(|_| HistoryError::Poisoned)?;
        Ok(records.clone())
    }

    fn save(&self, records: &[SignatureRecord]) -> Result<(), HistoryError> {
        let mut stored = self.records.lock().map_err(|_| HistoryError::Poisoned)?;
        *stored = records.to_vec();
        Ok(())
    }

    fn clear(&self) -> Result<(), HistoryError> {
        let mut stored = self.records.lock().map_err(|_| HistoryError::Poisoned)?;
        stored.clear();
        Ok(())
    }
}

/// Newest-first list of records backed by a storage capability
pub struct SignatureHistory<S: HistoryStorage> {
    storage: S,
    records: Vec<SignatureRecord>,
}

impl<S: HistoryStorage> SignatureHistory<S> {
    pub fn load(storage: S) -> Result<Self, HistoryError> {
        let records = storage.load()?;
        Ok(Self { storage, records })
    }

    /// Prepends `record` and persists the whole list
    pub fn record(&mut self, record: SignatureRecord) -> Result<(), HistoryError> {
        self.records.insert(0, record);
        self.storage.save(&self.records)
    }

    pub fn entries(&self) -> &[SignatureRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.records.clear();
        self.storage.clear()
    }
}

fn truncate_middle(value: &str, head: usize, tail: usize) -> String {
    if !value.is_ascii() || value.len() <= head + tail {
        return value.to_string();
    }
    format!("{}...{}", &value[..head], &value[value.len() - tail..])
}

/// `0x1234...abcd`
pub fn truncate_address(address: &str) -> String {
    truncate_middle(address, 6, 4)
}

pub fn truncate_signature(signature: &str) -> String {
    truncate_middle(signature, 20, 10)
}
