// ---------------------------------------------------------------------------
// StorageError: failures of the durable key/value store
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors raised by durable backends and the persistence systems.
///
/// None of these stop a context: load failures fall back to seed data and
/// write failures are logged, leaving the in-memory state authoritative.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error reading or writing a record file.
    Io(std::io::Error),
    /// A collection could not be serialized.
    Encode(String),
    /// A stored record is not a valid collection.
    Decode { key: String, message: String },
    /// The backing store cannot be reached (no window, storage disabled).
    Unavailable(String),
    /// The backing store refused the write for lack of space.
    QuotaExceeded,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Encode(msg) => write!(f, "Encoding error: {msg}"),
            StorageError::Decode { key, message } => {
                write!(f, "Decoding error in record '{key}': {message}")
            }
            StorageError::Unavailable(msg) => write!(f, "Storage unavailable: {msg}"),
            StorageError::QuotaExceeded => write!(f, "Storage full: record was not written"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Encode(e.to_string())
    }
}
