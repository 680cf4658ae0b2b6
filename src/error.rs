// ⚠️ Error taxonomy
//
// Three families, three recovery policies:
// - StoreError: the key-value backend itself failed
// - LedgerError: load/save of a ledger namespace failed (recovered or logged, never fatal)
// - InputError: user text could not be committed (surfaced as a prompt)

use thiserror::Error;

/// Failures raised by a `PersistentStore` backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failures while moving a ledger between memory and its store
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Persisted text under `key` is not valid structured text.
    #[error("malformed value under key {key}: {source}")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize value for key {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read key {key}: {source}")]
    StorageRead {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to write key {key}: {source}")]
    StorageWrite {
        key: String,
        #[source]
        source: StoreError,
    },
}

/// Reasons an amount or price typed by the user is not committed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("no date selected")]
    MissingDate,

    #[error("not a valid number: {input:?}")]
    InvalidNumber { input: String },

    #[error("ledger is still loading")]
    NotReady,
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
