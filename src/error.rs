use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Structural faults raised by the engines.
///
/// Ledger outcomes that are themselves part of the record (inactive wallet,
/// insufficient funds, no transfer receiver) are *not* errors: they come back
/// as a `Transaction` with `FAILED` status. Everything here aborts the
/// current operation instead.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Not owned: {0}")]
    NotOwned(String),
    #[error("Wallet limit exceeded: {0}")]
    LimitExceeded(String),
    #[error("Domain rule violated: {0}")]
    Domain(String),
    #[error("Storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(Box::new(err))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for LedgerError {
    fn from(err: rocksdb::Error) -> Self {
        Self::Storage(Box::new(err))
    }
}
