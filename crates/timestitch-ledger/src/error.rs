//! Ledger error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to open ledger at {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ledger write failed")]
    Write(#[source] std::io::Error),

    #[error("failed to encode ledger record")]
    Encode(#[from] serde_json::Error),
}
