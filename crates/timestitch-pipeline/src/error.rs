//! Pipeline error types.

use thiserror::Error;

use timestitch_ledger::LedgerError;
use timestitch_media::AssemblyError;

use crate::collab::CollaboratorError;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that abort a video's run (or, when fatal, the whole pass).
///
/// Per-segment clip failures never appear here; they only exclude the
/// affected segment from the compilation.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("collaborator call failed: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("compilation assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("ledger update failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("shutdown requested")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Fatal errors end the whole pass; everything else moves on to the
    /// next video.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Collaborator(CollaboratorError::AuthFailure) | Self::Cancelled
        )
    }

    /// Whether the underlying cause was a missing platform resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Collaborator(CollaboratorError::NotFound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failure_is_fatal_rate_limit_is_not() {
        assert!(PipelineError::from(CollaboratorError::AuthFailure).is_fatal());
        assert!(!PipelineError::from(CollaboratorError::RateLimited).is_fatal());
        assert!(PipelineError::Cancelled.is_fatal());
    }

    #[test]
    fn not_found_is_detectable_for_the_skip_list() {
        assert!(PipelineError::from(CollaboratorError::NotFound).is_not_found());
        assert!(!PipelineError::from(CollaboratorError::RateLimited).is_not_found());
    }
}
