//! Error types for orderfix-edit.
//!
//! A rewrite either succeeds or is refused. Refusals are policy outcomes (exit code 2): the
//! container is left as it was. Runtime errors (exit code 1) mean the input itself is
//! inconsistent.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RewriteError {
    /// The move was refused; the container is unchanged.
    #[error("rewrite refused: {0}")]
    Refused(#[from] RefusalReason),

    #[error("runtime error: {0}")]
    Runtime(#[from] anyhow::Error),
}

/// Why a move was not performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RefusalReason {
    /// The declaration to move is not in the current snapshot.
    #[error("target declaration not found")]
    TargetMissing,

    #[error("anchor declaration not found")]
    AnchorMissing,

    /// The move touches declarations governed by an unbalanced region marker.
    #[error("move touches an unbalanced region marker")]
    UnbalancedRegion,

    /// Subject or anchor is declared in a different file than the container.
    #[error("declarations span multiple files")]
    CrossFile,

    /// Re-anchoring the region markers would leave the container unbalanced.
    #[error("region markers would become unbalanced")]
    WouldUnbalance,

    #[error("anchor cannot receive the subject")]
    NotMovable,
}

impl RewriteError {
    pub fn is_refusal(&self) -> bool {
        matches!(self, RewriteError::Refused(_))
    }

    pub fn refusal(&self) -> Option<RefusalReason> {
        match self {
            RewriteError::Refused(reason) => Some(*reason),
            RewriteError::Runtime(_) => None,
        }
    }

    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            RewriteError::Refused(_) => 2,
            RewriteError::Runtime(_) => 1,
        }
    }
}

pub type RewriteResult<T> = Result<T, RewriteError>;
