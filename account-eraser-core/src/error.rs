//! Unified error type definition

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{AccountId, ErasureStage, StageReport};

/// Error reported by the account directory collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", content = "details")]
pub enum DirectoryError {
    /// The account or one of its sub-resources does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The view used is not allowed to perform the operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The host rejected the request (validation, conflict, ...)
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// GPG support failed (key store unavailable, signature checks, ...)
    #[error("GPG error: {0}")]
    Gpg(String),

    /// The directory backend could not be reached
    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

impl DirectoryError {
    /// Whether it is expected behavior (caller input, missing resource) rather than a backend fault.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::PermissionDenied(_) | Self::Rejected(_)
        )
    }
}

/// Directory call result alias
pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;

/// An erasure run stopped at `stage`
///
/// Stages listed in `completed` finished before the failure and are not rolled back.
/// Retrying the whole erasure is safe: finished stages are no-ops the second time.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[error("Erasure of account {account_id} failed at stage '{stage}': {cause}")]
pub struct ErasureFailure {
    pub account_id: AccountId,
    pub stage: ErasureStage,
    #[source]
    pub cause: DirectoryError,
    pub completed: Vec<StageReport>,
}

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// The caller may not erase the target account
    #[error("Permission denied: cannot erase account {target}")]
    PermissionDenied { target: AccountId },

    /// Account id outside the valid range
    #[error("Invalid account id: {0}")]
    InvalidAccountId(String),

    /// Erasure stopped part way
    #[error(transparent)]
    Erasure(#[from] ErasureFailure),

    /// Directory error outside an erasure run
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl CoreError {
    /// Whether it is expected behavior, used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::PermissionDenied { .. } | Self::InvalidAccountId(_) => true,
            Self::Erasure(failure) => failure.cause.is_expected(),
            Self::Directory(e) => e.is_expected(),
        }
    }

    /// Stage at which an erasure failed, for reporting to the operator
    #[must_use]
    pub fn failed_stage(&self) -> Option<ErasureStage> {
        match self {
            Self::Erasure(failure) => Some(failure.stage),
            _ => None,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
