//! Erasure stages and the outcome of one erasure run

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AccountId;

/// Which view of the directory an erasure ran through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DirectoryView {
    /// The caller acting on their own account
    SelfService,
    /// The caller acting on another account
    ById,
}

/// A step of the erasure sequence
///
/// Declaration order is execution order; `Resolve` precedes the data stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErasureStage {
    Resolve,
    Emails,
    SshKeys,
    GpgKeys,
    ExternalIds,
    DisplayName,
    Deactivate,
}

impl ErasureStage {
    /// Data stages in the order they run
    pub const SEQUENCE: [Self; 6] = [
        Self::Emails,
        Self::SshKeys,
        Self::GpgKeys,
        Self::ExternalIds,
        Self::DisplayName,
        Self::Deactivate,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resolve => "account lookup",
            Self::Emails => "emails",
            Self::SshKeys => "SSH keys",
            Self::GpgKeys => "GPG keys",
            Self::ExternalIds => "external IDs",
            Self::DisplayName => "display name",
            Self::Deactivate => "active flag",
        }
    }
}

impl fmt::Display for ErasureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a stage was not run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// GPG support is switched off on the host
    GpgDisabled,
    /// GPG keys are only readable by their owner
    NotOwnAccount,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpgDisabled => f.write_str("GPG support is disabled"),
            Self::NotOwnAccount => f.write_str("GPG keys are only visible to their owner"),
        }
    }
}

/// Result of a single stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum StageStatus {
    /// The stage ran; `removed` counts the items it deleted or changed
    Completed { removed: usize },
    /// The stage was deliberately not run
    Skipped { reason: SkipReason },
}

/// One entry of the per-stage report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: ErasureStage,
    #[serde(flatten)]
    pub status: StageStatus,
}

impl StageReport {
    #[must_use]
    pub fn completed(stage: ErasureStage, removed: usize) -> Self {
        Self {
            stage,
            status: StageStatus::Completed { removed },
        }
    }

    #[must_use]
    pub fn skipped(stage: ErasureStage, reason: SkipReason) -> Self {
        Self {
            stage,
            status: StageStatus::Skipped { reason },
        }
    }

    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self.status, StageStatus::Skipped { .. })
    }
}

/// Outcome of a successful erasure run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErasureOutcome {
    /// Correlates the log lines of one run
    pub run_id: Uuid,
    pub account_id: AccountId,
    pub view: DirectoryView,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stages: Vec<StageReport>,
}

impl ErasureOutcome {
    /// Report for `stage`, if it was reached
    #[must_use]
    pub fn stage(&self, stage: ErasureStage) -> Option<&StageReport> {
        self.stages.iter().find(|r| r.stage == stage)
    }

    /// Total number of items changed across all stages
    ///
    /// Zero means the account was already fully erased.
    #[must_use]
    pub fn total_removed(&self) -> usize {
        self.stages
            .iter()
            .map(|r| match r.status {
                StageStatus::Completed { removed } => removed,
                StageStatus::Skipped { .. } => 0,
            })
            .sum()
    }
}
