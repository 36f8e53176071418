//! Type definitions

mod account;
mod capability;
mod erasure;

pub use account::{AccountId, ExternalId, ExternalIdScheme, GpgKey, Principal, SshKey};
pub use capability::Capability;
pub use erasure::{
    DirectoryView, ErasureOutcome, ErasureStage, SkipReason, StageReport, StageStatus,
};
