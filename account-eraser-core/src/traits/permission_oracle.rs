//! Permission backend abstract Trait

use async_trait::async_trait;

use crate::error::DirectoryResult;
use crate::types::{Capability, Principal};

/// Answers capability questions for a principal
///
/// Platform implementation:
/// - Configuration driven: `ConfiguredPermissionOracle` (account-eraser-app)
#[async_trait]
pub trait PermissionOracle: Send + Sync {
    /// Whether `principal` holds `capability`
    ///
    /// # Arguments
    /// * `principal` - Caller being checked
    /// * `capability` - Capability to test
    async fn has_capability(
        &self,
        principal: &Principal,
        capability: Capability,
    ) -> DirectoryResult<bool>;
}
