//! Account directory abstract Trait

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DirectoryResult;
use crate::types::{AccountId, ExternalId, GpgKey, Principal, SshKey};

/// Per-account view of the host's account directory
///
/// One instance is bound to one account. The host exposes two flavours of it:
/// a self-service view (the caller acting on their own account) and a by-id
/// view. They differ in visibility: GPG keys are only readable through the
/// self-service view.
///
/// Platform implementation:
/// - In-memory: `SelfAccountView` / `AccountByIdView` (account-eraser-app)
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Account this view is bound to
    fn account_id(&self) -> AccountId;

    /// List the email addresses registered on the account
    async fn list_emails(&self) -> DirectoryResult<Vec<String>>;

    /// Delete one email address
    ///
    /// # Arguments
    /// * `email` - Address as returned by `list_emails`
    async fn delete_email(&self, email: &str) -> DirectoryResult<()>;

    /// List SSH keys, including keys flagged invalid
    async fn list_ssh_keys(&self) -> DirectoryResult<Vec<SshKey>>;

    /// Delete an SSH key
    ///
    /// # Arguments
    /// * `seq` - Key sequence number
    async fn delete_ssh_key(&self, seq: u32) -> DirectoryResult<()>;

    /// List GPG keys
    async fn list_gpg_keys(&self) -> DirectoryResult<Vec<GpgKey>>;

    /// Delete a GPG key
    ///
    /// # Arguments
    /// * `key_id` - Key id as returned by `list_gpg_keys`
    async fn delete_gpg_key(&self, key_id: &str) -> DirectoryResult<()>;

    /// List external identifiers, structural ones included
    async fn list_external_ids(&self) -> DirectoryResult<Vec<ExternalId>>;

    /// Delete external identifiers in a single call
    ///
    /// # Arguments
    /// * `keys` - `scheme:identity` keys; the call fails as a whole if any key is unknown
    async fn delete_external_ids(&self, keys: &[String]) -> DirectoryResult<()>;

    /// Set or clear the display name
    ///
    /// # Arguments
    /// * `name` - New name, `None` clears it
    async fn set_display_name(&self, name: Option<&str>) -> DirectoryResult<()>;

    /// Whether the account is active
    async fn is_active(&self) -> DirectoryResult<bool>;

    /// Mark the account inactive
    async fn deactivate(&self) -> DirectoryResult<()>;
}

/// Hands out directory views and reports host-wide directory settings
#[async_trait]
pub trait AccountDirectoryViews: Send + Sync {
    /// Self-service view of the principal's own account
    ///
    /// Fails with `NotFound` when the principal does not resolve to an account.
    async fn self_view(&self, principal: &Principal)
        -> DirectoryResult<Arc<dyn AccountDirectory>>;

    /// View of an arbitrary account
    ///
    /// Fails with `NotFound` when the account does not exist.
    async fn by_id(&self, account_id: AccountId) -> DirectoryResult<Arc<dyn AccountDirectory>>;

    /// Whether GPG key support is enabled on the host
    fn gpg_enabled(&self) -> bool;
}
