//! In-memory account directory
//!
//! Keeps accounts in a shared map and hands out the two directory views the
//! host exposes. The views follow the host's rules: deletes of unknown items
//! fail with `NotFound`, the external id batch delete is all-or-nothing, and
//! GPG keys are only reachable through the self-service view.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use account_eraser_core::error::{DirectoryError, DirectoryResult};
use account_eraser_core::traits::{AccountDirectory, AccountDirectoryViews};
use account_eraser_core::types::{AccountId, ExternalId, GpgKey, Principal, SshKey};

/// Stored account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub id: AccountId,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub ssh_keys: Vec<SshKey>,
    #[serde(default)]
    pub gpg_keys: Vec<GpgKey>,
    #[serde(default)]
    pub external_ids: Vec<ExternalId>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl AccountRecord {
    /// Active account with no personal data
    #[must_use]
    pub fn new(id: AccountId) -> Self {
        Self {
            id,
            emails: Vec::new(),
            ssh_keys: Vec::new(),
            gpg_keys: Vec::new(),
            external_ids: Vec::new(),
            display_name: None,
            active: true,
        }
    }
}

type AccountMap = Arc<RwLock<HashMap<AccountId, AccountRecord>>>;

/// In-memory directory
///
/// Cloning shares the underlying storage.
#[derive(Debug, Clone)]
pub struct InMemoryAccountDirectory {
    accounts: AccountMap,
    gpg_enabled: bool,
}

impl InMemoryAccountDirectory {
    #[must_use]
    pub fn new(gpg_enabled: bool) -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            gpg_enabled,
        }
    }

    /// Directory pre-filled with `records`; later records replace earlier ones with the same id
    #[must_use]
    pub fn with_records(gpg_enabled: bool, records: impl IntoIterator<Item = AccountRecord>) -> Self {
        let map = records.into_iter().map(|r| (r.id, r)).collect();
        Self {
            accounts: Arc::new(RwLock::new(map)),
            gpg_enabled,
        }
    }

    /// Add or replace an account
    pub async fn insert(&self, record: AccountRecord) {
        self.accounts.write().await.insert(record.id, record);
    }

    /// Current copy of an account
    pub async fn get(&self, id: AccountId) -> Option<AccountRecord> {
        self.accounts.read().await.get(&id).cloned()
    }

    /// All accounts ordered by id
    pub async fn records(&self) -> Vec<AccountRecord> {
        let mut records: Vec<_> = self.accounts.read().await.values().cloned().collect();
        records.sort_by_key(|r| r.id);
        records
    }

    async fn ensure_exists(&self, id: AccountId) -> DirectoryResult<()> {
        if self.accounts.read().await.contains_key(&id) {
            Ok(())
        } else {
            Err(DirectoryError::NotFound(format!("account {id}")))
        }
    }

    fn handle(&self, account_id: AccountId) -> AccountHandle {
        AccountHandle {
            accounts: Arc::clone(&self.accounts),
            account_id,
            gpg_enabled: self.gpg_enabled,
        }
    }
}

#[async_trait]
impl AccountDirectoryViews for InMemoryAccountDirectory {
    async fn self_view(
        &self,
        principal: &Principal,
    ) -> DirectoryResult<Arc<dyn AccountDirectory>> {
        let id = principal.account_id.ok_or_else(|| {
            DirectoryError::NotFound("caller is not bound to an account".to_string())
        })?;
        self.ensure_exists(id).await?;
        Ok(Arc::new(SelfAccountView {
            inner: self.handle(id),
        }))
    }

    async fn by_id(&self, account_id: AccountId) -> DirectoryResult<Arc<dyn AccountDirectory>> {
        self.ensure_exists(account_id).await?;
        Ok(Arc::new(AccountByIdView {
            inner: self.handle(account_id),
        }))
    }

    fn gpg_enabled(&self) -> bool {
        self.gpg_enabled
    }
}

/// Shared plumbing of both views
struct AccountHandle {
    accounts: AccountMap,
    account_id: AccountId,
    gpg_enabled: bool,
}

impl AccountHandle {
    async fn read<T>(&self, f: impl FnOnce(&AccountRecord) -> T) -> DirectoryResult<T> {
        let accounts = self.accounts.read().await;
        let record = accounts
            .get(&self.account_id)
            .ok_or_else(|| DirectoryError::NotFound(format!("account {}", self.account_id)))?;
        Ok(f(record))
    }

    async fn write<T>(
        &self,
        f: impl FnOnce(&mut AccountRecord) -> DirectoryResult<T>,
    ) -> DirectoryResult<T> {
        let mut accounts = self.accounts.write().await;
        let record = accounts
            .get_mut(&self.account_id)
            .ok_or_else(|| DirectoryError::NotFound(format!("account {}", self.account_id)))?;
        f(record)
    }

    async fn list_emails(&self) -> DirectoryResult<Vec<String>> {
        self.read(|r| r.emails.clone()).await
    }

    async fn delete_email(&self, email: &str) -> DirectoryResult<()> {
        self.write(|r| {
            let pos = r
                .emails
                .iter()
                .position(|e| e == email)
                .ok_or_else(|| DirectoryError::NotFound(format!("email {email}")))?;
            r.emails.remove(pos);
            Ok(())
        })
        .await
    }

    async fn list_ssh_keys(&self) -> DirectoryResult<Vec<SshKey>> {
        self.read(|r| r.ssh_keys.clone()).await
    }

    async fn delete_ssh_key(&self, seq: u32) -> DirectoryResult<()> {
        self.write(|r| {
            let pos = r
                .ssh_keys
                .iter()
                .position(|k| k.seq == seq)
                .ok_or_else(|| DirectoryError::NotFound(format!("SSH key {seq}")))?;
            r.ssh_keys.remove(pos);
            Ok(())
        })
        .await
    }

    fn ensure_gpg(&self) -> DirectoryResult<()> {
        if self.gpg_enabled {
            Ok(())
        } else {
            Err(DirectoryError::Gpg("GPG key support is disabled".to_string()))
        }
    }

    async fn list_gpg_keys(&self) -> DirectoryResult<Vec<GpgKey>> {
        self.ensure_gpg()?;
        self.read(|r| r.gpg_keys.clone()).await
    }

    async fn delete_gpg_key(&self, key_id: &str) -> DirectoryResult<()> {
        self.ensure_gpg()?;
        self.write(|r| {
            let pos = r
                .gpg_keys
                .iter()
                .position(|k| k.id == key_id)
                .ok_or_else(|| DirectoryError::NotFound(format!("GPG key {key_id}")))?;
            r.gpg_keys.remove(pos);
            Ok(())
        })
        .await
    }

    async fn list_external_ids(&self) -> DirectoryResult<Vec<ExternalId>> {
        self.read(|r| r.external_ids.clone()).await
    }

    async fn delete_external_ids(&self, keys: &[String]) -> DirectoryResult<()> {
        self.write(|r| {
            if let Some(missing) = keys
                .iter()
                .find(|k| !r.external_ids.iter().any(|id| &id.key == *k))
            {
                return Err(DirectoryError::NotFound(format!("external id {missing}")));
            }
            if let Some(structural) = r
                .external_ids
                .iter()
                .find(|id| id.is_structural() && keys.contains(&id.key))
            {
                return Err(DirectoryError::Rejected(format!(
                    "external id {} cannot be deleted",
                    structural.key
                )));
            }
            r.external_ids.retain(|id| !keys.contains(&id.key));
            Ok(())
        })
        .await
    }

    async fn set_display_name(&self, name: Option<&str>) -> DirectoryResult<()> {
        self.write(|r| {
            r.display_name = name.map(str::to_string).filter(|n| !n.trim().is_empty());
            Ok(())
        })
        .await
    }

    async fn is_active(&self) -> DirectoryResult<bool> {
        self.read(|r| r.active).await
    }

    async fn deactivate(&self) -> DirectoryResult<()> {
        self.write(|r| {
            if !r.active {
                return Err(DirectoryError::Rejected(
                    "account is already inactive".to_string(),
                ));
            }
            r.active = false;
            Ok(())
        })
        .await
    }
}

/// The caller acting on their own account
pub struct SelfAccountView {
    inner: AccountHandle,
}

/// The caller acting on someone else's account; GPG keys are out of reach
pub struct AccountByIdView {
    inner: AccountHandle,
}

fn gpg_not_visible() -> DirectoryError {
    DirectoryError::PermissionDenied("GPG keys are only visible to their owner".to_string())
}

#[async_trait]
impl AccountDirectory for SelfAccountView {
    fn account_id(&self) -> AccountId {
        self.inner.account_id
    }

    async fn list_emails(&self) -> DirectoryResult<Vec<String>> {
        self.inner.list_emails().await
    }

    async fn delete_email(&self, email: &str) -> DirectoryResult<()> {
        self.inner.delete_email(email).await
    }

    async fn list_ssh_keys(&self) -> DirectoryResult<Vec<SshKey>> {
        self.inner.list_ssh_keys().await
    }

    async fn delete_ssh_key(&self, seq: u32) -> DirectoryResult<()> {
        self.inner.delete_ssh_key(seq).await
    }

    async fn list_gpg_keys(&self) -> DirectoryResult<Vec<GpgKey>> {
        self.inner.list_gpg_keys().await
    }

    async fn delete_gpg_key(&self, key_id: &str) -> DirectoryResult<()> {
        self.inner.delete_gpg_key(key_id).await
    }

    async fn list_external_ids(&self) -> DirectoryResult<Vec<ExternalId>> {
        self.inner.list_external_ids().await
    }

    async fn delete_external_ids(&self, keys: &[String]) -> DirectoryResult<()> {
        self.inner.delete_external_ids(keys).await
    }

    async fn set_display_name(&self, name: Option<&str>) -> DirectoryResult<()> {
        self.inner.set_display_name(name).await
    }

    async fn is_active(&self) -> DirectoryResult<bool> {
        self.inner.is_active().await
    }

    async fn deactivate(&self) -> DirectoryResult<()> {
        self.inner.deactivate().await
    }
}

#[async_trait]
impl AccountDirectory for AccountByIdView {
    fn account_id(&self) -> AccountId {
        self.inner.account_id
    }

    async fn list_emails(&self) -> DirectoryResult<Vec<String>> {
        self.inner.list_emails().await
    }

    async fn delete_email(&self, email: &str) -> DirectoryResult<()> {
        self.inner.delete_email(email).await
    }

    async fn list_ssh_keys(&self) -> DirectoryResult<Vec<SshKey>> {
        self.inner.list_ssh_keys().await
    }

    async fn delete_ssh_key(&self, seq: u32) -> DirectoryResult<()> {
        self.inner.delete_ssh_key(seq).await
    }

    async fn list_gpg_keys(&self) -> DirectoryResult<Vec<GpgKey>> {
        Err(gpg_not_visible())
    }

    async fn delete_gpg_key(&self, _key_id: &str) -> DirectoryResult<()> {
        Err(gpg_not_visible())
    }

    async fn list_external_ids(&self) -> DirectoryResult<Vec<ExternalId>> {
        self.inner.list_external_ids().await
    }

    async fn delete_external_ids(&self, keys: &[String]) -> DirectoryResult<()> {
        self.inner.delete_external_ids(keys).await
    }

    async fn set_display_name(&self, name: Option<&str>) -> DirectoryResult<()> {
        self.inner.set_display_name(name).await
    }

    async fn is_active(&self) -> DirectoryResult<bool> {
        self.inner.is_active().await
    }

    async fn deactivate(&self) -> DirectoryResult<()> {
        self.inner.deactivate().await
    }
}
