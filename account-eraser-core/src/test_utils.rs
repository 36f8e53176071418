//! Test helper module
//!
//! Provides mock implementations and convenient test factory methods.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{DirectoryError, DirectoryResult};
use crate::services::{AccountDeletionService, AccountEraser, ServiceContext};
use crate::traits::{AccountDirectory, AccountDirectoryViews, PermissionOracle};
use crate::types::{AccountId, Capability, ExternalId, GpgKey, Principal, SshKey};

// ===== MockDirectory =====

/// A directory call, recorded in the order it was issued
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DirectoryCall {
    ListEmails,
    DeleteEmail(String),
    ListSshKeys,
    DeleteSshKey(u32),
    ListGpgKeys,
    DeleteGpgKey(String),
    ListExternalIds,
    DeleteExternalIds(Vec<String>),
    SetDisplayName(Option<String>),
    IsActive,
    Deactivate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockAccountState {
    pub emails: Vec<String>,
    pub ssh_keys: Vec<SshKey>,
    pub gpg_keys: Vec<GpgKey>,
    pub external_ids: Vec<ExternalId>,
    pub display_name: Option<String>,
    pub active: bool,
}

impl Default for MockAccountState {
    fn default() -> Self {
        Self {
            emails: Vec::new(),
            ssh_keys: Vec::new(),
            gpg_keys: Vec::new(),
            external_ids: Vec::new(),
            display_name: None,
            active: true,
        }
    }
}

#[derive(Default)]
struct MockStore {
    accounts: RwLock<HashMap<AccountId, MockAccountState>>,
    calls: RwLock<Vec<DirectoryCall>>,
    /// Calls that fail with the given error instead of executing
    failures: RwLock<HashMap<DirectoryCall, DirectoryError>>,
}

/// In-memory directory that records every call
pub struct MockDirectory {
    store: Arc<MockStore>,
    gpg_enabled: bool,
    /// Hand out every view bound to this account, whatever was asked for
    bound_to: Option<AccountId>,
}

impl MockDirectory {
    pub fn new(gpg_enabled: bool) -> Self {
        Self {
            store: Arc::new(MockStore::default()),
            gpg_enabled,
            bound_to: None,
        }
    }

    /// Simulate a directory that resolves views to the wrong account
    pub fn binding_views_to(mut self, id: AccountId) -> Self {
        self.bound_to = Some(id);
        self
    }

    pub async fn insert(&self, id: AccountId, state: MockAccountState) {
        self.store.accounts.write().await.insert(id, state);
    }

    pub async fn state(&self, id: AccountId) -> Option<MockAccountState> {
        self.store.accounts.read().await.get(&id).cloned()
    }

    pub async fn calls(&self) -> Vec<DirectoryCall> {
        self.store.calls.read().await.clone()
    }

    pub async fn clear_calls(&self) {
        self.store.calls.write().await.clear();
    }

    pub async fn fail_on(&self, call: DirectoryCall, err: DirectoryError) {
        self.store.failures.write().await.insert(call, err);
    }

    pub async fn clear_failures(&self) {
        self.store.failures.write().await.clear();
    }

    async fn view(&self, id: AccountId, self_service: bool) -> DirectoryResult<Arc<dyn AccountDirectory>> {
        if !self.store.accounts.read().await.contains_key(&id) {
            return Err(DirectoryError::NotFound(format!("account {id}")));
        }
        Ok(Arc::new(MockView {
            store: Arc::clone(&self.store),
            account_id: self.bound_to.unwrap_or(id),
            self_service,
        }))
    }
}

#[async_trait]
impl AccountDirectoryViews for MockDirectory {
    async fn self_view(
        &self,
        principal: &Principal,
    ) -> DirectoryResult<Arc<dyn AccountDirectory>> {
        let id = principal
            .account_id
            .ok_or_else(|| DirectoryError::NotFound("caller has no account".to_string()))?;
        self.view(id, true).await
    }

    async fn by_id(&self, account_id: AccountId) -> DirectoryResult<Arc<dyn AccountDirectory>> {
        self.view(account_id, false).await
    }

    fn gpg_enabled(&self) -> bool {
        self.gpg_enabled
    }
}

struct MockView {
    store: Arc<MockStore>,
    account_id: AccountId,
    self_service: bool,
}

impl MockView {
    async fn record(&self, call: DirectoryCall) -> DirectoryResult<()> {
        self.store.calls.write().await.push(call.clone());
        match self.store.failures.read().await.get(&call) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn with_state<T>(&self, f: impl FnOnce(&mut MockAccountState) -> T) -> DirectoryResult<T> {
        let mut accounts = self.store.accounts.write().await;
        let state = accounts
            .get_mut(&self.account_id)
            .ok_or_else(|| DirectoryError::NotFound(format!("account {}", self.account_id)))?;
        Ok(f(state))
    }
}

#[async_trait]
impl AccountDirectory for MockView {
    fn account_id(&self) -> AccountId {
        self.account_id
    }

    async fn list_emails(&self) -> DirectoryResult<Vec<String>> {
        self.record(DirectoryCall::ListEmails).await?;
        self.with_state(|s| s.emails.clone()).await
    }

    async fn delete_email(&self, email: &str) -> DirectoryResult<()> {
        self.record(DirectoryCall::DeleteEmail(email.to_string()))
            .await?;
        self.with_state(|s| s.emails.retain(|e| e != email)).await
    }

    async fn list_ssh_keys(&self) -> DirectoryResult<Vec<SshKey>> {
        self.record(DirectoryCall::ListSshKeys).await?;
        self.with_state(|s| s.ssh_keys.clone()).await
    }

    async fn delete_ssh_key(&self, seq: u32) -> DirectoryResult<()> {
        self.record(DirectoryCall::DeleteSshKey(seq)).await?;
        self.with_state(|s| s.ssh_keys.retain(|k| k.seq != seq))
            .await
    }

    async fn list_gpg_keys(&self) -> DirectoryResult<Vec<GpgKey>> {
        self.record(DirectoryCall::ListGpgKeys).await?;
        if !self.self_service {
            return Err(DirectoryError::PermissionDenied(
                "GPG keys are only visible to their owner".to_string(),
            ));
        }
        self.with_state(|s| s.gpg_keys.clone()).await
    }

    async fn delete_gpg_key(&self, key_id: &str) -> DirectoryResult<()> {
        self.record(DirectoryCall::DeleteGpgKey(key_id.to_string()))
            .await?;
        self.with_state(|s| s.gpg_keys.retain(|k| k.id != key_id))
            .await
    }

    async fn list_external_ids(&self) -> DirectoryResult<Vec<ExternalId>> {
        self.record(DirectoryCall::ListExternalIds).await?;
        self.with_state(|s| s.external_ids.clone()).await
    }

    async fn delete_external_ids(&self, keys: &[String]) -> DirectoryResult<()> {
        self.record(DirectoryCall::DeleteExternalIds(keys.to_vec()))
            .await?;
        self.with_state(|s| s.external_ids.retain(|id| !keys.contains(&id.key)))
            .await
    }

    async fn set_display_name(&self, name: Option<&str>) -> DirectoryResult<()> {
        self.record(DirectoryCall::SetDisplayName(name.map(str::to_string)))
            .await?;
        self.with_state(|s| s.display_name = name.map(str::to_string))
            .await
    }

    async fn is_active(&self) -> DirectoryResult<bool> {
        self.record(DirectoryCall::IsActive).await?;
        self.with_state(|s| s.active).await
    }

    async fn deactivate(&self) -> DirectoryResult<()> {
        self.record(DirectoryCall::Deactivate).await?;
        self.with_state(|s| s.active = false).await
    }
}

// ===== MockPermissionOracle =====

pub struct MockPermissionOracle {
    granted: HashSet<Capability>,
    error: Option<DirectoryError>,
}

impl MockPermissionOracle {
    /// Oracle granting `capabilities` to every principal
    pub fn granting(capabilities: &[Capability]) -> Self {
        Self {
            granted: capabilities.iter().copied().collect(),
            error: None,
        }
    }

    /// Make every check fail with `err`
    pub fn failing_with(mut self, err: DirectoryError) -> Self {
        self.error = Some(err);
        self
    }
}

#[async_trait]
impl PermissionOracle for MockPermissionOracle {
    async fn has_capability(
        &self,
        _principal: &Principal,
        capability: Capability,
    ) -> DirectoryResult<bool> {
        if let Some(ref err) = self.error {
            return Err(err.clone());
        }
        Ok(self.granted.contains(&capability))
    }
}

// ===== Factory methods =====

pub fn account(id: u32) -> AccountId {
    AccountId::new(id).unwrap()
}

/// The account from the reference scenario: two emails, one valid and one
/// invalid SSH key, one GPG key, two structural and two linked external ids.
pub fn sample_account() -> MockAccountState {
    MockAccountState {
        emails: vec!["a@x".to_string(), "b@x".to_string()],
        ssh_keys: vec![
            SshKey {
                seq: 7,
                ssh_public_key: "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIG alice@laptop".to_string(),
                valid: true,
            },
            SshKey {
                seq: 8,
                ssh_public_key: "ssh-rsa truncated".to_string(),
                valid: false,
            },
        ],
        gpg_keys: vec![GpgKey {
            id: "AFC8A49B".to_string(),
            fingerprint: Some("0192 723D 42D1 0C5B 32A6  E1E0 9350 9E4B AFC8 A49B".to_string()),
            user_ids: vec!["Alice Example <a@x>".to_string()],
        }],
        external_ids: vec![
            ExternalId::new("username:alice"),
            ExternalId::new("mailto:a@x").with_email("a@x"),
            ExternalId::new("uuid:7c1e2f9a"),
            ExternalId::new("google-oauth:118"),
        ],
        display_name: Some("Alice Example".to_string()),
        active: true,
    }
}

/// Create test `ServiceContext` (GPG enabled)
pub fn create_test_context(
    oracle: MockPermissionOracle,
) -> (Arc<ServiceContext>, Arc<MockDirectory>) {
    create_test_context_with(true, oracle)
}

fn create_test_context_with(
    gpg_enabled: bool,
    oracle: MockPermissionOracle,
) -> (Arc<ServiceContext>, Arc<MockDirectory>) {
    let directory = Arc::new(MockDirectory::new(gpg_enabled));
    let ctx = Arc::new(ServiceContext::new(directory.clone(), Arc::new(oracle)));
    (ctx, directory)
}

/// Create test `AccountEraser`
pub fn create_test_eraser(gpg_enabled: bool) -> (AccountEraser, Arc<MockDirectory>) {
    let (ctx, directory) = create_test_context_with(gpg_enabled, MockPermissionOracle::granting(&[]));
    (AccountEraser::new(ctx), directory)
}

/// Create test `AccountDeletionService` (GPG enabled)
pub fn create_test_deletion_service(
    oracle: MockPermissionOracle,
) -> (AccountDeletionService, Arc<MockDirectory>) {
    let (ctx, directory) = create_test_context(oracle);
    (AccountDeletionService::new(ctx), directory)
}
