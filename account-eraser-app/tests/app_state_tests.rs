#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for `AppStateBuilder` and end-to-end deletions over the in-memory directory.

use std::io::Write;
use std::sync::Arc;

use account_eraser_app::adapters::{AccountRecord, InMemoryAccountDirectory};
use account_eraser_app::config::EraserConfig;
use account_eraser_app::error::AppError;
use account_eraser_app::AppStateBuilder;
use account_eraser_core::error::{CoreError, DirectoryError, DirectoryResult};
use account_eraser_core::traits::PermissionOracle;
use account_eraser_core::types::{
    AccountId, Capability, ErasureStage, ExternalId, GpgKey, Principal, SkipReason, SshKey,
    StageStatus,
};
use async_trait::async_trait;

const CONFIG: &str = r#"
[plugin]
name = "account"
canonical_web_url = "https://review.example.com/"

[gpg]
enabled = true

[[grants]]
username = "admin"
capabilities = ["deleteAccount"]

[[grants]]
account_id = 1000
capabilities = ["deleteOwnAccount"]

[[grants]]
account_id = 1001
capabilities = ["deleteOwnAccount"]
"#;

fn id(raw: u32) -> AccountId {
    AccountId::new(raw).unwrap()
}

fn full_record(raw: u32) -> AccountRecord {
    AccountRecord {
        id: id(raw),
        emails: vec![format!("user{raw}@example.com")],
        ssh_keys: vec![
            SshKey {
                seq: 1,
                ssh_public_key: "ssh-ed25519 AAAAC3Nza user".to_string(),
                valid: true,
            },
            SshKey {
                seq: 2,
                ssh_public_key: "garbage".to_string(),
                valid: false,
            },
        ],
        gpg_keys: vec![GpgKey {
            id: "AFC8A49B".to_string(),
            fingerprint: None,
            user_ids: vec![],
        }],
        external_ids: vec![
            ExternalId::new(format!("username:user{raw}")),
            ExternalId::new(format!("mailto:user{raw}@example.com"))
                .with_email(format!("user{raw}@example.com")),
            ExternalId::new("uuid:0b6f"),
            ExternalId::new("gerrit:user"),
        ],
        display_name: Some(format!("User {raw}")),
        active: true,
    }
}

fn directory() -> Arc<InMemoryAccountDirectory> {
    Arc::new(InMemoryAccountDirectory::with_records(
        true,
        [full_record(1000), full_record(1001)],
    ))
}

fn config() -> EraserConfig {
    EraserConfig::from_toml_str(CONFIG).unwrap()
}

#[test]
fn build_requires_directory_views() {
    let result = AppStateBuilder::new().config(config()).build();
    assert!(matches!(result, Err(AppError::MissingAdapter("directory_views"))));
}

#[test]
fn build_rejects_invalid_config() {
    let mut config = config();
    config.plugin.canonical_web_url = Some("not a url".to_string());

    let result = AppStateBuilder::new()
        .config(config)
        .directory_views(directory())
        .build();
    assert!(matches!(result, Err(AppError::InvalidConfig(_))));
}

#[test]
fn build_wires_login_redirect_and_capabilities() {
    let state = AppStateBuilder::new()
        .config(config())
        .directory_views(directory())
        .build()
        .unwrap();

    let redirect = state.login_redirect.as_ref().unwrap();
    assert_eq!(redirect.plugin_path(), "/plugins/account/");
    assert_eq!(
        state.capability_names(),
        vec!["account-deleteAccount", "account-deleteOwnAccount"]
    );
}

#[test]
fn default_config_has_no_login_redirect() {
    let state = AppStateBuilder::new()
        .directory_views(directory())
        .build()
        .unwrap();
    assert!(state.login_redirect.is_none());
    assert!(state.config.grants.is_empty());
}

#[tokio::test]
async fn user_erases_own_account() {
    let dir = directory();
    let state = AppStateBuilder::new()
        .config(config())
        .directory_views(dir.clone())
        .build()
        .unwrap();

    let me = Principal::account(id(1000)).with_username("user1000");
    assert!(state.deletion_service.can_delete(&me, id(1000)).await);

    let outcome = state
        .deletion_service
        .delete_account(&me, id(1000))
        .await
        .unwrap();
    assert_eq!(
        outcome.stage(ErasureStage::GpgKeys).unwrap().status,
        StageStatus::Completed { removed: 1 }
    );

    let record = dir.get(id(1000)).await.unwrap();
    assert!(record.emails.is_empty());
    assert_eq!(record.ssh_keys.len(), 1);
    assert!(!record.ssh_keys[0].valid);
    assert!(record.gpg_keys.is_empty());
    let keys: Vec<_> = record.external_ids.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["username:user1000", "uuid:0b6f", "gerrit:user"]);
    assert_eq!(record.display_name, None);
    assert!(!record.active);

    // untouched
    assert_eq!(dir.get(id(1001)).await.unwrap(), full_record(1001));
}

#[tokio::test]
async fn user_cannot_erase_someone_else() {
    let dir = directory();
    let state = AppStateBuilder::new()
        .config(config())
        .directory_views(dir.clone())
        .build()
        .unwrap();

    let me = Principal::account(id(1000));
    let err = state
        .deletion_service
        .delete_account(&me, id(1001))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::PermissionDenied { target } if target == id(1001)));
    assert_eq!(dir.get(id(1001)).await.unwrap(), full_record(1001));
}

#[tokio::test]
async fn admin_erases_other_account_but_keeps_gpg_keys() {
    let dir = directory();
    let state = AppStateBuilder::new()
        .config(config())
        .directory_views(dir.clone())
        .build()
        .unwrap();

    let admin = Principal::account(id(1)).with_username("admin");
    let outcome = state
        .deletion_service
        .delete_account(&admin, id(1001))
        .await
        .unwrap();

    assert_eq!(
        outcome.stage(ErasureStage::GpgKeys).unwrap().status,
        StageStatus::Skipped {
            reason: SkipReason::NotOwnAccount
        }
    );
    let record = dir.get(id(1001)).await.unwrap();
    assert_eq!(record.gpg_keys.len(), 1);
    assert!(record.emails.is_empty());
    assert!(!record.active);
}

#[tokio::test]
async fn erasing_twice_is_harmless() {
    let dir = directory();
    let state = AppStateBuilder::new()
        .config(config())
        .directory_views(dir.clone())
        .build()
        .unwrap();
    let me = Principal::account(id(1000));

    state.deletion_service.delete_account(&me, id(1000)).await.unwrap();
    let after_first = dir.get(id(1000)).await.unwrap();

    let second = state
        .deletion_service
        .delete_account(&me, id(1000))
        .await
        .unwrap();
    assert_eq!(second.total_removed(), 0);
    assert_eq!(dir.get(id(1000)).await.unwrap(), after_first);
}

#[tokio::test]
async fn unknown_target_fails_at_lookup() {
    let state = AppStateBuilder::new()
        .config(config())
        .directory_views(directory())
        .build()
        .unwrap();

    let admin = Principal::unresolved().with_username("admin");
    let err = state
        .deletion_service
        .delete_account(&admin, id(4242))
        .await
        .unwrap_err();
    assert_eq!(err.failed_stage(), Some(ErasureStage::Resolve));
    assert!(err.is_expected());
}

/// Oracle whose backend is down
struct BrokenOracle;

#[async_trait]
impl PermissionOracle for BrokenOracle {
    async fn has_capability(&self, _: &Principal, _: Capability) -> DirectoryResult<bool> {
        Err(DirectoryError::Unavailable("permission backend offline".to_string()))
    }
}

#[tokio::test]
async fn custom_oracle_overrides_config_grants() {
    let dir = directory();
    let state = AppStateBuilder::new()
        .config(config())
        .directory_views(dir.clone())
        .permission_oracle(Arc::new(BrokenOracle))
        .build()
        .unwrap();

    let me = Principal::account(id(1000));
    assert!(!state.deletion_service.can_delete(&me, id(1000)).await);
    assert!(dir.get(id(1000)).await.unwrap().active);
}

#[test]
fn config_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();

    let loaded = EraserConfig::load(file.path()).unwrap();
    assert_eq!(loaded, config());
    assert!(loaded.gpg.enabled);
    assert_eq!(loaded.grants.len(), 3);
}

#[test]
fn missing_config_file_reports_path() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("absent.toml");

    let err = EraserConfig::load(&path).unwrap_err();
    assert!(matches!(err, AppError::ConfigRead { .. }));
    assert!(err.to_string().contains("absent.toml"));
}
