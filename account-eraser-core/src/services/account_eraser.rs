//! Account erasure orchestration
//!
//! Removes personal data from one account in a fixed order:
//! emails -> SSH keys -> GPG keys -> external IDs -> display name -> active flag.
//!
//! GPG keys go before external IDs because listing GPG keys needs the external
//! IDs. The display name and active flag go last so that an account is never
//! left inactive with personal data still attached: a failed run leaves an
//! active, partly erased account that can simply be erased again.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{DirectoryError, DirectoryResult, ErasureFailure};
use crate::services::ServiceContext;
use crate::traits::AccountDirectory;
use crate::types::{
    AccountId, DirectoryView, ErasureOutcome, ErasureStage, Principal, SkipReason, StageReport,
    StageStatus,
};
use crate::utils::log_sanitizer::{mask_email, mask_external_id};

/// Erases the personal data of an account
///
/// Does not check permissions; callers go through `ErasureAuthorizer` first.
pub struct AccountEraser {
    ctx: Arc<ServiceContext>,
}

impl AccountEraser {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Erase `target` on behalf of `caller`
    ///
    /// Stages run one after another; the first failing directory call stops the
    /// run and is returned together with the stages that had completed. Nothing
    /// is rolled back. Running it again on an erased account changes nothing.
    pub async fn erase(
        &self,
        caller: &Principal,
        target: AccountId,
    ) -> Result<ErasureOutcome, ErasureFailure> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let is_self = caller.is_self(target);
        let view = if is_self {
            DirectoryView::SelfService
        } else {
            DirectoryView::ById
        };

        log::info!("[{run_id}] Erasing account {target} ({view:?} view)");

        let mut completed = Vec::with_capacity(ErasureStage::SEQUENCE.len());

        let views = self.ctx.directory_views();
        let directory = match view {
            DirectoryView::SelfService => views.self_view(caller).await,
            DirectoryView::ById => views.by_id(target).await,
        }
        .and_then(|directory| {
            let bound = directory.account_id();
            if bound == target {
                Ok(directory)
            } else {
                Err(DirectoryError::Rejected(format!(
                    "view is bound to account {bound}, not {target}"
                )))
            }
        })
        .map_err(|cause| Self::failure(run_id, target, ErasureStage::Resolve, cause, &completed))?;

        for stage in ErasureStage::SEQUENCE {
            let report = self
                .run_stage(stage, directory.as_ref(), is_self)
                .await
                .map_err(|cause| Self::failure(run_id, target, stage, cause, &completed))?;

            match &report.status {
                StageStatus::Completed { removed } => {
                    log::info!("[{run_id}] Stage '{stage}' completed ({removed} changed)");
                }
                StageStatus::Skipped { reason } => {
                    log::info!("[{run_id}] Stage '{stage}' skipped: {reason}");
                }
            }
            completed.push(report);
        }

        let outcome = ErasureOutcome {
            run_id,
            account_id: target,
            view,
            started_at,
            finished_at: Utc::now(),
            stages: completed,
        };
        log::info!(
            "[{run_id}] Account {target} erased ({} items changed)",
            outcome.total_removed()
        );
        Ok(outcome)
    }

    async fn run_stage(
        &self,
        stage: ErasureStage,
        directory: &dyn AccountDirectory,
        is_self: bool,
    ) -> DirectoryResult<StageReport> {
        let removed = match stage {
            ErasureStage::Resolve => 0,
            ErasureStage::Emails => remove_emails(directory).await?,
            ErasureStage::SshKeys => remove_ssh_keys(directory).await?,
            ErasureStage::GpgKeys => {
                // GPG keys are only readable by the user themselves
                if !self.ctx.directory_views().gpg_enabled() {
                    return Ok(StageReport::skipped(stage, SkipReason::GpgDisabled));
                }
                if !is_self {
                    return Ok(StageReport::skipped(stage, SkipReason::NotOwnAccount));
                }
                remove_gpg_keys(directory).await?
            }
            ErasureStage::ExternalIds => remove_external_ids(directory).await?,
            ErasureStage::DisplayName => {
                directory.set_display_name(None).await?;
                0
            }
            ErasureStage::Deactivate => deactivate(directory).await?,
        };
        Ok(StageReport::completed(stage, removed))
    }

    fn failure(
        run_id: Uuid,
        account_id: AccountId,
        stage: ErasureStage,
        cause: DirectoryError,
        completed: &[StageReport],
    ) -> ErasureFailure {
        if cause.is_expected() {
            log::warn!("[{run_id}] Erasure of account {account_id} stopped at '{stage}': {cause}");
        } else {
            log::error!("[{run_id}] Erasure of account {account_id} stopped at '{stage}': {cause}");
        }
        ErasureFailure {
            account_id,
            stage,
            cause,
            completed: completed.to_vec(),
        }
    }
}

async fn remove_emails(directory: &dyn AccountDirectory) -> DirectoryResult<usize> {
    let emails = directory.list_emails().await?;
    for email in &emails {
        log::debug!("Deleting email {}", mask_email(email));
        directory.delete_email(email).await?;
    }
    Ok(emails.len())
}

/// Invalid keys are already unusable and stay in place.
async fn remove_ssh_keys(directory: &dyn AccountDirectory) -> DirectoryResult<usize> {
    let mut removed = 0;
    for key in directory.list_ssh_keys().await? {
        if !key.valid {
            log::debug!("Keeping invalid SSH key #{}", key.seq);
            continue;
        }
        log::debug!("Deleting SSH key #{}", key.seq);
        directory.delete_ssh_key(key.seq).await?;
        removed += 1;
    }
    Ok(removed)
}

async fn remove_gpg_keys(directory: &dyn AccountDirectory) -> DirectoryResult<usize> {
    let keys = directory.list_gpg_keys().await?;
    for key in &keys {
        log::debug!("Deleting GPG key {}", key.id);
        directory.delete_gpg_key(&key.id).await?;
    }
    Ok(keys.len())
}

/// Structural ids (username, uuid, gerrit) are kept; the rest go in one batch.
async fn remove_external_ids(directory: &dyn AccountDirectory) -> DirectoryResult<usize> {
    let keys: Vec<String> = directory
        .list_external_ids()
        .await?
        .into_iter()
        .filter(|id| !id.is_structural())
        .map(|id| id.key)
        .collect();

    if keys.is_empty() {
        return Ok(0);
    }

    log::debug!(
        "Deleting external IDs [{}]",
        keys.iter()
            .map(|k| mask_external_id(k))
            .collect::<Vec<_>>()
            .join(", ")
    );
    directory.delete_external_ids(&keys).await?;
    Ok(keys.len())
}

async fn deactivate(directory: &dyn AccountDirectory) -> DirectoryResult<usize> {
    if directory.is_active().await? {
        directory.deactivate().await?;
        Ok(1)
    } else {
        Ok(0)
    }
}
