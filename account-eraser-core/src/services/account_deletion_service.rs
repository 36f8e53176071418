//! Account deletion entry point
//!
//! Combines the permission decision with the erasure run, the way the
//! plugin's REST endpoint does: refuse early when the caller lacks the
//! capability, otherwise erase and report which stage failed, if any.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::Mutex;

use crate::error::{CoreError, CoreResult};
use crate::services::{AccountEraser, ErasureAuthorizer, ServiceContext};
use crate::types::{AccountId, ErasureOutcome, Principal};

/// Authorizes and runs account erasures
///
/// Erasures of the same account are serialized; different accounts run independently.
pub struct AccountDeletionService {
    authorizer: ErasureAuthorizer,
    eraser: AccountEraser,
    in_flight: StdMutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

impl AccountDeletionService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self {
            authorizer: ErasureAuthorizer::new(Arc::clone(&ctx)),
            eraser: AccountEraser::new(ctx),
            in_flight: StdMutex::new(HashMap::new()),
        }
    }

    /// Whether `caller` may delete `target`, for UIs deciding to offer the action
    pub async fn can_delete(&self, caller: &Principal, target: AccountId) -> bool {
        self.authorizer.can_erase(caller, target).await
    }

    /// Erase `target` if `caller` is allowed to
    pub async fn delete_account(
        &self,
        caller: &Principal,
        target: AccountId,
    ) -> CoreResult<ErasureOutcome> {
        if !self.authorizer.can_erase(caller, target).await {
            log::warn!(
                "Account deletion of {target} refused for caller {}",
                describe(caller)
            );
            return Err(CoreError::PermissionDenied { target });
        }

        let entry = self.enter(target);
        let result = {
            let _guard = entry.lock.lock().await;
            self.eraser.erase(caller, target).await
        };
        drop(entry);

        result.map_err(CoreError::from)
    }

    fn enter(&self, target: AccountId) -> InFlight<'_> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let lock = Arc::clone(in_flight.entry(target).or_default());
        InFlight {
            map: &self.in_flight,
            target,
            lock,
        }
    }
}

/// Registration of one pending erasure in the per-account lock map
///
/// Dropping it, including when the owning future is cancelled, removes the map
/// entry once nobody else is waiting on it.
struct InFlight<'a> {
    map: &'a StdMutex<HashMap<AccountId, Arc<Mutex<()>>>>,
    target: AccountId,
    lock: Arc<Mutex<()>>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        // one reference in the map, one held here
        if Arc::strong_count(&self.lock) <= 2 {
            in_flight.remove(&self.target);
        }
    }
}

fn describe(caller: &Principal) -> String {
    match (&caller.username, caller.account_id) {
        (Some(name), Some(id)) => format!("{name} ({id})"),
        (None, Some(id)) => id.to_string(),
        (Some(name), None) => name.clone(),
        (None, None) => "<unresolved>".to_string(),
    }
}
