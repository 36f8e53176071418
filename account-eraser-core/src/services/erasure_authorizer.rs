//! Erasure permission decision

use std::sync::Arc;

use crate::services::ServiceContext;
use crate::types::{AccountId, Capability, Principal};

/// Decides whether a caller may erase an account
///
/// Holders of `deleteAccount` may erase any account; holders of
/// `deleteOwnAccount` only their own.
pub struct ErasureAuthorizer {
    ctx: Arc<ServiceContext>,
}

impl ErasureAuthorizer {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Whether `caller` may erase `target`
    ///
    /// A caller that does not resolve to an account is never treated as the
    /// target's owner. Backend errors count as "capability not held".
    pub async fn can_erase(&self, caller: &Principal, target: AccountId) -> bool {
        if self.holds(caller, Capability::DeleteAnyAccount).await {
            return true;
        }
        caller.is_self(target) && self.holds(caller, Capability::DeleteOwnAccount).await
    }

    async fn holds(&self, caller: &Principal, capability: Capability) -> bool {
        match self
            .ctx
            .permission_oracle()
            .has_capability(caller, capability)
            .await
        {
            Ok(granted) => granted,
            Err(e) => {
                log::warn!("Capability check {capability} failed, treating as not granted: {e}");
                false
            }
        }
    }
}
