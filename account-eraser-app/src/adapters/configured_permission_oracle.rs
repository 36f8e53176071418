//! Permission oracle backed by the `[[grants]]` config section

use async_trait::async_trait;

use account_eraser_core::error::DirectoryResult;
use account_eraser_core::traits::PermissionOracle;
use account_eraser_core::types::{Capability, Principal};

use crate::config::CapabilityGrant;

/// Answers capability checks from a static grant list
///
/// A principal holds a capability when any grant matching its account id or
/// username lists it. Never fails.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredPermissionOracle {
    grants: Vec<CapabilityGrant>,
}

impl ConfiguredPermissionOracle {
    #[must_use]
    pub fn new(grants: Vec<CapabilityGrant>) -> Self {
        Self { grants }
    }

    fn holds(&self, principal: &Principal, capability: Capability) -> bool {
        self.grants
            .iter()
            .filter(|g| g.matches(principal))
            .any(|g| g.capabilities.contains(&capability))
    }
}

#[async_trait]
impl PermissionOracle for ConfiguredPermissionOracle {
    async fn has_capability(
        &self,
        principal: &Principal,
        capability: Capability,
    ) -> DirectoryResult<bool> {
        Ok(self.holds(principal, capability))
    }
}
