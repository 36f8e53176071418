//! Business logic service layer

mod account_deletion_service;
mod account_eraser;
mod erasure_authorizer;

pub use account_deletion_service::AccountDeletionService;
pub use account_eraser::AccountEraser;
pub use erasure_authorizer::ErasureAuthorizer;

use std::sync::Arc;

use crate::traits::{AccountDirectoryViews, PermissionOracle};

/// Service context - holds all collaborators
///
/// The platform layer creates this context and injects its directory and
/// permission implementations.
pub struct ServiceContext {
    directory_views: Arc<dyn AccountDirectoryViews>,
    permission_oracle: Arc<dyn PermissionOracle>,
}

impl ServiceContext {
    /// Create service context
    #[must_use]
    pub fn new(
        directory_views: Arc<dyn AccountDirectoryViews>,
        permission_oracle: Arc<dyn PermissionOracle>,
    ) -> Self {
        Self {
            directory_views,
            permission_oracle,
        }
    }

    /// Account directory views
    #[must_use]
    pub fn directory_views(&self) -> &Arc<dyn AccountDirectoryViews> {
        &self.directory_views
    }

    /// Permission backend
    #[must_use]
    pub fn permission_oracle(&self) -> &Arc<dyn PermissionOracle> {
        &self.permission_oracle
    }
}
