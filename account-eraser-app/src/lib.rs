//! Platform-agnostic application bootstrap for the account eraser.
//!
//! Provides `EraserConfig` (TOML configuration), `AppState` (service container),
//! `AppStateBuilder` (adapter injection) and the request gating rules.

pub mod access;
pub mod adapters;
pub mod config;
pub mod error;

use std::sync::Arc;

use account_eraser_core::services::{AccountDeletionService, ServiceContext};
use account_eraser_core::traits::{AccountDirectoryViews, PermissionOracle};
use account_eraser_core::types::Capability;

use crate::access::LoginRedirect;
use crate::adapters::ConfiguredPermissionOracle;
use crate::config::EraserConfig;
use crate::error::{AppError, AppResult};

/// Platform-agnostic application state.
///
/// Every frontend constructs this once at startup via `AppStateBuilder`.
pub struct AppState {
    /// Service context (directory views and permission oracle)
    pub ctx: Arc<ServiceContext>,
    /// Authorize-then-erase entry point
    pub deletion_service: Arc<AccountDeletionService>,
    /// Configuration the state was built from
    pub config: Arc<EraserConfig>,
    /// Login redirect rules; `None` without a canonical web URL
    pub login_redirect: Option<LoginRedirect>,
}

impl AppState {
    /// Capability names to register with the host permission system
    #[must_use]
    pub fn capability_names(&self) -> Vec<String> {
        Capability::ALL
            .iter()
            .map(|c| c.qualified_name(&self.config.plugin.name))
            .collect()
    }
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required adapters
/// - `directory_views` - where accounts live
///
/// # Optional
/// - `config` - defaults to `EraserConfig::default()`
/// - `permission_oracle` - defaults to `ConfiguredPermissionOracle` over the config grants
pub struct AppStateBuilder {
    config: Option<EraserConfig>,
    directory_views: Option<Arc<dyn AccountDirectoryViews>>,
    permission_oracle: Option<Arc<dyn PermissionOracle>>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: None,
            directory_views: None,
            permission_oracle: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: EraserConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn directory_views(mut self, views: Arc<dyn AccountDirectoryViews>) -> Self {
        self.directory_views = Some(views);
        self
    }

    #[must_use]
    pub fn permission_oracle(mut self, oracle: Arc<dyn PermissionOracle>) -> Self {
        self.permission_oracle = Some(oracle);
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `AppError::MissingAdapter` if `directory_views` is missing and
    /// `AppError::InvalidConfig` if the config does not validate.
    pub fn build(self) -> AppResult<AppState> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let directory_views = self
            .directory_views
            .ok_or(AppError::MissingAdapter("directory_views"))?;
        let permission_oracle = self.permission_oracle.unwrap_or_else(|| {
            Arc::new(ConfiguredPermissionOracle::new(config.grants.clone()))
        });

        let login_redirect = match (&config.plugin.canonical_web_url, config.plugin_url()) {
            (Some(canonical), Some(plugin_url)) => {
                Some(LoginRedirect::new(canonical.clone(), &plugin_url)?)
            }
            _ => {
                log::debug!("No canonical web URL configured, login redirect disabled");
                None
            }
        };

        let ctx = Arc::new(ServiceContext::new(directory_views, permission_oracle));
        let deletion_service = Arc::new(AccountDeletionService::new(Arc::clone(&ctx)));

        Ok(AppState {
            ctx,
            deletion_service,
            config: Arc::new(config),
            login_redirect,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
