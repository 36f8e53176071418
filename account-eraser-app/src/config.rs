//! TOML configuration
//!
//! ```toml
//! [plugin]
//! name = "account"
//! canonical_web_url = "https://review.example.com/"
//!
//! [gpg]
//! enabled = true
//!
//! [[grants]]
//! username = "admin"
//! capabilities = ["deleteAccount"]
//!
//! [[grants]]
//! account_id = 1000042
//! capabilities = ["deleteOwnAccount"]
//! ```

use std::path::Path;

use account_eraser_core::types::{AccountId, Capability, Principal};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, AppResult};

/// Plugin name used when the config does not set one
pub const DEFAULT_PLUGIN_NAME: &str = "account";

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EraserConfig {
    pub plugin: PluginConfig,
    pub gpg: GpgConfig,
    pub grants: Vec<CapabilityGrant>,
}

/// `[plugin]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PluginConfig {
    /// Name the plugin is installed under; prefixes capability names and the plugin URL
    pub name: String,
    /// Canonical URL of the host, with trailing slash. Without it the login redirect is disabled.
    pub canonical_web_url: Option<String>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_PLUGIN_NAME.to_string(),
            canonical_web_url: None,
        }
    }
}

/// `[gpg]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GpgConfig {
    pub enabled: bool,
}

/// `[[grants]]` entry: capabilities for an account id and/or a username
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilityGrant {
    #[serde(default)]
    pub account_id: Option<AccountId>,
    #[serde(default)]
    pub username: Option<String>,
    pub capabilities: Vec<Capability>,
}

impl CapabilityGrant {
    /// Whether the grant applies to `principal`
    #[must_use]
    pub fn matches(&self, principal: &Principal) -> bool {
        let by_id = self.account_id.is_some() && self.account_id == principal.account_id;
        let by_name = self.username.is_some() && self.username == principal.username;
        by_id || by_name
    }
}

impl EraserConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(raw: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    pub fn load(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Check values serde cannot check
    pub fn validate(&self) -> AppResult<()> {
        let name = self.plugin.name.trim();
        if name.is_empty() || name.contains('/') {
            return Err(AppError::InvalidConfig(format!(
                "plugin.name must be a non-empty path segment, got '{}'",
                self.plugin.name
            )));
        }

        if let Some(ref raw) = self.plugin.canonical_web_url {
            Url::parse(raw).map_err(|e| {
                AppError::InvalidConfig(format!("plugin.canonical_web_url '{raw}': {e}"))
            })?;
            if !raw.ends_with('/') {
                return Err(AppError::InvalidConfig(format!(
                    "plugin.canonical_web_url must end with '/', got '{raw}'"
                )));
            }
        }

        for (i, grant) in self.grants.iter().enumerate() {
            if grant.account_id.is_none() && grant.username.is_none() {
                return Err(AppError::InvalidConfig(format!(
                    "grants[{i}] needs an account_id or a username"
                )));
            }
        }
        Ok(())
    }

    /// Plugin URL under the canonical URL: `<canonical>plugins/<name>/`
    #[must_use]
    pub fn plugin_url(&self) -> Option<String> {
        self.plugin
            .canonical_web_url
            .as_ref()
            .map(|base| format!("{base}plugins/{}/", self.plugin.name))
    }
}
