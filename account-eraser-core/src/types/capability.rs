//! Plugin capabilities that gate account erasure

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Capability granted through the host permission system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Erase any account (administrators)
    #[serde(rename = "deleteAccount")]
    DeleteAnyAccount,
    /// Erase only the caller's own account
    #[serde(rename = "deleteOwnAccount")]
    DeleteOwnAccount,
}

impl Capability {
    pub const ALL: [Self; 2] = [Self::DeleteAnyAccount, Self::DeleteOwnAccount];

    /// Capability name as registered by the plugin
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeleteAnyAccount => "deleteAccount",
            Self::DeleteOwnAccount => "deleteOwnAccount",
        }
    }

    /// Fully qualified name the host uses for plugin capabilities (`<plugin>-<name>`)
    #[must_use]
    pub fn qualified_name(self, plugin_name: &str) -> String {
        format!("{plugin_name}-{}", self.as_str())
    }

    /// Human readable description shown in the host's access screens
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::DeleteAnyAccount => "Delete Account",
            Self::DeleteOwnAccount => "Delete Own Account",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown capability: {s}"))
    }
}
