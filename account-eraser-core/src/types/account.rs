//! Account identity and the personal data attached to an account

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Numeric account identifier
///
/// Always positive: the host never hands out account id `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct AccountId(u32);

impl AccountId {
    /// Create an account id, rejecting zero
    #[must_use]
    pub fn new(id: u32) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    /// Raw numeric value
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for AccountId {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("invalid account id: {value}"))
    }
}

impl From<AccountId> for u32 {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl FromStr for AccountId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| CoreError::InvalidAccountId(s.to_string()))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The caller on whose behalf an operation runs
///
/// `account_id` is `None` when the caller's identity could not be mapped to an
/// account (anonymous or internal users). Such a caller is never "self".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Principal {
    pub account_id: Option<AccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Principal {
    /// Principal bound to an account
    #[must_use]
    pub fn account(account_id: AccountId) -> Self {
        Self {
            account_id: Some(account_id),
            username: None,
        }
    }

    /// Principal that does not resolve to any account
    #[must_use]
    pub fn unresolved() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Whether `target` is the principal's own account
    #[must_use]
    pub fn is_self(&self, target: AccountId) -> bool {
        self.account_id == Some(target)
    }
}

/// SSH public key registered on an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshKey {
    /// Sequence number, the key's handle for deletion
    pub seq: u32,
    pub ssh_public_key: String,
    /// Keys the host failed to parse are kept but flagged invalid
    pub valid: bool,
}

/// GPG public key registered on an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpgKey {
    /// Short key id, the key's handle for deletion
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_ids: Vec<String>,
}

/// Scheme part of an external identifier key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExternalIdScheme {
    /// `username:` binds the login name
    Username,
    /// `uuid:` binds the account's internal uuid
    Uuid,
    /// `gerrit:` binds the host-internal identity
    Gerrit,
    /// Linked identities (`mailto`, `google-oauth`, `ldap`, ...) or a key without scheme
    Other(String),
}

impl ExternalIdScheme {
    pub const USERNAME: &'static str = "username";
    pub const UUID: &'static str = "uuid";
    pub const GERRIT: &'static str = "gerrit";

    /// Parse the scheme from a `scheme:identity` key
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key.split_once(':') {
            Some((Self::USERNAME, _)) => Self::Username,
            Some((Self::UUID, _)) => Self::Uuid,
            Some((Self::GERRIT, _)) => Self::Gerrit,
            Some((other, _)) => Self::Other(other.to_string()),
            None => Self::Other(String::new()),
        }
    }

    /// Structural schemes hold the account record together and must survive erasure
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Username | Self::Uuid | Self::Gerrit)
    }
}

/// Identity binding of the form `scheme:identity`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalId {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ExternalId {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            email: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn scheme(&self) -> ExternalIdScheme {
        ExternalIdScheme::from_key(&self.key)
    }

    #[must_use]
    pub fn is_structural(&self) -> bool {
        self.scheme().is_structural()
    }
}
