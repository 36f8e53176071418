//! Send anonymous visitors of the plugin page through login and back

use url::Url;

use crate::error::{AppError, AppResult};

/// Cookie holding the URI to return to after login
pub const REDIRECT_COOKIE: &str = "account_login_redirect";
/// Lifetime of [`REDIRECT_COOKIE`] in seconds
pub const REDIRECT_COOKIE_TTL_SECS: u32 = 300;

/// Outcome of [`LoginRedirect::decide`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectDecision {
    /// Redirect to `url` and clear the cookie
    ReturnTo { url: String },
    /// Store `remember` in the cookie for `ttl_secs` and redirect to `login_url`
    StartLogin {
        login_url: String,
        remember: String,
        ttl_secs: u32,
    },
    /// Continue with the request
    PassThrough,
}

/// Login redirect rules for one plugin installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    canonical_url: String,
    plugin_path: String,
}

impl LoginRedirect {
    /// `plugin_url` must be an absolute URL; only its path is matched against requests.
    pub fn new(canonical_url: impl Into<String>, plugin_url: &str) -> AppResult<Self> {
        let plugin_path = Url::parse(plugin_url)
            .map_err(|e| {
                AppError::InvalidConfig(format!("Plugin has an invalid canonical URL {plugin_url}: {e}"))
            })?
            .path()
            .to_string();
        Ok(Self {
            canonical_url: canonical_url.into(),
            plugin_path,
        })
    }

    #[must_use]
    pub fn plugin_path(&self) -> &str {
        &self.plugin_path
    }

    #[must_use]
    pub fn login_url(&self) -> String {
        format!("{}login", self.canonical_url)
    }

    /// Turn a stored return path into a URL on this site
    ///
    /// Values already under the canonical URL are kept, relative paths are joined
    /// onto it, and absolute URLs pointing elsewhere are dropped.
    #[must_use]
    pub fn resolve(&self, stored: &str) -> Option<String> {
        if stored.starts_with(&self.canonical_url) {
            return Some(stored.to_string());
        }
        if !stored.starts_with("http") {
            let relative = stored.strip_prefix('/').unwrap_or(stored);
            return Some(format!("{}{relative}", self.canonical_url));
        }
        None
    }

    /// Decide how to handle a request
    ///
    /// `stored` is the current value of [`REDIRECT_COOKIE`], if any.
    #[must_use]
    pub fn decide(
        &self,
        request_uri: &str,
        signed_in: bool,
        stored: Option<&str>,
    ) -> RedirectDecision {
        if signed_in {
            if let Some(url) = stored.and_then(|s| self.resolve(s)) {
                return RedirectDecision::ReturnTo { url };
            }
        } else if request_uri.starts_with(&self.plugin_path) {
            return RedirectDecision::StartLogin {
                login_url: self.login_url(),
                remember: request_uri.to_string(),
                ttl_secs: REDIRECT_COOKIE_TTL_SECS,
            };
        }
        RedirectDecision::PassThrough
    }
}
