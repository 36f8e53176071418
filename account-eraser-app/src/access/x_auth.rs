//! X-Auth gate for the two REST endpoints the account page calls
//!
//! `GET …/a/accounts/self` and `DELETE …/a/accounts/self/account~` are only
//! served to signed-in browser sessions that carry an `X-Gerrit-Auth` token.

/// Request URI suffix of the account lookup endpoint
pub const ALLOWED_GET_URI_SUFFIX: &str = "/a/accounts/self";
/// Request URI suffix of the self-delete endpoint
pub const ALLOWED_DELETE_URI_SUFFIX: &str = "/a/accounts/self/account~";

/// Session facts the gate looks at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionInfo {
    pub signed_in: bool,
    pub x_gerrit_auth: Option<String>,
    pub username: Option<String>,
}

/// What to do with the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Not a gated request, or gated but nothing to grant
    PassThrough,
    /// Enable REST API access for the session, then continue
    GrantRestApi { username: String },
    /// Reply 403
    Forbidden,
}

/// Whether `method uri` is one of the gated endpoints
#[must_use]
pub fn is_gated(method: &str, uri: &str) -> bool {
    (method == "GET" && uri.ends_with(ALLOWED_GET_URI_SUFFIX))
        || (method == "DELETE" && uri.ends_with(ALLOWED_DELETE_URI_SUFFIX))
}

/// Decide how to handle a request
///
/// `session` is `None` when the request carries no web session at all.
#[must_use]
pub fn check(method: &str, uri: &str, session: Option<&SessionInfo>) -> GateDecision {
    if !is_gated(method, uri) {
        return GateDecision::PassThrough;
    }

    match session {
        Some(s) if s.signed_in && s.x_gerrit_auth.is_some() => match s.username {
            Some(ref username) => {
                log::info!("REST API URI {uri} allowed for user {username}");
                GateDecision::GrantRestApi {
                    username: username.clone(),
                }
            }
            None => GateDecision::PassThrough,
        },
        _ => {
            log::debug!("Refusing {method} {uri}: no signed-in session with X-Gerrit-Auth");
            GateDecision::Forbidden
        }
    }
}
