//! Request gating rules, expressed as pure decisions over request facts.
//!
//! Frontends extract method, URI, session state and cookies from their HTTP
//! framework and act on the returned decision.

mod login_redirect;
pub mod x_auth;

pub use login_redirect::{
    LoginRedirect, RedirectDecision, REDIRECT_COOKIE, REDIRECT_COOKIE_TTL_SECS,
};
pub use x_auth::{GateDecision, SessionInfo};
