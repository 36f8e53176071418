//! Log sanitization utilities
//!
//! Erasure logs must not re-publish the personal data being erased, so emails
//! and external identities are masked before they reach a log line.

/// Number of leading characters kept visible in masked values.
const VISIBLE_PREFIX: usize = 1;

fn mask_segment(s: &str) -> String {
    let visible: String = s.chars().take(VISIBLE_PREFIX).collect();
    if s.chars().count() <= VISIBLE_PREFIX {
        "***".to_string()
    } else {
        format!("{visible}***")
    }
}

/// Mask the local part of an email address.
///
/// `jdoe@example.com` becomes `j***@example.com`. Values without `@` are masked entirely.
pub fn mask_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{domain}", mask_segment(local)),
        None => mask_segment(email),
    }
}

/// Mask the identity part of an external id key, keeping the scheme.
///
/// `mailto:jdoe@example.com` becomes `mailto:j***`.
pub fn mask_external_id(key: &str) -> String {
    match key.split_once(':') {
        Some((scheme, identity)) => format!("{scheme}:{}", mask_segment(identity)),
        None => mask_segment(key),
    }
}
