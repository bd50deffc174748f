use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Pre-mutation validation failures. These are caught before any local
/// or remote state change and surfaced synchronously to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing mandatory field: {0}")]
    MissingField(&'static str),

    #[error("malformed email address: {0}")]
    MalformedEmail(String),
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

/// Check the shape of an email address. Intentionally loose — it rejects
/// obviously broken input, not every RFC violation.
pub fn check_email(email: &str) -> Result<(), ValidationError> {
    if email_regex().is_match(email.trim()) {
        Ok(())
    } else {
        Err(ValidationError::MalformedEmail(email.to_string()))
    }
}
