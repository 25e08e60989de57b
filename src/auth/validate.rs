use lazy_static::lazy_static;
use regex::Regex;

pub const MIN_FULL_NAME_LEN: usize = 2;
pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        // ASCII word characters only
        static ref EMAIL_RE: Regex =
            Regex::new(r"(?-u)^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Returns the trimmed name or a user-facing reason.
pub(crate) fn full_name(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err("Full name is required".into());
    }
    if name.chars().count() < MIN_FULL_NAME_LEN {
        return Err("Full name must be at least 2 characters long".into());
    }
    Ok(name.to_string())
}

/// Returns the normalized email or a user-facing reason.
pub(crate) fn email(raw: &str) -> Result<String, String> {
    let email = normalize_email(raw);
    if email.is_empty() {
        return Err("Email is required".into());
    }
    if !is_valid_email(&email) {
        return Err("Please enter a valid email".into());
    }
    Ok(email)
}

pub(crate) fn password(raw: &str) -> Result<(), String> {
    if raw.is_empty() {
        return Err("Password is required".into());
    }
    if raw.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 6 characters long".into());
    }
    Ok(())
}
