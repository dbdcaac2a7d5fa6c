//! Local form validation.
//!
//! Runs before any request is built; a form with field errors never reaches
//! the network. Field names in `FieldErrors` are the form control names the
//! pages expose.

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;

use std::collections::BTreeMap;

/// Verification and reset codes are exactly this many ASCII digits.
pub const CODE_LEN: usize = 6;
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("This field is required")]
    Required,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter the 6-digit code")]
    InvalidCode,
    #[error("Password must be at least {0} characters")]
    TooShort(usize),
    #[error("Passwords do not match")]
    Mismatch,
}

/// Inline errors keyed by form control name.
pub type FieldErrors = BTreeMap<&'static str, FieldError>;

/// Non-blank value, trimmed.
///
/// # Errors
///
/// `FieldError::Required` when the value is empty or whitespace.
pub fn required(value: &str) -> Result<&str, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() { Err(FieldError::Required) } else { Ok(trimmed) }
}

/// Required, syntactically valid email address, trimmed.
///
/// # Errors
///
/// `Required` when blank, `InvalidEmail` when malformed.
pub fn email(value: &str) -> Result<&str, FieldError> {
    let trimmed = required(value)?;
    if is_valid_email(trimmed) { Ok(trimmed) } else { Err(FieldError::InvalidEmail) }
}

#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    let local_ok = !local.is_empty()
        && local.len() <= 64
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~.-".contains(c))
        && !local.starts_with('.')
        && !local.ends_with('.');
    let domain_ok = !domain.is_empty()
        && domain.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
    local_ok && domain_ok
}

/// Exactly six ASCII digits, nothing else.
///
/// # Errors
///
/// `Required` when empty, `InvalidCode` otherwise.
pub fn code(value: &str) -> Result<&str, FieldError> {
    if value.is_empty() {
        return Err(FieldError::Required);
    }
    if value.len() == CODE_LEN && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(value)
    } else {
        Err(FieldError::InvalidCode)
    }
}

/// Password of at least `min_len` characters (not trimmed).
///
/// # Errors
///
/// `Required` when empty, `TooShort` when under `min_len`.
pub fn password(value: &str, min_len: usize) -> Result<&str, FieldError> {
    if value.is_empty() {
        return Err(FieldError::Required);
    }
    if value.chars().count() < min_len {
        return Err(FieldError::TooShort(min_len));
    }
    Ok(value)
}

/// Confirmation field must equal the password.
///
/// # Errors
///
/// `Required` when the confirmation is empty, `Mismatch` when it differs.
pub fn confirmation(password: &str, confirm: &str) -> Result<(), FieldError> {
    if confirm.is_empty() {
        return Err(FieldError::Required);
    }
    if password == confirm { Ok(()) } else { Err(FieldError::Mismatch) }
}

/// Keep only digits from typed code input, capped at `CODE_LEN`.
#[must_use]
pub fn sanitize_code_input(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).take(CODE_LEN).collect()
}

/// Record `result`'s error (if any) under `field`; returns the ok value.
pub(crate) fn check<'a>(errors: &mut FieldErrors, field: &'static str, result: Result<&'a str, FieldError>) -> Option<&'a str> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            errors.insert(field, e);
            None
        }
    }
}
