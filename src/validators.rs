//! Field validators for registration and login input.

use std::borrow::Cow;
use validator::ValidateEmail;

use crate::auth::MAX_PASSWORD_BYTES;
use crate::config::ValidationConfig;

pub const MAX_NAME_CHARS: usize = 100;

pub const MSG_NAME_EMPTY: &str = "Name is Empty.";
pub const MSG_NAME_INVALID_CHARS: &str = "Invalid Characters in Name.";
pub const MSG_NAME_TOO_LONG: &str = "Name is too long.";
pub const MSG_INVALID_EMAIL: &str = "Invalid Email.";
pub const MSG_PASSWORD_EMPTY: &str = "Password cannot be empty.";
pub const MSG_PASSWORD_TOO_LONG: &str = "Password is too long.";

/// Which characters a display name may contain.
///
/// Letters (any script) and spaces are always allowed; deployments can
/// permit a few more, e.g. `-'.` for hyphenated or abbreviated names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamePolicy {
    extra: Vec<char>,
}

impl NamePolicy {
    pub fn new(extra: impl IntoIterator<Item = char>) -> Self {
        let mut extra: Vec<char> = extra.into_iter().filter(|c| !c.is_control()).collect();
        extra.sort_unstable();
        extra.dedup();
        Self { extra }
    }

    pub fn from_config(config: &ValidationConfig) -> Self {
        Self::new(config.name_extra_chars.chars())
    }

    pub fn allows(&self, c: char) -> bool {
        c.is_alphabetic() || c == ' ' || self.extra.binary_search(&c).is_ok()
    }

    pub fn is_valid(&self, name: &str) -> bool {
        !name.is_empty() && name.chars().all(|c| self.allows(c))
    }
}

pub fn is_empty(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn is_email(value: &str) -> bool {
    !value.is_empty() && Cow::Borrowed(value).validate_email()
}

/// Trimmed, lowercased form used as the storage key
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Check a display name, appending any problems to `errors`
pub fn check_name(name: &str, policy: &NamePolicy, errors: &mut Vec<String>) {
    if is_empty(name) {
        errors.push(MSG_NAME_EMPTY.to_string());
        return;
    }
    if !policy.is_valid(name) {
        errors.push(MSG_NAME_INVALID_CHARS.to_string());
    }
    if name.chars().count() > MAX_NAME_CHARS {
        errors.push(MSG_NAME_TOO_LONG.to_string());
    }
}

pub fn check_email(email: &str, errors: &mut Vec<String>) {
    if !is_email(email) {
        errors.push(MSG_INVALID_EMAIL.to_string());
    }
}

pub fn check_password(password: &str, errors: &mut Vec<String>) {
    if is_empty(password) {
        errors.push(MSG_PASSWORD_EMPTY.to_string());
    } else if password.len() > MAX_PASSWORD_BYTES {
        errors.push(MSG_PASSWORD_TOO_LONG.to_string());
    }
}
