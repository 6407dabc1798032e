//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation logic so every resource enforces the same invariants.

use sha2::{Digest, Sha256};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, ResultEngine};

/// Trim a display name and reject it when nothing is left.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Comparison key for names: accents stripped, lowercase, punctuation and
/// whitespace runs collapsed to one space.
pub(crate) fn normalize_name_key(display: &str, label: &str) -> ResultEngine<String> {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in display.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    let normalized = out.trim_end();
    if normalized.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must contain letters or digits"
        )));
    }
    Ok(normalized.to_string())
}

pub(crate) fn hash_password(username: &str, password: &str) -> String {
    let digest = Sha256::digest(format!("{username}:{password}").as_bytes());
    format!("{digest:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_name_is_trimmed() {
        assert_eq!(
            normalize_required_name("  Groceries ", "category").unwrap(),
            "Groceries"
        );
        assert_eq!(
            normalize_required_name("   ", "place"),
            Err(EngineError::InvalidName(
                "place name must not be empty".to_string()
            ))
        );
    }

    #[test]
    fn name_key_ignores_case_accents_and_spacing() {
        assert_eq!(
            normalize_name_key("Café  Central", "place").unwrap(),
            "cafe central"
        );
        assert_eq!(
            normalize_name_key("cafe-central!", "place").unwrap(),
            "cafe central"
        );
        assert!(normalize_name_key("--", "place").is_err());
    }

    #[test]
    fn password_hash_depends_on_username() {
        assert_eq!(hash_password("alice", "pw"), hash_password("alice", "pw"));
        assert_ne!(hash_password("alice", "pw"), hash_password("bob", "pw"));
        assert_eq!(hash_password("alice", "pw").len(), 64);
    }
}
