//! Article synonym (URL slug) validation.

use once_cell::sync::Lazy;
use regex::Regex;

// Lower-case alphanumerics and hyphens only; no leading or trailing hyphen.
static SYNONYM_REGEX: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[a-z0-9][a-z0-9-]*[a-z0-9]$").unwrap()
});

/// Check whether a string is usable as an article synonym.
///
/// Synonyms appear in article URLs, so only lower-case alphabets, digits,
/// and hyphens are allowed, and a synonym cannot start or end with a hyphen.
#[must_use]
pub fn is_valid_synonym(s: &str) -> bool {
    SYNONYM_REGEX.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_slugs() {
        assert!(is_valid_synonym("my-first-post"));
        assert!(is_valid_synonym("2024-review"));
        assert!(is_valid_synonym("ab"));
    }

    #[test]
    fn test_rejects_bad_slugs() {
        assert!(!is_valid_synonym(""));
        assert!(!is_valid_synonym("a"));
        assert!(!is_valid_synonym("-leading"));
        assert!(!is_valid_synonym("trailing-"));
        assert!(!is_valid_synonym("Upper-Case"));
        assert!(!is_valid_synonym("with space"));
        assert!(!is_valid_synonym("под-заголовок"));
    }
}
