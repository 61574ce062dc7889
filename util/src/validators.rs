use regex::Regex;
use std::sync::LazyLock;

/// A bare SQL/Cypher identifier: starts with a letter or underscore, then
/// letters, digits, or underscores. Used to decide whether a rendered name
/// needs back-tick quoting.
pub static BARE_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Failed to parse an internal regex!")
});

/// Translate a SQL `LIKE` pattern into an anchored Cypher regex (for `=~`).
/// `%` becomes `.*`, `_` becomes `.`, everything else is escaped literally.
pub fn like_pattern_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('^');
    for c in pattern.chars() {
        match c {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_identifier_accepts_plain_names() {
        assert!(BARE_IDENTIFIER.is_match("person"));
        assert!(BARE_IDENTIFIER.is_match("_internal"));
        assert!(!BARE_IDENTIFIER.is_match("2cool"));
        assert!(!BARE_IDENTIFIER.is_match("has space"));
    }

    #[test]
    fn like_pattern_translates_wildcards() {
        assert_eq!(like_pattern_to_regex("A%B_"), "^A.*B.$");
        assert_eq!(like_pattern_to_regex("a.b"), "^a\\.b$");
    }
}
