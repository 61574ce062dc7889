//! `FORCE_CYPHER` pragma detection: a small quote-state scanner, the same
//! family of hand-rolled lexical scanner as the rest of the translator
//! rather than a backtracking regex, since the only thing that needs
//! tracking is whether we're currently inside a matched quoted span.

const PRAGMA: &str = "/*+ NEO4J FORCE_CYPHER */";

#[derive(Clone, Copy, PartialEq)]
enum Quote {
    None,
    Single,
    Double,
    Backtick,
}

/// If `sql` contains the `FORCE_CYPHER` pragma outside any quoted span,
/// return it unchanged; otherwise `None` so the
/// caller proceeds to the normal lex/parse/rewrite/render pipeline.
pub fn force_cypher(sql: &str) -> Option<&str> {
    let mut state = Quote::None;
    for (i, c) in sql.char_indices() {
        state = match (state, c) {
            (Quote::None, '\'') => Quote::Single,
            (Quote::None, '"') => Quote::Double,
            (Quote::None, '`') => Quote::Backtick,
            (Quote::Single, '\'') => Quote::None,
            (Quote::Double, '"') => Quote::None,
            (Quote::Backtick, '`') => Quote::None,
            (s, _) => s,
        };
        if state == Quote::None && sql[i..].starts_with(PRAGMA) {
            return Some(sql);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pragma_outside_quotes_is_detected() {
        let sql = "/*+ NEO4J FORCE_CYPHER */ MATCH (n) RETURN n";
        assert_eq!(force_cypher(sql), Some(sql));
    }

    #[test]
    fn pragma_inside_quotes_is_not_detected() {
        let sql = "SELECT '/*+ NEO4J FORCE_CYPHER */' FROM t";
        assert_eq!(force_cypher(sql), None);
    }

    #[test]
    fn pragma_after_closed_quote_is_detected() {
        let sql = "SELECT 'x' FROM t /*+ NEO4J FORCE_CYPHER */";
        assert!(force_cypher(sql).is_some());
    }
}
