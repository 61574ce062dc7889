//! SQL → Cypher translation: lex + parse SQL into an AST, rewrite it into a
//! Cypher AST honouring the configured table/label and join/relationship-type
//! mappings, then render Cypher text.

pub mod ast;
pub mod config;
pub mod lexer;
pub mod parser;
pub mod pragma;
pub mod render;
pub mod rewrite;

pub use config::{NameCase, TranslatorConfig, TranslatorConfigBuilder};

use crate::error::TranslateError;

/// Translate one SQL statement into Cypher. A `FORCE_CYPHER` pragma anywhere
/// outside a quoted span bypasses translation entirely and returns the input
/// verbatim.
pub fn translate(sql: &str, config: &TranslatorConfig) -> Result<String, TranslateError> {
    if let Some(verbatim) = pragma::force_cypher(sql) {
        return Ok(verbatim.to_string());
    }
    let statement = parser::parse(sql, config.parse_named_param_prefix)?;
    let query = rewrite::statement_to_cypher(&statement, config)?;
    Ok(render::render(&query, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_cypher_pragma_bypasses_translation() {
        let config = TranslatorConfig::default();
        let sql = "/*+ NEO4J FORCE_CYPHER */ MATCH (n) RETURN n";
        assert_eq!(translate(sql, &config).unwrap(), sql);
    }

    #[test]
    fn quoted_pragma_does_not_bypass_translation() {
        let config = TranslatorConfig::default();
        let result = translate("SELECT '/*+ NEO4J FORCE_CYPHER */' FROM t", &config);
        assert!(result.is_ok());
        assert_ne!(result.unwrap(), "SELECT '/*+ NEO4J FORCE_CYPHER */' FROM t");
    }

    #[test]
    fn full_pipeline_translates_a_join() {
        let config = TranslatorConfig::builder()
            .join_columns_to_type_mapping("movie_id,id", "ACTED_IN")
            .build();
        let cypher = translate(
            "SELECT p.name FROM Person p JOIN Movie m ON p.movie_id = m.id",
            &config,
        )
        .unwrap();
        assert_eq!(cypher, "MATCH (p:Person)-[r:ACTED_IN]->(m:Movie) RETURN p.name AS name");
    }

    #[test]
    fn syntax_error_reports_position() {
        let config = TranslatorConfig::default();
        let err = translate("SELECT FROM", &config).unwrap_err();
        assert!(matches!(err, TranslateError::SyntaxError { .. }));
    }
}
