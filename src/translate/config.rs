//! Translator configuration: an immutable, `Arc`-shared bundle built either
//! through the builder directly or from a `s2c.*`-prefixed property map,
//! the same "typed struct built from a generic key/value source" shape used
//! for connection configuration elsewhere in this crate.

use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameCase {
    AsIs,
    Upper,
    Lower,
}

impl NameCase {
    pub fn apply(self, name: &str) -> String {
        match self {
            NameCase::AsIs => name.to_string(),
            NameCase::Upper => name.to_uppercase(),
            NameCase::Lower => name.to_lowercase(),
        }
    }

    fn parse(value: &str) -> Option<NameCase> {
        match value.to_ascii_lowercase().as_str() {
            "asis" | "as_is" => Some(NameCase::AsIs),
            "upper" => Some(NameCase::Upper),
            "lower" => Some(NameCase::Lower),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslatorConfig {
    pub parse_name_case: NameCase,
    pub render_name_case: NameCase,
    pub diagnostic_logging: bool,
    pub table_to_label_mappings: HashMap<String, String>,
    pub join_columns_to_type_mappings: HashMap<String, String>,
    pub sql_dialect: String,
    pub pretty_print: bool,
    pub always_escape_names: Option<bool>,
    pub parse_named_param_prefix: char,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        TranslatorConfig {
            parse_name_case: NameCase::AsIs,
            render_name_case: NameCase::AsIs,
            diagnostic_logging: false,
            table_to_label_mappings: HashMap::new(),
            join_columns_to_type_mappings: HashMap::new(),
            sql_dialect: "standard".to_string(),
            pretty_print: false,
            always_escape_names: None,
            parse_named_param_prefix: ':',
        }
    }
}

impl TranslatorConfig {
    /// Whether a rendered identifier needs back-tick quoting: the explicit
    /// setting if present, otherwise the inverse of `pretty_print`.
    pub fn should_escape_names(&self) -> bool {
        self.always_escape_names.unwrap_or(!self.pretty_print)
    }

    pub fn builder() -> TranslatorConfigBuilder {
        TranslatorConfigBuilder::default()
    }

    /// Parse a `k1:v1;k2:v2` mapping string, the format used by
    /// `table_to_label_mappings`/`join_columns_to_type_mappings`.
    fn parse_mapping(value: &str) -> HashMap<String, String> {
        value
            .split(';')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| pair.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect()
    }

    /// Build a config from a `s2c.*`-prefixed property map: keys are
    /// converted from dash-delimited to camelCase and dispatched to the
    /// matching setter. Unrecognised keys are logged and ignored.
    pub fn from_properties(properties: &HashMap<String, String>) -> TranslatorConfig {
        let mut config = TranslatorConfig::default();
        for (key, value) in properties {
            let Some(suffix) = key.strip_prefix("s2c.") else {
                continue;
            };
            let field = dash_to_camel(suffix);
            match field.as_str() {
                "parseNameCase" => {
                    if let Some(case) = NameCase::parse(value) {
                        config.parse_name_case = case;
                    } else {
                        log::warn!("ignoring unrecognised parseNameCase value '{value}'");
                    }
                }
                "renderNameCase" => {
                    if let Some(case) = NameCase::parse(value) {
                        config.render_name_case = case;
                    } else {
                        log::warn!("ignoring unrecognised renderNameCase value '{value}'");
                    }
                }
                "diagnosticLogging" => config.diagnostic_logging = value.eq_ignore_ascii_case("true"),
                "tableToLabelMappings" => {
                    config.table_to_label_mappings = TranslatorConfig::parse_mapping(value)
                }
                "joinColumnsToTypeMappings" => {
                    config.join_columns_to_type_mappings = TranslatorConfig::parse_mapping(value)
                }
                "sqlDialect" => config.sql_dialect = value.clone(),
                "prettyPrint" => config.pretty_print = value.eq_ignore_ascii_case("true"),
                "alwaysEscapeNames" => {
                    config.always_escape_names = match value.to_ascii_lowercase().as_str() {
                        "true" => Some(true),
                        "false" => Some(false),
                        "auto" => None,
                        other => {
                            log::warn!("ignoring unrecognised alwaysEscapeNames value '{other}'");
                            config.always_escape_names
                        }
                    }
                }
                "parseNamedParamPrefix" => {
                    if let Some(c) = value.chars().next() {
                        config.parse_named_param_prefix = c;
                    }
                }
                other => log::warn!("ignoring unrecognised translator property 's2c.{other}'"),
            }
        }
        if config.diagnostic_logging {
            log::info!("translator configuration: {config:?}");
        }
        config
    }
}

fn dash_to_camel(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = false;
    for c in s.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Debug, Default)]
pub struct TranslatorConfigBuilder {
    config: TranslatorConfig,
}

impl TranslatorConfigBuilder {
    pub fn parse_name_case(mut self, case: NameCase) -> Self {
        self.config.parse_name_case = case;
        self
    }

    pub fn render_name_case(mut self, case: NameCase) -> Self {
        self.config.render_name_case = case;
        self
    }

    pub fn table_to_label_mapping(mut self, table: impl Into<String>, label: impl Into<String>) -> Self {
        self.config
            .table_to_label_mappings
            .insert(table.into(), label.into());
        self
    }

    pub fn join_columns_to_type_mapping(
        mut self,
        fk_pk: impl Into<String>,
        rel_type: impl Into<String>,
    ) -> Self {
        self.config
            .join_columns_to_type_mappings
            .insert(fk_pk.into(), rel_type.into());
        self
    }

    pub fn pretty_print(mut self, pretty: bool) -> Self {
        self.config.pretty_print = pretty;
        self
    }

    pub fn always_escape_names(mut self, value: bool) -> Self {
        self.config.always_escape_names = Some(value);
        self
    }

    pub fn build(self) -> Arc<TranslatorConfig> {
        Arc::new(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_properties_parses_mappings() {
        let mut props = HashMap::new();
        props.insert(
            "s2c.table-to-label-mappings".to_string(),
            "Person:Human;Movie:Film".to_string(),
        );
        props.insert("s2c.render-name-case".to_string(), "upper".to_string());
        props.insert("s2c.unknown-key".to_string(), "ignored".to_string());
        let config = TranslatorConfig::from_properties(&props);
        assert_eq!(
            config.table_to_label_mappings.get("Person"),
            Some(&"Human".to_string())
        );
        assert_eq!(config.render_name_case, NameCase::Upper);
    }

    #[test]
    fn always_escape_names_defaults_to_inverse_of_pretty_print() {
        let config = TranslatorConfig::builder().pretty_print(true).build();
        assert!(!config.should_escape_names());
        let config = TranslatorConfig::builder().pretty_print(false).build();
        assert!(config.should_escape_names());
    }
}
