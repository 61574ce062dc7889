//! Cypher AST → text. Honours `render_name_case` (already applied during
//! rewrite for columns/labels) and `always_escape_names`/`pretty_print` for
//! identifier quoting.

use super::ast::*;
use super::config::TranslatorConfig;
use util::validators::BARE_IDENTIFIER;

pub fn render(query: &CypherQuery, config: &TranslatorConfig) -> String {
    let mut parts = Vec::new();

    if !query.patterns.is_empty() {
        let patterns: Vec<String> = query.patterns.iter().map(|p| render_pattern(p, config)).collect();
        parts.push(format!("MATCH {}", patterns.join(", ")));
    }

    if let Some(predicate) = &query.where_clause {
        parts.push(format!("WHERE {}", render_predicate(predicate, config)));
    }

    if let Some(write) = &query.write {
        parts.push(render_write(write, config));
    }

    if !query.return_items.is_empty() {
        let items: Vec<String> = query
            .return_items
            .iter()
            .map(|item| render_return_item(item, config))
            .collect();
        parts.push(format!("RETURN {}", items.join(", ")));
    }

    if !query.order_by.is_empty() {
        let items: Vec<String> = query
            .order_by
            .iter()
            .map(|o| {
                let expr = render_expr(&o.expr, config);
                if o.descending {
                    format!("{expr} DESC")
                } else {
                    expr
                }
            })
            .collect();
        parts.push(format!("ORDER BY {}", items.join(", ")));
    }

    if let Some(skip) = &query.skip {
        parts.push(format!("SKIP {}", render_expr(skip, config)));
    }
    if let Some(limit) = &query.limit {
        parts.push(format!("LIMIT {}", render_expr(limit, config)));
    }

    let separator = if config.pretty_print { "\n" } else { " " };
    parts.join(separator)
}

fn escape_name(name: &str, config: &TranslatorConfig) -> String {
    if config.should_escape_names() && !BARE_IDENTIFIER.is_match(name) {
        format!("`{name}`")
    } else {
        name.to_string()
    }
}

fn render_pattern(path: &PatternPath, config: &TranslatorConfig) -> String {
    let mut s = format!(
        "({}:{})",
        path.start.variable,
        escape_name(&path.start.label, config)
    );
    for step in &path.steps {
        let rel = format!(
            "[{}:{}]",
            step.rel.variable,
            escape_name(&step.rel.rel_type, config)
        );
        let node = format!("({}:{})", step.node.variable, escape_name(&step.node.label, config));
        match step.rel.direction {
            Direction::Right => s.push_str(&format!("-{rel}->{node}")),
            Direction::Left => s.push_str(&format!("<-{rel}-{node}")),
        }
    }
    s
}

fn render_write(write: &WriteClause, config: &TranslatorConfig) -> String {
    match write {
        WriteClause::Create {
            variable,
            label,
            properties,
        } => {
            let props: Vec<String> = properties
                .iter()
                .map(|(name, expr)| format!("{}: {}", escape_name(name, config), render_expr(expr, config)))
                .collect();
            if props.is_empty() {
                format!("CREATE ({variable}:{})", escape_name(label, config))
            } else {
                format!(
                    "CREATE ({variable}:{} {{{}}})",
                    escape_name(label, config),
                    props.join(", ")
                )
            }
        }
        WriteClause::Set {
            variable,
            assignments,
        } => {
            let items: Vec<String> = assignments
                .iter()
                .map(|(name, expr)| {
                    format!(
                        "{variable}.{} = {}",
                        escape_name(name, config),
                        render_expr(expr, config)
                    )
                })
                .collect();
            format!("SET {}", items.join(", "))
        }
        WriteClause::Delete { variable } => format!("DELETE {variable}"),
    }
}

fn render_return_item(item: &ReturnItem, config: &TranslatorConfig) -> String {
    let expr = render_expr(&item.expr, config);
    match &item.alias {
        Some(alias) => format!("{expr} AS {}", escape_name(alias, config)),
        None => expr,
    }
}

fn render_expr(expr: &Expr, config: &TranslatorConfig) -> String {
    match expr {
        Expr::Column(c) => match &c.table {
            Some(table) if c.name == "*" => table.to_string(),
            Some(table) => format!("{table}.{}", escape_name(&c.name, config)),
            None => escape_name(&c.name, config),
        },
        Expr::Literal(lit) => render_literal(lit),
        Expr::Parameter(Parameter::Positional(n)) => format!("${n}"),
        Expr::Parameter(Parameter::Named(name)) => format!("${name}"),
    }
}

fn render_literal(literal: &Literal) -> String {
    match literal {
        Literal::Integer(i) => i.to_string(),
        Literal::Float(f) => f.to_string(),
        Literal::String(s) => format!("'{}'", s.replace('\'', "\\'")),
        Literal::Boolean(b) => b.to_string(),
        Literal::Null => "null".to_string(),
    }
}

fn render_predicate(predicate: &Predicate, config: &TranslatorConfig) -> String {
    match predicate {
        Predicate::Compare { left, op, right } => format!(
            "{} {} {}",
            render_expr(left, config),
            op.as_cypher(),
            render_expr(right, config)
        ),
        Predicate::And(l, r) => format!(
            "{} AND {}",
            render_predicate(l, config),
            render_predicate(r, config)
        ),
        Predicate::Or(l, r) => format!(
            "({} OR {})",
            render_predicate(l, config),
            render_predicate(r, config)
        ),
        Predicate::Not(p) => format!("NOT {}", render_predicate(p, config)),
        Predicate::IsNull { expr, negated } => {
            let expr = render_expr(expr, config);
            if *negated {
                format!("{expr} IS NOT NULL")
            } else {
                format!("{expr} IS NULL")
            }
        }
        Predicate::Like {
            expr,
            pattern,
            negated,
        } => {
            let regex = like_regex_literal(pattern);
            let op = if *negated { "NOT " } else { "" };
            format!("{op}{} =~ {regex}", render_expr(expr, config))
        }
        Predicate::Between {
            expr,
            low,
            high,
            negated,
        } => {
            let base = format!(
                "{} >= {} AND {} <= {}",
                render_expr(expr, config),
                render_expr(low, config),
                render_expr(expr, config),
                render_expr(high, config)
            );
            if *negated {
                format!("NOT ({base})")
            } else {
                base
            }
        }
        Predicate::InList {
            expr,
            list,
            negated,
        } => {
            let items: Vec<String> = list.iter().map(|e| render_expr(e, config)).collect();
            let op = if *negated { "NOT " } else { "" };
            format!("{op}{} IN [{}]", render_expr(expr, config), items.join(", "))
        }
        Predicate::InSubquery {
            expr,
            subquery,
            negated,
        } => {
            let op = if *negated { "NOT " } else { "" };
            let nested = super::rewrite::subquery_to_cypher(subquery, config)
                .map(|query| render(&query, config))
                .unwrap_or_default();
            format!("{op}{} IN COLLECT {{ {nested} }}", render_expr(expr, config))
        }
    }
}

fn like_regex_literal(pattern: &Expr) -> String {
    match pattern {
        Expr::Literal(Literal::String(s)) => {
            format!("'{}'", util::validators::like_pattern_to_regex(s).replace('\'', "\\'"))
        }
        other => render_expr(other, &TranslatorConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::parser::parse;
    use crate::translate::rewrite::statement_to_cypher;

    fn translate(sql: &str, config: &TranslatorConfig) -> String {
        let stmt = parse(sql, config.parse_named_param_prefix).unwrap();
        let query = statement_to_cypher(&stmt, config).unwrap();
        render(&query, config)
    }

    #[test]
    fn simple_select_renders() {
        let config = TranslatorConfig::default();
        assert_eq!(
            translate("SELECT p.name FROM Person p", &config),
            "MATCH (p:Person) RETURN p.name AS name"
        );
    }

    #[test]
    fn join_renders_relationship_pattern() {
        let config = TranslatorConfig::builder()
            .join_columns_to_type_mapping("movie_id,id", "ACTED_IN")
            .build();
        assert_eq!(
            translate(
                "SELECT p.name FROM Person p JOIN Movie m ON p.movie_id = m.id",
                &config
            ),
            "MATCH (p:Person)-[r:ACTED_IN]->(m:Movie) RETURN p.name AS name"
        );
    }

    #[test]
    fn insert_renders_create() {
        let config = TranslatorConfig::default();
        assert_eq!(
            translate("INSERT INTO Person (name) VALUES ('Ada')", &config),
            "CREATE (p:Person {name: 'Ada'})"
        );
    }

    #[test]
    fn in_subquery_renders_as_collect_expression() {
        let config = TranslatorConfig::default();
        assert_eq!(
            translate(
                "SELECT p.name FROM Person p WHERE p.id IN (SELECT m.person_id FROM Membership m)",
                &config
            ),
            "MATCH (p:Person) WHERE p.id IN COLLECT { MATCH (m:Membership) RETURN m.person_id AS person_id } RETURN p.name AS name"
        );
    }
}
