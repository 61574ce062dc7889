//! SQL AST → Cypher AST: table→label, column→property, join→relationship
//! pattern, projection→RETURN, predicate translation, and the INSERT/
//! UPDATE/DELETE → CREATE/SET/DELETE mapping.

use super::ast::*;
use super::config::TranslatorConfig;
use crate::error::TranslateError;

fn label_for(table: &TableRef, config: &TranslatorConfig) -> String {
    match config.table_to_label_mappings.get(&table.name) {
        Some(label) => label.clone(),
        None => config.render_name_case.apply(&table.name),
    }
}

/// `fk,pk` exact-key lookup, falling back to the upper-cased foreign-key
/// column name with a trailing `_ID`/`_id` suffix stripped.
fn relationship_type_for(join: &Join, config: &TranslatorConfig) -> String {
    let key = format!("{},{}", join.left.name, join.right.name);
    if let Some(rel_type) = config.join_columns_to_type_mappings.get(&key) {
        return rel_type.clone();
    }
    let fk = if join.left.table.as_deref() != Some(join.table.variable().as_str()) {
        &join.left.name
    } else {
        &join.right.name
    };
    let stripped = fk
        .strip_suffix("_id")
        .or_else(|| fk.strip_suffix("_ID"))
        .unwrap_or(fk);
    stripped.to_uppercase()
}

fn rewrite_column(column: &ColumnRef, config: &TranslatorConfig) -> Expr {
    Expr::Column(ColumnRef {
        table: column.table.clone(),
        name: config.render_name_case.apply(&column.name),
    })
}

fn rewrite_expr(expr: &Expr, config: &TranslatorConfig) -> Expr {
    match expr {
        Expr::Column(c) => rewrite_column(c, config),
        other => other.clone(),
    }
}

fn rewrite_predicate(predicate: &Predicate, config: &TranslatorConfig) -> Predicate {
    match predicate {
        Predicate::Compare { left, op, right } => Predicate::Compare {
            left: rewrite_expr(left, config),
            op: *op,
            right: rewrite_expr(right, config),
        },
        Predicate::And(l, r) => Predicate::And(
            Box::new(rewrite_predicate(l, config)),
            Box::new(rewrite_predicate(r, config)),
        ),
        Predicate::Or(l, r) => Predicate::Or(
            Box::new(rewrite_predicate(l, config)),
            Box::new(rewrite_predicate(r, config)),
        ),
        Predicate::Not(p) => Predicate::Not(Box::new(rewrite_predicate(p, config))),
        Predicate::IsNull { expr, negated } => Predicate::IsNull {
            expr: rewrite_expr(expr, config),
            negated: *negated,
        },
        Predicate::Like {
            expr,
            pattern,
            negated,
        } => Predicate::Like {
            expr: rewrite_expr(expr, config),
            pattern: rewrite_expr(pattern, config),
            negated: *negated,
        },
        Predicate::Between {
            expr,
            low,
            high,
            negated,
        } => Predicate::Between {
            expr: rewrite_expr(expr, config),
            low: rewrite_expr(low, config),
            high: rewrite_expr(high, config),
            negated: *negated,
        },
        Predicate::InList {
            expr,
            list,
            negated,
        } => Predicate::InList {
            expr: rewrite_expr(expr, config),
            list: list.iter().map(|e| rewrite_expr(e, config)).collect(),
            negated: *negated,
        },
        Predicate::InSubquery {
            expr,
            subquery,
            negated,
        } => Predicate::InSubquery {
            expr: rewrite_expr(expr, config),
            subquery: subquery.clone(),
            negated: *negated,
        },
    }
}

/// Rewrite a nested `IN (SELECT ...)` statement into its own [`CypherQuery`],
/// for [`super::render`] to render as a `COLLECT { ... }` subquery expression.
pub fn subquery_to_cypher(
    select: &SelectStatement,
    config: &TranslatorConfig,
) -> Result<CypherQuery, TranslateError> {
    select_to_cypher(select, config)
}

pub fn statement_to_cypher(
    statement: &Statement,
    config: &TranslatorConfig,
) -> Result<CypherQuery, TranslateError> {
    match statement {
        Statement::Select(select) => select_to_cypher(select, config),
        Statement::Insert(insert) => insert_to_cypher(insert, config),
        Statement::Update(update) => update_to_cypher(update, config),
        Statement::Delete(delete) => delete_to_cypher(delete, config),
    }
}

fn pattern_path_for(
    from: &TableRef,
    joins: &[Join],
    config: &TranslatorConfig,
) -> PatternPath {
    let start = PatternNode {
        variable: from.variable(),
        label: label_for(from, config),
    };
    let mut steps = Vec::with_capacity(joins.len());
    let mut rel_counter = 0;
    for join in joins {
        rel_counter += 1;
        let variable = if rel_counter == 1 {
            "r".to_string()
        } else {
            format!("r{rel_counter}")
        };
        let rel = PatternRel {
            variable,
            rel_type: relationship_type_for(join, config),
            direction: Direction::Right,
        };
        let node = PatternNode {
            variable: join.table.variable(),
            label: label_for(&join.table, config),
        };
        steps.push(PatternStep { rel, node });
    }
    PatternPath { start, steps }
}

fn select_to_cypher(
    select: &SelectStatement,
    config: &TranslatorConfig,
) -> Result<CypherQuery, TranslateError> {
    let pattern = pattern_path_for(&select.from, &select.joins, config);

    let return_items = match &select.projection {
        Projection::Star => {
            let mut items = vec![ReturnItem {
                expr: Expr::Column(ColumnRef {
                    table: Some(pattern.start.variable.clone()),
                    name: "*".to_string(),
                }),
                alias: None,
            }];
            items.extend(pattern.steps.iter().map(|step| ReturnItem {
                expr: Expr::Column(ColumnRef {
                    table: Some(step.node.variable.clone()),
                    name: "*".to_string(),
                }),
                alias: None,
            }));
            items
        }
        Projection::Items(items) => items
            .iter()
            .map(|item| {
                let expr = rewrite_expr(&item.expr, config);
                let alias = item.alias.clone().or_else(|| match &expr {
                    Expr::Column(c) => Some(c.name.clone()),
                    _ => None,
                });
                ReturnItem { expr, alias }
            })
            .collect(),
    };

    Ok(CypherQuery {
        patterns: vec![pattern],
        where_clause: select.predicate.as_ref().map(|p| rewrite_predicate(p, config)),
        write: None,
        return_items,
        order_by: select
            .order_by
            .iter()
            .map(|o| OrderItem {
                expr: rewrite_expr(&o.expr, config),
                descending: o.descending,
            })
            .collect(),
        skip: select.skip.as_ref().map(|e| rewrite_expr(e, config)),
        limit: select.limit.as_ref().map(|e| rewrite_expr(e, config)),
    })
}

fn insert_to_cypher(
    insert: &InsertStatement,
    config: &TranslatorConfig,
) -> Result<CypherQuery, TranslateError> {
    let variable = insert.table.variable();
    let label = label_for(&insert.table, config);
    let properties = insert
        .columns
        .iter()
        .zip(insert.values.iter())
        .map(|(name, value)| (config.render_name_case.apply(name), rewrite_expr(value, config)))
        .collect();
    Ok(CypherQuery {
        patterns: vec![],
        where_clause: None,
        write: Some(WriteClause::Create {
            variable,
            label,
            properties,
        }),
        return_items: vec![],
        order_by: vec![],
        skip: None,
        limit: None,
    })
}

fn update_to_cypher(
    update: &UpdateStatement,
    config: &TranslatorConfig,
) -> Result<CypherQuery, TranslateError> {
    let pattern = pattern_path_for(&update.table, &[], config);
    let variable = pattern.start.variable.clone();
    let assignments = update
        .assignments
        .iter()
        .map(|(name, value)| (config.render_name_case.apply(name), rewrite_expr(value, config)))
        .collect();
    Ok(CypherQuery {
        patterns: vec![pattern],
        where_clause: update.predicate.as_ref().map(|p| rewrite_predicate(p, config)),
        write: Some(WriteClause::Set {
            variable,
            assignments,
        }),
        return_items: vec![],
        order_by: vec![],
        skip: None,
        limit: None,
    })
}

fn delete_to_cypher(
    delete: &DeleteStatement,
    config: &TranslatorConfig,
) -> Result<CypherQuery, TranslateError> {
    let pattern = pattern_path_for(&delete.table, &[], config);
    let variable = pattern.start.variable.clone();
    Ok(CypherQuery {
        patterns: vec![pattern],
        where_clause: delete.predicate.as_ref().map(|p| rewrite_predicate(p, config)),
        write: Some(WriteClause::Delete { variable }),
        return_items: vec![],
        order_by: vec![],
        skip: None,
        limit: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::parser::parse;

    #[test]
    fn simple_select_rewrites_to_one_node_pattern() {
        let stmt = parse("SELECT p.name FROM Person p", ':').unwrap();
        let config = TranslatorConfig::default();
        let query = statement_to_cypher(&stmt, &config).unwrap();
        assert_eq!(query.patterns.len(), 1);
        assert_eq!(query.patterns[0].start.variable, "p");
        assert_eq!(query.patterns[0].start.label, "Person");
        assert_eq!(query.return_items[0].alias.as_deref(), Some("name"));
    }

    #[test]
    fn join_uses_configured_relationship_type() {
        let stmt = parse(
            "SELECT p.name FROM Person p JOIN Movie m ON p.movie_id = m.id",
            ':',
        )
        .unwrap();
        let config = TranslatorConfig::builder()
            .join_columns_to_type_mapping("movie_id,id", "ACTED_IN")
            .build();
        let query = statement_to_cypher(&stmt, &config).unwrap();
        assert_eq!(query.patterns[0].steps[0].rel.rel_type, "ACTED_IN");
    }

    #[test]
    fn insert_becomes_create() {
        let stmt = parse("INSERT INTO Person (name) VALUES ('Ada')", ':').unwrap();
        let config = TranslatorConfig::default();
        let query = statement_to_cypher(&stmt, &config).unwrap();
        assert!(matches!(query.write, Some(WriteClause::Create { .. })));
    }
}
