//! Recursive-descent parser: token stream in, a [`Statement`] tree out.
//! Precedence, loosest to tightest: `OR` < `AND` < `NOT` < comparison /
//! `LIKE` / `IS NULL` / `BETWEEN` / `IN`.

use super::ast::*;
use super::lexer::{Lexer, ParamToken, Spanned, Token};
use crate::error::TranslateError;

pub fn parse(sql: &str, named_param_prefix: char) -> Result<Statement, TranslateError> {
    let tokens = Lexer::new(sql, named_param_prefix).tokenize()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        next_positional: 1,
    };
    let stmt = parser.parse_statement()?;
    parser.expect_end()?;
    Ok(stmt)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    next_positional: u32,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn position(&self) -> usize {
        self.tokens[self.pos].position
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].token.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> TranslateError {
        TranslateError::SyntaxError {
            position: self.position(),
            message: message.into(),
        }
    }

    fn keyword_is(&self, kw: &str) -> bool {
        matches!(self.peek(), Token::Ident(s) if s.eq_ignore_ascii_case(kw))
    }

    fn eat_keyword(&mut self, kw: &str) -> Result<(), TranslateError> {
        if self.keyword_is(kw) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected keyword {kw}")))
        }
    }

    fn eat_punct(&mut self, p: char) -> Result<(), TranslateError> {
        if matches!(self.peek(), Token::Punct(c) if *c == p) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected '{p}'")))
        }
    }

    fn expect_end(&mut self) -> Result<(), TranslateError> {
        // A single trailing `;` is tolerated.
        if matches!(self.peek(), Token::Punct(';')) {
            self.advance();
        }
        if matches!(self.peek(), Token::Eof) {
            Ok(())
        } else {
            Err(self.error("unexpected trailing input"))
        }
    }

    fn ident(&mut self) -> Result<String, TranslateError> {
        match self.advance() {
            Token::Ident(s) => Ok(s),
            other => Err(TranslateError::SyntaxError {
                position: self.position(),
                message: format!("expected identifier, found {other:?}"),
            }),
        }
    }

    fn parse_statement(&mut self) -> Result<Statement, TranslateError> {
        if self.keyword_is("SELECT") {
            Ok(Statement::Select(self.parse_select()?))
        } else if self.keyword_is("INSERT") {
            Ok(Statement::Insert(self.parse_insert()?))
        } else if self.keyword_is("UPDATE") {
            Ok(Statement::Update(self.parse_update()?))
        } else if self.keyword_is("DELETE") {
            Ok(Statement::Delete(self.parse_delete()?))
        } else {
            Err(self.error("expected SELECT, INSERT, UPDATE, or DELETE"))
        }
    }

    fn parse_select(&mut self) -> Result<SelectStatement, TranslateError> {
        self.eat_keyword("SELECT")?;
        let projection = if matches!(self.peek(), Token::Punct('*')) {
            self.advance();
            Projection::Star
        } else {
            let mut items = vec![self.parse_select_item()?];
            while matches!(self.peek(), Token::Punct(',')) {
                self.advance();
                items.push(self.parse_select_item()?);
            }
            Projection::Items(items)
        };
        self.eat_keyword("FROM")?;
        let from = self.parse_table_ref()?;
        let mut joins = Vec::new();
        while self.keyword_is("JOIN") || self.keyword_is("INNER") {
            joins.push(self.parse_join()?);
        }
        let predicate = if self.keyword_is("WHERE") {
            self.advance();
            Some(self.parse_predicate()?)
        } else {
            None
        };
        let order_by = if self.keyword_is("ORDER") {
            self.advance();
            self.eat_keyword("BY")?;
            self.parse_order_list()?
        } else {
            Vec::new()
        };
        let skip = if self.keyword_is("SKIP") || self.keyword_is("OFFSET") {
            self.advance();
            Some(self.parse_expr()?)
        } else {
            None
        };
        let limit = if self.keyword_is("LIMIT") {
            self.advance();
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(SelectStatement {
            projection,
            from,
            joins,
            predicate,
            order_by,
            skip,
            limit,
        })
    }

    fn parse_select_item(&mut self) -> Result<SelectItem, TranslateError> {
        let expr = self.parse_expr()?;
        let alias = if self.keyword_is("AS") {
            self.advance();
            Some(self.ident()?)
        } else if matches!(self.peek(), Token::Ident(s) if !is_reserved(s)) {
            Some(self.ident()?)
        } else {
            None
        };
        Ok(SelectItem { expr, alias })
    }

    fn parse_table_ref(&mut self) -> Result<TableRef, TranslateError> {
        let name = self.ident()?;
        let alias = if matches!(self.peek(), Token::Ident(s) if !is_reserved(s)) {
            Some(self.ident()?)
        } else {
            None
        };
        Ok(TableRef { name, alias })
    }

    fn parse_join(&mut self) -> Result<Join, TranslateError> {
        if self.keyword_is("INNER") {
            self.advance();
        }
        self.eat_keyword("JOIN")?;
        let table = self.parse_table_ref()?;
        self.eat_keyword("ON")?;
        let left = self.parse_column_ref()?;
        self.eat_punct('=')?;
        let right = self.parse_column_ref()?;
        Ok(Join { table, left, right })
    }

    fn parse_column_ref(&mut self) -> Result<ColumnRef, TranslateError> {
        let first = self.ident()?;
        if matches!(self.peek(), Token::Punct('.')) {
            self.advance();
            let name = self.ident()?;
            Ok(ColumnRef {
                table: Some(first),
                name,
            })
        } else {
            Ok(ColumnRef {
                table: None,
                name: first,
            })
        }
    }

    fn parse_order_list(&mut self) -> Result<Vec<OrderItem>, TranslateError> {
        let mut items = vec![self.parse_order_item()?];
        while matches!(self.peek(), Token::Punct(',')) {
            self.advance();
            items.push(self.parse_order_item()?);
        }
        Ok(items)
    }

    fn parse_order_item(&mut self) -> Result<OrderItem, TranslateError> {
        let expr = self.parse_expr()?;
        let descending = if self.keyword_is("DESC") {
            self.advance();
            true
        } else if self.keyword_is("ASC") {
            self.advance();
            false
        } else {
            false
        };
        Ok(OrderItem { expr, descending })
    }

    fn parse_expr(&mut self) -> Result<Expr, TranslateError> {
        match self.peek().clone() {
            Token::Number(n) => {
                self.advance();
                if n.contains('.') {
                    Ok(Expr::Literal(Literal::Float(n.parse().map_err(|_| {
                        self.error("invalid numeric literal")
                    })?)))
                } else {
                    Ok(Expr::Literal(Literal::Integer(n.parse().map_err(|_| {
                        self.error("invalid numeric literal")
                    })?)))
                }
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expr::Literal(Literal::String(s)))
            }
            Token::Param(ParamToken::Positional) => {
                self.advance();
                let n = self.next_positional;
                self.next_positional += 1;
                Ok(Expr::Parameter(Parameter::Positional(n)))
            }
            Token::Param(ParamToken::Named(name)) => {
                self.advance();
                Ok(Expr::Parameter(Parameter::Named(name)))
            }
            Token::Ident(s) if s.eq_ignore_ascii_case("NULL") => {
                self.advance();
                Ok(Expr::Literal(Literal::Null))
            }
            Token::Ident(s) if s.eq_ignore_ascii_case("TRUE") => {
                self.advance();
                Ok(Expr::Literal(Literal::Boolean(true)))
            }
            Token::Ident(s) if s.eq_ignore_ascii_case("FALSE") => {
                self.advance();
                Ok(Expr::Literal(Literal::Boolean(false)))
            }
            Token::Ident(_) => Ok(Expr::Column(self.parse_column_ref()?)),
            other => Err(TranslateError::SyntaxError {
                position: self.position(),
                message: format!("expected an expression, found {other:?}"),
            }),
        }
    }

    fn parse_predicate(&mut self) -> Result<Predicate, TranslateError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Predicate, TranslateError> {
        let mut left = self.parse_and()?;
        while self.keyword_is("OR") {
            self.advance();
            let right = self.parse_and()?;
            left = Predicate::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Predicate, TranslateError> {
        let mut left = self.parse_not()?;
        while self.keyword_is("AND") {
            self.advance();
            let right = self.parse_not()?;
            left = Predicate::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Predicate, TranslateError> {
        if self.keyword_is("NOT") {
            self.advance();
            Ok(Predicate::Not(Box::new(self.parse_not()?)))
        } else {
            self.parse_comparison()
        }
    }

    fn parse_comparison(&mut self) -> Result<Predicate, TranslateError> {
        if matches!(self.peek(), Token::Punct('(')) {
            self.advance();
            let inner = self.parse_predicate()?;
            self.eat_punct(')')?;
            return Ok(inner);
        }
        let expr = self.parse_expr()?;

        if self.keyword_is("IS") {
            self.advance();
            let negated = if self.keyword_is("NOT") {
                self.advance();
                true
            } else {
                false
            };
            self.eat_keyword("NULL")?;
            return Ok(Predicate::IsNull { expr, negated });
        }

        let negated = if self.keyword_is("NOT") {
            self.advance();
            true
        } else {
            false
        };

        if self.keyword_is("LIKE") {
            self.advance();
            let pattern = self.parse_expr()?;
            return Ok(Predicate::Like {
                expr,
                pattern,
                negated,
            });
        }
        if self.keyword_is("BETWEEN") {
            self.advance();
            let low = self.parse_expr()?;
            self.eat_keyword("AND")?;
            let high = self.parse_expr()?;
            return Ok(Predicate::Between {
                expr,
                low,
                high,
                negated,
            });
        }
        if self.keyword_is("IN") {
            self.advance();
            self.eat_punct('(')?;
            if self.keyword_is("SELECT") {
                let subquery = self.parse_select()?;
                self.eat_punct(')')?;
                return Ok(Predicate::InSubquery {
                    expr,
                    subquery: Box::new(subquery),
                    negated,
                });
            }
            let mut list = vec![self.parse_expr()?];
            while matches!(self.peek(), Token::Punct(',')) {
                self.advance();
                list.push(self.parse_expr()?);
            }
            self.eat_punct(')')?;
            return Ok(Predicate::InList {
                expr,
                list,
                negated,
            });
        }
        if negated {
            return Err(self.error("expected LIKE, BETWEEN, or IN after NOT"));
        }

        let op = match self.peek().clone() {
            Token::Punct('=') => CompareOp::Eq,
            Token::Op("<>") | Token::Op("!=") => CompareOp::NotEq,
            Token::Op("<") => CompareOp::Lt,
            Token::Op("<=") => CompareOp::Lte,
            Token::Op(">") => CompareOp::Gt,
            Token::Op(">=") => CompareOp::Gte,
            other => {
                return Err(TranslateError::SyntaxError {
                    position: self.position(),
                    message: format!("expected a comparison operator, found {other:?}"),
                })
            }
        };
        self.advance();
        let right = self.parse_expr()?;
        Ok(Predicate::Compare { left: expr, op, right })
    }

    fn parse_insert(&mut self) -> Result<InsertStatement, TranslateError> {
        self.eat_keyword("INSERT")?;
        self.eat_keyword("INTO")?;
        let table = self.parse_table_ref_no_alias()?;
        self.eat_punct('(')?;
        let mut columns = vec![self.ident()?];
        while matches!(self.peek(), Token::Punct(',')) {
            self.advance();
            columns.push(self.ident()?);
        }
        self.eat_punct(')')?;
        self.eat_keyword("VALUES")?;
        self.eat_punct('(')?;
        let mut values = vec![self.parse_expr()?];
        while matches!(self.peek(), Token::Punct(',')) {
            self.advance();
            values.push(self.parse_expr()?);
        }
        self.eat_punct(')')?;
        Ok(InsertStatement {
            table,
            columns,
            values,
        })
    }

    fn parse_table_ref_no_alias(&mut self) -> Result<TableRef, TranslateError> {
        Ok(TableRef {
            name: self.ident()?,
            alias: None,
        })
    }

    fn parse_update(&mut self) -> Result<UpdateStatement, TranslateError> {
        self.eat_keyword("UPDATE")?;
        let table = self.parse_table_ref()?;
        self.eat_keyword("SET")?;
        let mut assignments = vec![self.parse_assignment()?];
        while matches!(self.peek(), Token::Punct(',')) {
            self.advance();
            assignments.push(self.parse_assignment()?);
        }
        let predicate = if self.keyword_is("WHERE") {
            self.advance();
            Some(self.parse_predicate()?)
        } else {
            None
        };
        Ok(UpdateStatement {
            table,
            assignments,
            predicate,
        })
    }

    fn parse_assignment(&mut self) -> Result<(String, Expr), TranslateError> {
        let name = self.ident()?;
        self.eat_punct('=')?;
        let expr = self.parse_expr()?;
        Ok((name, expr))
    }

    fn parse_delete(&mut self) -> Result<DeleteStatement, TranslateError> {
        self.eat_keyword("DELETE")?;
        self.eat_keyword("FROM")?;
        let table = self.parse_table_ref()?;
        let predicate = if self.keyword_is("WHERE") {
            self.advance();
            Some(self.parse_predicate()?)
        } else {
            None
        };
        Ok(DeleteStatement { table, predicate })
    }
}

fn is_reserved(ident: &str) -> bool {
    const KEYWORDS: &[&str] = &[
        "FROM", "WHERE", "JOIN", "INNER", "ON", "ORDER", "BY", "SKIP", "OFFSET", "LIMIT", "AND",
        "OR", "NOT", "AS", "SET", "VALUES", "ASC", "DESC",
    ];
    KEYWORDS.iter().any(|k| ident.eq_ignore_ascii_case(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_select() {
        let stmt = parse("SELECT p.name FROM Person p", ':').unwrap();
        match stmt {
            Statement::Select(select) => {
                assert_eq!(select.from.name, "Person");
                assert_eq!(select.from.alias.as_deref(), Some("p"));
                match select.projection {
                    Projection::Items(items) => assert_eq!(items.len(), 1),
                    _ => panic!("expected projection items"),
                }
            }
            _ => panic!("expected select"),
        }
    }

    #[test]
    fn parses_join_with_predicate() {
        let stmt = parse(
            "SELECT p.name FROM Person p JOIN Movie m ON p.movie_id = m.id WHERE p.age > 18",
            ':',
        )
        .unwrap();
        match stmt {
            Statement::Select(select) => {
                assert_eq!(select.joins.len(), 1);
                assert!(select.predicate.is_some());
            }
            _ => panic!("expected select"),
        }
    }

    #[test]
    fn parses_insert() {
        let stmt = parse("INSERT INTO Person (name) VALUES ('Ada')", ':').unwrap();
        match stmt {
            Statement::Insert(insert) => {
                assert_eq!(insert.table.name, "Person");
                assert_eq!(insert.columns, vec!["name".to_string()]);
            }
            _ => panic!("expected insert"),
        }
    }

    #[test]
    fn parses_like_and_between_and_in() {
        let stmt = parse(
            "SELECT * FROM Person p WHERE p.name LIKE 'A%' AND p.age BETWEEN 1 AND 99 AND p.id IN (1, 2)",
            ':',
        )
        .unwrap();
        assert!(matches!(stmt, Statement::Select(_)));
    }

    #[test]
    fn trailing_garbage_is_a_syntax_error() {
        assert!(parse("SELECT * FROM Person p EXTRA", ':').is_err());
    }

    #[test]
    fn parses_in_subquery() {
        let stmt = parse(
            "SELECT p.name FROM Person p WHERE p.id IN (SELECT m.person_id FROM Membership m)",
            ':',
        )
        .unwrap();
        let Statement::Select(select) = stmt else {
            panic!("expected a SELECT statement");
        };
        assert!(matches!(
            select.predicate,
            Some(Predicate::InSubquery { .. })
        ));
    }
}
