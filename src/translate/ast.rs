//! Tree shapes shared by both dialects. The SQL side comes straight out of
//! the parser; the Cypher side is built by [`super::rewrite`] and consumed
//! by [`super::render`]. Neither side knows about the other's syntax —
//! only [`super::rewrite`] bridges them.

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub projection: Projection,
    pub from: TableRef,
    pub joins: Vec<Join>,
    pub predicate: Option<Predicate>,
    pub order_by: Vec<OrderItem>,
    pub skip: Option<Expr>,
    pub limit: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Star,
    Items(Vec<SelectItem>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    /// The variable a pattern element binds to: the alias if one was given,
    /// otherwise the table name's first letter, lower-cased (`Person` -> `p`),
    /// the common Cypher single-letter pattern-variable convention.
    pub fn variable(&self) -> String {
        self.alias.clone().unwrap_or_else(|| {
            self.name
                .chars()
                .next()
                .map(|c| c.to_lowercase().to_string())
                .unwrap_or_default()
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: TableRef,
    pub left: ColumnRef,
    pub right: ColumnRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(ColumnRef),
    Literal(Literal),
    Parameter(Parameter),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    Positional(u32),
    Named(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        left: Expr,
        op: CompareOp,
        right: Expr,
    },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    IsNull {
        expr: Expr,
        negated: bool,
    },
    Like {
        expr: Expr,
        pattern: Expr,
        negated: bool,
    },
    Between {
        expr: Expr,
        low: Expr,
        high: Expr,
        negated: bool,
    },
    InList {
        expr: Expr,
        list: Vec<Expr>,
        negated: bool,
    },
    /// `expr IN (SELECT ...)`. The nested statement is carried unrewritten;
    /// [`super::rewrite`] and [`super::render`] recurse into it with the
    /// same configuration as the enclosing statement when it's rendered.
    InSubquery {
        expr: Expr,
        subquery: Box<SelectStatement>,
        negated: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    pub fn as_cypher(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "<>",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub expr: Expr,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: TableRef,
    pub columns: Vec<String>,
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: TableRef,
    pub assignments: Vec<(String, Expr)>,
    pub predicate: Option<Predicate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: TableRef,
    pub predicate: Option<Predicate>,
}

/// A single `(variable:Label)` pattern node plus the relationship that led
/// into it (absent for the first node of a path).
#[derive(Debug, Clone, PartialEq)]
pub struct PatternNode {
    pub variable: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Right,
    Left,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternRel {
    pub variable: String,
    pub rel_type: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternStep {
    pub rel: PatternRel,
    pub node: PatternNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternPath {
    pub start: PatternNode,
    pub steps: Vec<PatternStep>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteClause {
    Create {
        variable: String,
        label: String,
        properties: Vec<(String, Expr)>,
    },
    Set {
        variable: String,
        assignments: Vec<(String, Expr)>,
    },
    Delete {
        variable: String,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CypherQuery {
    pub patterns: Vec<PatternPath>,
    pub where_clause: Option<Predicate>,
    pub write: Option<WriteClause>,
    pub return_items: Vec<ReturnItem>,
    pub order_by: Vec<OrderItem>,
    pub skip: Option<Expr>,
    pub limit: Option<Expr>,
}
