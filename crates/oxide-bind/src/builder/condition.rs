//! Condition expressions and the WHERE compiler.
//!
//! A [`Condition`] mirrors the three shapes a WHERE description can take:
//! a mapping of columns to predicates (all must hold), a sequence of
//! alternatives (any may hold), or raw SQL. Compiling it yields SQL text and
//! the binds for its placeholders, left to right.

use crate::context::QueryContext;
use crate::error::{BuildError, Result};
use crate::value::{Bind, IntoBind};

/// Creates a column reference for building predicates.
#[must_use]
pub fn col(name: &str) -> Column {
    Column {
        name: String::from(name),
    }
}

/// Creates an operand referring to another column (quoted, not bound).
#[must_use]
pub fn column_ref(name: &str) -> Operand {
    Operand::Column(String::from(name))
}

/// Creates an operand emitted verbatim.
///
/// **Warning**: Only use this for SQL fragments that don't contain user input.
#[must_use]
pub fn raw(sql: impl Into<String>) -> Operand {
    Operand::Raw(sql.into())
}

/// The right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A `?` placeholder.
    Bind(Bind),
    /// A quoted column identifier.
    Column(String),
    /// Verbatim SQL.
    Raw(String),
}

/// Types usable as a predicate operand.
pub trait IntoOperand {
    /// Converts into an `Operand`.
    fn into_operand(self) -> Operand;
}

impl<T: IntoBind> IntoOperand for T {
    fn into_operand(self) -> Operand {
        Operand::Bind(self.into_bind())
    }
}

impl IntoOperand for Operand {
    fn into_operand(self) -> Operand {
        self
    }
}

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
}

impl CmpOp {
    /// Returns the SQL operator.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
        }
    }

    /// Parses an operator as written in a statement description.
    #[must_use]
    pub fn parse(op: &str) -> Option<Self> {
        let op = match op.to_ascii_lowercase().as_str() {
            "=" | "==" | "eq" => Self::Eq,
            "!=" | "<>" | "ne" => Self::NotEq,
            "<" | "lt" => Self::Lt,
            "<=" | "le" => Self::LtEq,
            ">" | "gt" => Self::Gt,
            ">=" | "ge" => Self::GtEq,
            "like" => Self::Like,
            "not like" => Self::NotLike,
            _ => return None,
        };
        Some(op)
    }
}

/// A test applied to one column.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column <op> operand`
    Cmp(CmpOp, Operand),
    /// `column [NOT] IN (...)`
    In {
        /// `NOT IN` when set.
        negated: bool,
        /// List members.
        items: Vec<Operand>,
    },
    /// `column [NOT] BETWEEN low AND high`
    Between {
        /// `NOT BETWEEN` when set.
        negated: bool,
        /// Lower bound.
        low: Operand,
        /// Upper bound.
        high: Operand,
    },
    /// `column IS NULL`
    IsNull,
    /// `column IS NOT NULL`
    IsNotNull,
}

/// A WHERE / ON condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// A predicate on a single column.
    Compare {
        /// Column name, possibly qualified.
        column: String,
        /// Test applied to it.
        predicate: Predicate,
    },
    /// All conditions must hold (the mapping shape).
    And(Vec<Condition>),
    /// Any condition may hold (the sequence shape).
    Or(Vec<Condition>),
    /// Verbatim SQL.
    Raw(String),
}

impl Condition {
    /// Creates a condition emitted verbatim.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }

    /// Conjunction of several conditions.
    #[must_use]
    pub fn all(items: impl IntoIterator<Item = Self>) -> Self {
        Self::And(items.into_iter().collect())
    }

    /// Disjunction of several conditions.
    #[must_use]
    pub fn any(items: impl IntoIterator<Item = Self>) -> Self {
        Self::Or(items.into_iter().collect())
    }

    /// Creates an AND expression.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::And(mut items) => {
                items.push(other);
                Self::And(items)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Creates an OR expression.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Or(mut items) => {
                items.push(other);
                Self::Or(items)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    /// Returns true when the condition renders to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::And(items) | Self::Or(items) => items.iter().all(Self::is_empty),
            Self::Raw(sql) => sql.trim().is_empty(),
            Self::Compare { .. } => false,
        }
    }
}

/// A column reference.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
}

impl Column {
    fn predicate(self, predicate: Predicate) -> Condition {
        Condition::Compare {
            column: self.name,
            predicate,
        }
    }

    fn cmp(self, op: CmpOp, value: impl IntoOperand) -> Condition {
        self.predicate(Predicate::Cmp(op, value.into_operand()))
    }

    /// Creates an equality expression.
    #[must_use]
    pub fn eq(self, value: impl IntoOperand) -> Condition {
        self.cmp(CmpOp::Eq, value)
    }

    /// Creates an inequality expression.
    #[must_use]
    pub fn not_eq(self, value: impl IntoOperand) -> Condition {
        self.cmp(CmpOp::NotEq, value)
    }

    /// Creates a less-than expression.
    #[must_use]
    pub fn lt(self, value: impl IntoOperand) -> Condition {
        self.cmp(CmpOp::Lt, value)
    }

    /// Creates a less-than-or-equal expression.
    #[must_use]
    pub fn lt_eq(self, value: impl IntoOperand) -> Condition {
        self.cmp(CmpOp::LtEq, value)
    }

    /// Creates a greater-than expression.
    #[must_use]
    pub fn gt(self, value: impl IntoOperand) -> Condition {
        self.cmp(CmpOp::Gt, value)
    }

    /// Creates a greater-than-or-equal expression.
    #[must_use]
    pub fn gt_eq(self, value: impl IntoOperand) -> Condition {
        self.cmp(CmpOp::GtEq, value)
    }

    /// Creates a LIKE expression.
    #[must_use]
    pub fn like(self, pattern: impl IntoOperand) -> Condition {
        self.cmp(CmpOp::Like, pattern)
    }

    /// Creates a NOT LIKE expression.
    #[must_use]
    pub fn not_like(self, pattern: impl IntoOperand) -> Condition {
        self.cmp(CmpOp::NotLike, pattern)
    }

    /// Creates an IS NULL expression.
    #[must_use]
    pub fn is_null(self) -> Condition {
        self.predicate(Predicate::IsNull)
    }

    /// Creates an IS NOT NULL expression.
    #[must_use]
    pub fn is_not_null(self) -> Condition {
        self.predicate(Predicate::IsNotNull)
    }

    /// Creates a BETWEEN expression.
    #[must_use]
    pub fn between(self, low: impl IntoOperand, high: impl IntoOperand) -> Condition {
        self.predicate(Predicate::Between {
            negated: false,
            low: low.into_operand(),
            high: high.into_operand(),
        })
    }

    /// Creates a NOT BETWEEN expression.
    #[must_use]
    pub fn not_between(self, low: impl IntoOperand, high: impl IntoOperand) -> Condition {
        self.predicate(Predicate::Between {
            negated: true,
            low: low.into_operand(),
            high: high.into_operand(),
        })
    }

    /// Creates an IN expression.
    #[must_use]
    pub fn in_list<T: IntoOperand>(self, values: impl IntoIterator<Item = T>) -> Condition {
        self.predicate(Predicate::In {
            negated: false,
            items: values.into_iter().map(IntoOperand::into_operand).collect(),
        })
    }

    /// Creates a NOT IN expression.
    #[must_use]
    pub fn not_in_list<T: IntoOperand>(self, values: impl IntoIterator<Item = T>) -> Condition {
        self.predicate(Predicate::In {
            negated: true,
            items: values.into_iter().map(IntoOperand::into_operand).collect(),
        })
    }
}

/// Compiles a condition into a `WHERE ...` clause and its binds.
///
/// An empty condition yields an empty string and no binds.
///
/// # Errors
///
/// Returns [`BuildError::InvalidCondition`] for a predicate on an empty
/// column name.
pub fn compile_where(cond: &Condition, ctx: &QueryContext) -> Result<(String, Vec<Bind>)> {
    let mut binds = vec![];
    let body = render(cond, ctx, &mut binds)?;
    if body.is_empty() {
        return Ok((String::new(), binds));
    }
    Ok((format!("WHERE {body}"), binds))
}

fn render(cond: &Condition, ctx: &QueryContext, binds: &mut Vec<Bind>) -> Result<String> {
    match cond {
        Condition::Compare { column, predicate } => {
            if column.trim().is_empty() {
                return Err(BuildError::InvalidCondition(String::from(
                    "predicate on an empty column name",
                )));
            }
            Ok(render_predicate(
                &ctx.quote_identifier(column),
                predicate,
                ctx,
                binds,
            ))
        }
        Condition::And(items) => render_group(items, "AND", ctx, binds),
        Condition::Or(items) => render_group(items, "OR", ctx, binds),
        Condition::Raw(sql) => Ok(String::from(sql.trim())),
    }
}

fn render_group(
    items: &[Condition],
    keyword: &str,
    ctx: &QueryContext,
    binds: &mut Vec<Bind>,
) -> Result<String> {
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        let part = render(item, ctx, binds)?;
        if !part.is_empty() {
            parts.push(part);
        }
    }
    if parts.is_empty() {
        return Ok(String::new());
    }
    Ok(format!("( {} )", parts.join(&format!(" {keyword} "))))
}

fn render_predicate(
    column: &str,
    predicate: &Predicate,
    ctx: &QueryContext,
    binds: &mut Vec<Bind>,
) -> String {
    match predicate {
        Predicate::Cmp(op, operand) => {
            let rhs = render_operand(operand, ctx, binds);
            format!("{column} {} {rhs}", op.as_sql())
        }
        Predicate::In { negated, items } if items.is_empty() => {
            // Nothing is IN an empty list; everything is NOT IN it.
            String::from(if *negated { "1=1" } else { "0=1" })
        }
        Predicate::In { negated, items } => {
            let keyword = if *negated { "NOT IN" } else { "IN" };
            let list: Vec<String> = items
                .iter()
                .map(|item| render_operand(item, ctx, binds))
                .collect();
            format!("{column} {keyword} ( {} )", list.join(", "))
        }
        Predicate::Between { negated, low, high } => {
            let keyword = if *negated { "NOT BETWEEN" } else { "BETWEEN" };
            let low = render_operand(low, ctx, binds);
            let high = render_operand(high, ctx, binds);
            format!("{column} {keyword} {low} AND {high}")
        }
        Predicate::IsNull => format!("{column} IS NULL"),
        Predicate::IsNotNull => format!("{column} IS NOT NULL"),
    }
}

pub(crate) fn render_operand(
    operand: &Operand,
    ctx: &QueryContext,
    binds: &mut Vec<Bind>,
) -> String {
    match operand {
        Operand::Bind(bind) => {
            binds.push(bind.clone());
            String::from("?")
        }
        Operand::Column(name) => ctx.quote_identifier(name),
        Operand::Raw(sql) => sql.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{token, SqlValue};

    fn compile(cond: &Condition) -> (String, Vec<Bind>) {
        compile_where(cond, &QueryContext::default()).unwrap()
    }

    #[test]
    fn test_column_eq() {
        let (sql, binds) = compile(&col("name").eq("Alice"));
        assert_eq!(sql, "WHERE \"name\" = ?");
        assert_eq!(binds, vec![Bind::Value(SqlValue::Text(String::from("Alice")))]);
    }

    #[test]
    fn test_mapping_shape_is_parenthesized() {
        let (sql, binds) = compile(&Condition::all([
            col("active").eq(true),
            col("age").gt(token("min_age")),
        ]));
        assert_eq!(sql, "WHERE ( \"active\" = ? AND \"age\" > ? )");
        assert_eq!(binds[1].token_name(), Some("min_age"));
    }

    #[test]
    fn test_nested_or() {
        let cond = col("a")
            .eq(1)
            .and(col("b").eq(2).or(col("c").is_null()));
        let (sql, binds) = compile(&cond);
        assert_eq!(sql, "WHERE ( \"a\" = ? AND ( \"b\" = ? OR \"c\" IS NULL ) )");
        assert_eq!(binds.len(), 2);
    }

    #[test]
    fn test_in_between_like() {
        let (sql, binds) = compile(&Condition::all([
            col("status").in_list(["active", "pending"]),
            col("price").between(10, 100),
            col("email").not_like("%@example.com"),
        ]));
        assert_eq!(
            sql,
            "WHERE ( \"status\" IN ( ?, ? ) AND \"price\" BETWEEN ? AND ? AND \"email\" NOT LIKE ? )"
        );
        assert_eq!(binds.len(), 5);
    }

    #[test]
    fn test_empty_in_list() {
        let (sql, binds) = compile(&col("id").in_list(Vec::<i64>::new()));
        assert_eq!(sql, "WHERE 0=1");
        assert!(binds.is_empty());
        let (sql, _) = compile(&col("id").not_in_list(Vec::<i64>::new()));
        assert_eq!(sql, "WHERE 1=1");
    }

    #[test]
    fn test_column_and_raw_operands() {
        let (sql, binds) = compile(&Condition::all([
            col("e.user_id").eq(column_ref("u.user_id")),
            col("created").lt(raw("CURRENT_TIMESTAMP")),
        ]));
        assert_eq!(
            sql,
            "WHERE ( \"e\".\"user_id\" = \"u\".\"user_id\" AND \"created\" < CURRENT_TIMESTAMP )"
        );
        assert!(binds.is_empty());
    }

    #[test]
    fn test_empty_condition() {
        let (sql, binds) = compile(&Condition::all([Condition::any([])]));
        assert_eq!(sql, "");
        assert!(binds.is_empty());
    }

    #[test]
    fn test_is_empty_matches_rendering() {
        let empty = [
            Condition::all([]),
            Condition::any([Condition::all([]), Condition::raw("  ")]),
        ];
        for cond in &empty {
            assert!(cond.is_empty());
            assert_eq!(compile(cond).0, "");
        }
        let filled = Condition::all([Condition::any([]), col("a").eq(1)]);
        assert!(!filled.is_empty());
        assert_eq!(compile(&filled).0, "WHERE ( \"a\" = ? )");
    }

    #[test]
    fn test_empty_column_is_error() {
        let err = compile_where(&col(" ").eq(1), &QueryContext::default()).unwrap_err();
        assert!(matches!(err, BuildError::InvalidCondition(_)));
    }

    #[test]
    fn test_sql_injection_prevention() {
        let malicious = "'; DROP TABLE users; --";
        let (sql, binds) = compile(&col("name").eq(malicious));
        assert_eq!(sql, "WHERE \"name\" = ?");
        assert!(matches!(&binds[0], Bind::Value(SqlValue::Text(s)) if s == malicious));
    }
}
