//! GROUP BY and ORDER BY synthesis.
//!
//! Both clauses are plain text over quoted identifiers and never add binds.

use std::fmt;
use std::str::FromStr;

use crate::context::QueryContext;
use crate::error::BuildError;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl Direction {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Direction {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(BuildError::InvalidStatement(format!(
                "unknown sort direction: {s}"
            ))),
        }
    }
}

/// One ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderTerm {
    /// A column with the database's default direction.
    Column(String),
    /// A column with an explicit direction.
    Directed(String, Direction),
}

impl OrderTerm {
    /// Ascending entry.
    #[must_use]
    pub fn asc(column: impl Into<String>) -> Self {
        Self::Directed(column.into(), Direction::Asc)
    }

    /// Descending entry.
    #[must_use]
    pub fn desc(column: impl Into<String>) -> Self {
        Self::Directed(column.into(), Direction::Desc)
    }
}

impl From<&str> for OrderTerm {
    fn from(column: &str) -> Self {
        Self::Column(String::from(column))
    }
}

impl From<String> for OrderTerm {
    fn from(column: String) -> Self {
        Self::Column(column)
    }
}

impl From<(&str, Direction)> for OrderTerm {
    fn from((column, direction): (&str, Direction)) -> Self {
        Self::Directed(String::from(column), direction)
    }
}

/// Appends ` GROUP BY "a", "b"`; nothing for an empty list.
pub fn append_group_by(sql: &mut String, columns: &[String], ctx: &QueryContext) {
    if columns.is_empty() {
        return;
    }
    let list: Vec<String> = columns.iter().map(|c| ctx.quote_identifier(c)).collect();
    sql.push_str(" GROUP BY ");
    sql.push_str(&list.join(", "));
}

/// Appends ` ORDER BY "a" ASC, "b"`; nothing for an empty list.
pub fn append_order_by(sql: &mut String, terms: &[OrderTerm], ctx: &QueryContext) {
    if terms.is_empty() {
        return;
    }
    let list: Vec<String> = terms
        .iter()
        .map(|term| match term {
            OrderTerm::Column(c) => ctx.quote_identifier(c),
            OrderTerm::Directed(c, dir) => format!("{} {dir}", ctx.quote_identifier(c)),
        })
        .collect();
    sql.push_str(" ORDER BY ");
    sql.push_str(&list.join(", "));
}
