//! FROM clause compilation.
//!
//! A FROM clause is an ordered chain of [`TableRef`]s. Plain, raw and
//! aliased tables form a comma list; a join attaches to the entry right
//! before it, and its ON / USING condition is qualified by that entry's
//! effective name (the alias when there is one, the table name otherwise).

use std::borrow::Cow;

use super::condition::{compile_where, CmpOp, Condition, Operand, Predicate};
use crate::context::QueryContext;
use crate::error::{BuildError, Result};
use crate::value::Bind;

/// One entry of a FROM clause.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRef {
    /// A table name, quoted.
    Plain(String),
    /// SQL emitted verbatim, e.g. a subselect or a table function.
    ///
    /// **Warning**: the caller is responsible for its safety.
    Raw(String),
    /// A table with an alias.
    Aliased {
        /// Table name.
        name: String,
        /// Alias.
        alias: String,
    },
    /// A table joined to the previous entry.
    Joined(Join),
}

impl TableRef {
    /// Creates a plain table reference.
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self::Plain(name.into())
    }

    /// Creates a raw, unquoted table reference.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }

    /// Creates an aliased table reference.
    #[must_use]
    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::Aliased {
            name: name.into(),
            alias: alias.into(),
        }
    }

    /// Returns the name later joins use to refer to this entry.
    #[must_use]
    pub fn effective_name(&self) -> &str {
        match self {
            Self::Plain(name) | Self::Raw(name) => name,
            Self::Aliased { alias, .. } => alias,
            Self::Joined(join) => join.effective_name(),
        }
    }
}

impl From<&str> for TableRef {
    fn from(name: &str) -> Self {
        Self::Plain(String::from(name))
    }
}

impl From<String> for TableRef {
    fn from(name: String) -> Self {
        Self::Plain(name)
    }
}

impl From<Join> for TableRef {
    fn from(join: Join) -> Self {
        Self::Joined(join)
    }
}

/// Join flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    /// `JOIN`
    #[default]
    Inner,
    /// `LEFT JOIN`
    Left,
}

/// How a joined table matches the previous entry.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinConstraint {
    /// An explicit ON condition.
    On(Condition),
    /// Equality on a column both tables share.
    Using(String),
}

/// A joined table.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// Table name.
    pub name: String,
    /// Optional alias.
    pub alias: Option<String>,
    /// Join flavor.
    pub kind: JoinKind,
    /// Matching condition.
    pub constraint: JoinConstraint,
}

impl Join {
    /// Starts an inner join.
    #[must_use]
    pub fn inner(name: impl Into<String>) -> JoinBuilder {
        JoinBuilder::new(name.into(), JoinKind::Inner)
    }

    /// Starts a left join.
    #[must_use]
    pub fn left(name: impl Into<String>) -> JoinBuilder {
        JoinBuilder::new(name.into(), JoinKind::Left)
    }

    /// Returns the alias if present, else the table name.
    #[must_use]
    pub fn effective_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A join missing its constraint.
///
/// `on` or `using` completes it.
#[derive(Debug, Clone)]
pub struct JoinBuilder {
    name: String,
    alias: Option<String>,
    kind: JoinKind,
}

impl JoinBuilder {
    const fn new(name: String, kind: JoinKind) -> Self {
        Self {
            name,
            alias: None,
            kind,
        }
    }

    /// Sets the alias.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Completes the join with an ON condition.
    #[must_use]
    pub fn on(self, condition: Condition) -> Join {
        self.finish(JoinConstraint::On(condition))
    }

    /// Completes the join with a shared column.
    #[must_use]
    pub fn using(self, column: impl Into<String>) -> Join {
        self.finish(JoinConstraint::Using(column.into()))
    }

    fn finish(self, constraint: JoinConstraint) -> Join {
        Join {
            name: self.name,
            alias: self.alias,
            kind: self.kind,
            constraint,
        }
    }
}

/// Compiles a FROM chain into its SQL (without the `FROM` keyword) and binds.
///
/// # Errors
///
/// Returns [`BuildError::InvalidFrom`] for an empty chain, a chain that
/// starts with a join, an empty table name, or a join whose condition
/// renders to nothing. Condition compiler errors propagate unchanged.
pub fn compile_from(tables: &[TableRef], ctx: &QueryContext) -> Result<(String, Vec<Bind>)> {
    let Some(first) = tables.first() else {
        return Err(BuildError::InvalidFrom(String::from("no tables given")));
    };
    if let TableRef::Joined(join) = first {
        return Err(BuildError::InvalidFrom(format!(
            "join on {} has no preceding table",
            join.name
        )));
    }

    let mut sql = String::new();
    let mut binds = vec![];
    let mut previous: Option<&TableRef> = None;

    for table in tables {
        match table {
            TableRef::Plain(name) => {
                push_list_separator(&mut sql);
                sql.push_str(&ctx.quote_identifier(non_empty(name)?));
            }
            TableRef::Raw(text) => {
                push_list_separator(&mut sql);
                sql.push_str(non_empty(text)?);
            }
            TableRef::Aliased { name, alias } => {
                push_list_separator(&mut sql);
                sql.push_str(&ctx.quote_identifier(non_empty(name)?));
                sql.push(' ');
                sql.push_str(&ctx.quote_name(non_empty(alias)?));
            }
            TableRef::Joined(join) => {
                if let (JoinConstraint::Using(_), Some(TableRef::Raw(_))) =
                    (&join.constraint, previous)
                {
                    return Err(BuildError::InvalidFrom(format!(
                        "USING join on {} follows a raw FROM entry",
                        join.name
                    )));
                }
                let prev = previous.map_or("", TableRef::effective_name);
                compile_join(join, prev, ctx, &mut sql, &mut binds)?;
            }
        }
        previous = Some(table);
    }

    Ok((sql, binds))
}

fn compile_join(
    join: &Join,
    previous: &str,
    ctx: &QueryContext,
    sql: &mut String,
    binds: &mut Vec<Bind>,
) -> Result<()> {
    sql.push(' ');
    if join.kind == JoinKind::Left {
        sql.push_str("LEFT ");
    }
    sql.push_str("JOIN ");
    sql.push_str(&ctx.quote_identifier(non_empty(&join.name)?));
    if let Some(alias) = &join.alias {
        sql.push(' ');
        sql.push_str(&ctx.quote_name(non_empty(alias)?));
    }

    let condition = match &join.constraint {
        JoinConstraint::On(condition) => Cow::Borrowed(condition),
        JoinConstraint::Using(column) => Cow::Owned(using_condition(
            join.effective_name(),
            previous,
            non_empty(column)?,
            ctx,
        )),
    };
    if condition.is_empty() {
        return Err(BuildError::InvalidFrom(format!(
            "join on {} has an empty condition",
            join.name
        )));
    }
    let (where_sql, where_binds) = compile_where(&condition, ctx)?;
    let body = where_sql.strip_prefix("WHERE ").unwrap_or(&where_sql);
    let body = strip_enclosing_parens(body, ctx);

    sql.push_str(" ON ( ");
    sql.push_str(body);
    sql.push_str(" )");
    binds.extend(where_binds);
    Ok(())
}

/// `USING (col)` as `current.col = previous.col`, with the previous side raw.
fn using_condition(current: &str, previous: &str, column: &str, ctx: &QueryContext) -> Condition {
    let sep = ctx.separator();
    let rhs = ctx.quote_identifier(&format!("{previous}{sep}{column}"));
    Condition::all([Condition::Compare {
        column: format!("{current}{sep}{column}"),
        predicate: Predicate::Cmp(CmpOp::Eq, Operand::Raw(rhs)),
    }])
}

fn push_list_separator(sql: &mut String) {
    if !sql.is_empty() {
        sql.push_str(", ");
    }
}

fn non_empty(name: &str) -> Result<&str> {
    if name.trim().is_empty() {
        return Err(BuildError::InvalidFrom(String::from("empty table name")));
    }
    Ok(name)
}

/// Removes parentheses that enclose the whole fragment.
///
/// A pair is only removed when the opening parenthesis is closed by the
/// final character; `(a) AND (b)` is left alone. Parentheses inside string
/// literals and quoted identifiers are ignored.
pub(crate) fn strip_enclosing_parens<'a>(sql: &'a str, ctx: &QueryContext) -> &'a str {
    let mut sql = sql.trim();
    while sql.starts_with('(') && sql.ends_with(')') && first_paren_closes_last(sql, ctx) {
        sql = sql[1..sql.len() - 1].trim();
    }
    sql
}

fn first_paren_closes_last(sql: &str, ctx: &QueryContext) -> bool {
    let (open_quote, close_quote) = ctx.quote_chars();
    let last = sql.len() - 1;
    let mut depth = 0_usize;
    let mut closing: Option<char> = None;

    for (i, c) in sql.char_indices() {
        if let Some(end) = closing {
            if c == end {
                closing = None;
            }
            continue;
        }
        match c {
            '\'' => closing = Some('\''),
            c if c == open_quote => closing = Some(close_quote),
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i == last;
                }
            }
            _ => {}
        }
    }
    false
}
