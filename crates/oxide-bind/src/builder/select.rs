//! SELECT statement builder.
//!
//! [`SelectSpec`] is the plain description of a query; [`Select`] builds one
//! fluently, using the typestate pattern so that a query without a FROM
//! clause cannot be compiled.
//!
//! Compilation runs a fixed pipeline: FROM chain, base SELECT with WHERE,
//! GROUP BY, ORDER BY, then LIMIT/OFFSET. Binds come out in the order
//! their placeholders appear: join conditions, WHERE, pagination.

use std::marker::PhantomData;

use tracing::debug;

use super::clauses::{append_group_by, append_order_by, OrderTerm};
use super::condition::{compile_where, Condition};
use super::from::{compile_from, Join, TableRef};
use super::limit::apply_limit;
use crate::context::QueryContext;
use crate::error::{BuildError, Result};
use crate::resolver::CompiledQuery;
use crate::value::{Bind, IntoBind};

/// A selected column or expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// A column name, quoted.
    Column(String),
    /// An expression emitted verbatim, e.g. `COUNT(*) AS n`.
    Raw(String),
}

impl From<&str> for Field {
    fn from(name: &str) -> Self {
        Self::Column(String::from(name))
    }
}

impl From<String> for Field {
    fn from(name: String) -> Self {
        Self::Column(name)
    }
}

/// Optional SELECT clauses, for the positional constructor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectOptions {
    /// GROUP BY columns.
    pub group_by: Vec<String>,
    /// ORDER BY entries.
    pub order_by: Vec<OrderTerm>,
    /// Row limit.
    pub limit: Option<Bind>,
    /// Rows to skip; only used together with `limit`.
    pub offset: Option<Bind>,
}

/// A complete SELECT description.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectSpec {
    /// Selected fields; empty means `*`.
    pub fields: Vec<Field>,
    /// FROM chain.
    pub from: Vec<TableRef>,
    /// WHERE condition.
    pub where_clause: Option<Condition>,
    /// GROUP BY columns.
    pub group_by: Vec<String>,
    /// ORDER BY entries.
    pub order_by: Vec<OrderTerm>,
    /// Row limit.
    pub limit: Option<Bind>,
    /// Rows to skip; only used together with `limit`.
    pub offset: Option<Bind>,
}

impl SelectSpec {
    /// Creates a description from positional parts.
    #[must_use]
    pub fn new(
        fields: Vec<Field>,
        from: Vec<TableRef>,
        where_clause: Option<Condition>,
        options: SelectOptions,
    ) -> Self {
        Self {
            fields,
            from,
            where_clause,
            group_by: options.group_by,
            order_by: options.order_by,
            limit: options.limit,
            offset: options.offset,
        }
    }

    /// Compiles the description.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] for a malformed FROM chain, an empty field
    /// name, or a condition the condition compiler rejects.
    pub fn compile(&self, ctx: &QueryContext) -> Result<CompiledQuery> {
        let (from_sql, mut binds) = compile_from(&self.from, ctx)?;

        let mut sql = String::from("SELECT ");
        sql.push_str(&self.render_fields(ctx)?);
        sql.push_str(" FROM ");
        sql.push_str(&from_sql);

        if let Some(cond) = self.where_clause.as_ref().filter(|c| !c.is_empty()) {
            let (where_sql, where_binds) = compile_where(cond, ctx)?;
            sql.push(' ');
            sql.push_str(&where_sql);
            binds.extend(where_binds);
        }

        append_group_by(&mut sql, &self.group_by, ctx);
        append_order_by(&mut sql, &self.order_by, ctx);

        let sql = apply_limit(
            sql,
            &mut binds,
            self.limit.as_ref(),
            self.offset.as_ref(),
            ctx,
        );

        debug!(
            dialect = ctx.dialect(),
            placeholders = binds.len(),
            "compiled SELECT"
        );
        Ok(CompiledQuery::new(sql, binds))
    }

    fn render_fields(&self, ctx: &QueryContext) -> Result<String> {
        if self.fields.is_empty() {
            return Ok(String::from("*"));
        }
        let mut out = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            match field {
                Field::Column(name) if name.trim().is_empty() => {
                    return Err(BuildError::InvalidStatement(String::from(
                        "empty field name",
                    )));
                }
                Field::Column(name) => out.push(ctx.quote_identifier(name)),
                Field::Raw(sql) => out.push(sql.clone()),
            }
        }
        Ok(out.join(", "))
    }
}

// Typestate markers (zero-sized types)

/// Marker: No FROM clause specified yet.
pub struct NoFrom;
/// Marker: FROM clause has been specified.
pub struct HasFrom;

/// A fluent SELECT builder.
///
/// Uses the typestate pattern to ensure that:
/// - `build()` and `into_spec()` are only available once FROM is specified
/// - joins, WHERE and the trailing clauses follow FROM
pub struct Select<From> {
    spec: SelectSpec,
    _state: PhantomData<From>,
}

impl Select<NoFrom> {
    /// Creates a new SELECT builder selecting `*`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            spec: SelectSpec::new(vec![], vec![], None, SelectOptions::default()),
            _state: PhantomData,
        }
    }

    /// Specifies the first table to select from.
    #[must_use]
    pub fn from(mut self, table: impl Into<TableRef>) -> Select<HasFrom> {
        self.spec.from.push(table.into());
        Select {
            spec: self.spec,
            _state: PhantomData,
        }
    }

    /// Specifies the first table with an alias.
    #[must_use]
    pub fn from_aliased(self, table: &str, alias: &str) -> Select<HasFrom> {
        self.from(TableRef::aliased(table, alias))
    }

    /// Specifies a raw FROM fragment, emitted unquoted.
    #[must_use]
    pub fn from_raw(self, sql: &str) -> Select<HasFrom> {
        self.from(TableRef::raw(sql))
    }
}

impl Default for Select<NoFrom> {
    fn default() -> Self {
        Self::new()
    }
}

impl<From> Select<From> {
    /// Specifies the columns to select.
    #[must_use]
    pub fn fields(mut self, cols: &[&str]) -> Self {
        self.spec.fields.extend(cols.iter().map(|c| Field::from(*c)));
        self
    }

    /// Adds a raw select expression.
    #[must_use]
    pub fn field_raw(mut self, sql: &str) -> Self {
        self.spec.fields.push(Field::Raw(String::from(sql)));
        self
    }
}

// Methods available after FROM
impl Select<HasFrom> {
    /// Adds another comma-separated table.
    #[must_use]
    pub fn also_from(mut self, table: impl Into<TableRef>) -> Self {
        self.spec.from.push(table.into());
        self
    }

    /// Joins a table to the previous FROM entry.
    #[must_use]
    pub fn join(mut self, join: Join) -> Self {
        self.spec.from.push(TableRef::Joined(join));
        self
    }

    /// Adds a WHERE clause.
    #[must_use]
    pub fn where_clause(mut self, cond: Condition) -> Self {
        self.spec.where_clause = Some(cond);
        self
    }

    /// Adds a GROUP BY clause.
    #[must_use]
    pub fn group_by(mut self, cols: &[&str]) -> Self {
        self.spec.group_by = cols.iter().map(|s| String::from(*s)).collect();
        self
    }

    /// Adds ORDER BY columns without a direction.
    #[must_use]
    pub fn order_by(mut self, cols: &[&str]) -> Self {
        self.spec
            .order_by
            .extend(cols.iter().map(|c| OrderTerm::from(*c)));
        self
    }

    /// Adds ORDER BY DESC columns.
    #[must_use]
    pub fn order_by_desc(mut self, cols: &[&str]) -> Self {
        self.spec
            .order_by
            .extend(cols.iter().map(|c| OrderTerm::desc(*c)));
        self
    }

    /// Adds one ORDER BY entry.
    #[must_use]
    pub fn order_by_term(mut self, term: OrderTerm) -> Self {
        self.spec.order_by.push(term);
        self
    }

    /// Adds a LIMIT clause.
    #[must_use]
    pub fn limit(mut self, n: impl IntoBind) -> Self {
        self.spec.limit = Some(n.into_bind());
        self
    }

    /// Adds an OFFSET clause (ignored without a limit).
    #[must_use]
    pub fn offset(mut self, n: impl IntoBind) -> Self {
        self.spec.offset = Some(n.into_bind());
        self
    }

    /// Returns the finished description.
    #[must_use]
    pub fn into_spec(self) -> SelectSpec {
        self.spec
    }

    /// Compiles once and returns the SQL with its binds.
    ///
    /// # Errors
    ///
    /// See [`SelectSpec::compile`].
    pub fn build(self, ctx: &QueryContext) -> Result<(String, Vec<Bind>)> {
        Ok(self.spec.compile(ctx)?.into_parts())
    }
}
