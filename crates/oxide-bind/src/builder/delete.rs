//! DELETE statement builder.

use tracing::{debug, warn};

use super::condition::{compile_where, Condition};
use crate::context::QueryContext;
use crate::error::{BuildError, Result};
use crate::resolver::CompiledQuery;
use crate::value::Bind;

/// A complete DELETE description.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteSpec {
    /// Target table.
    pub table: String,
    /// WHERE condition; without one every row is deleted.
    pub where_clause: Option<Condition>,
}

impl DeleteSpec {
    /// Compiles `DELETE FROM "t" [WHERE ...]`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidStatement`] for an empty table;
    /// condition compiler errors propagate.
    pub fn compile(&self, ctx: &QueryContext) -> Result<CompiledQuery> {
        if self.table.trim().is_empty() {
            return Err(BuildError::InvalidStatement(String::from(
                "DELETE without a table",
            )));
        }

        let mut sql = format!("DELETE FROM {}", ctx.quote_identifier(&self.table));
        let binds = if let Some(cond) = self.where_clause.as_ref().filter(|c| !c.is_empty()) {
            let (where_sql, where_binds) = compile_where(cond, ctx)?;
            sql.push(' ');
            sql.push_str(&where_sql);
            where_binds
        } else {
            warn!(table = %self.table, "DELETE without WHERE removes every row");
            vec![]
        };

        debug!(placeholders = binds.len(), "compiled DELETE");
        Ok(CompiledQuery::new(sql, binds))
    }
}

/// A fluent DELETE builder.
///
/// **Important**: DELETE without WHERE deletes all rows!
pub struct Delete {
    spec: DeleteSpec,
}

impl Delete {
    /// Starts a DELETE from `table`.
    #[must_use]
    pub fn from(table: &str) -> Self {
        Self {
            spec: DeleteSpec {
                table: String::from(table),
                where_clause: None,
            },
        }
    }

    /// Adds a WHERE clause.
    #[must_use]
    pub fn where_clause(mut self, cond: Condition) -> Self {
        self.spec.where_clause = Some(cond);
        self
    }

    /// Returns the finished description.
    #[must_use]
    pub fn into_spec(self) -> DeleteSpec {
        self.spec
    }

    /// Compiles once and returns the SQL with its binds.
    ///
    /// # Errors
    ///
    /// See [`DeleteSpec::compile`].
    pub fn build(self, ctx: &QueryContext) -> Result<(String, Vec<Bind>)> {
        Ok(self.spec.compile(ctx)?.into_parts())
    }
}
