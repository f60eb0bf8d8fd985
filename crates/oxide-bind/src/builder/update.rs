//! UPDATE statement builder using the typestate pattern.

use std::marker::PhantomData;

use tracing::debug;

use super::condition::{compile_where, render_operand, Condition, IntoOperand, Operand};
use crate::context::QueryContext;
use crate::error::{BuildError, Result};
use crate::resolver::CompiledQuery;
use crate::value::Bind;

/// A complete UPDATE description.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateSpec {
    /// Target table.
    pub table: String,
    /// `SET` assignments, in order.
    pub set: Vec<(String, Operand)>,
    /// WHERE condition.
    pub where_clause: Option<Condition>,
}

impl UpdateSpec {
    /// Compiles `UPDATE "t" SET "a" = ?, ... [WHERE ...]`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidStatement`] for an empty table or SET
    /// list; condition compiler errors propagate.
    pub fn compile(&self, ctx: &QueryContext) -> Result<CompiledQuery> {
        if self.table.trim().is_empty() || self.set.is_empty() {
            return Err(BuildError::InvalidStatement(String::from(
                "UPDATE needs a table and at least one assignment",
            )));
        }

        let mut binds = vec![];
        let assignments: Vec<String> = self
            .set
            .iter()
            .map(|(column, value)| {
                format!(
                    "{} = {}",
                    ctx.quote_identifier(column),
                    render_operand(value, ctx, &mut binds)
                )
            })
            .collect();
        let mut sql = format!(
            "UPDATE {} SET {}",
            ctx.quote_identifier(&self.table),
            assignments.join(", ")
        );

        if let Some(cond) = self.where_clause.as_ref().filter(|c| !c.is_empty()) {
            let (where_sql, where_binds) = compile_where(cond, ctx)?;
            sql.push(' ');
            sql.push_str(&where_sql);
            binds.extend(where_binds);
        }

        debug!(placeholders = binds.len(), "compiled UPDATE");
        Ok(CompiledQuery::new(sql, binds))
    }
}

// Typestate markers

/// Marker: No SET clause specified yet.
pub struct NoSet;
/// Marker: SET clause has been specified.
pub struct HasSet;

/// A fluent UPDATE builder.
pub struct Update<Set> {
    spec: UpdateSpec,
    _state: PhantomData<Set>,
}

impl Update<NoSet> {
    /// Starts an UPDATE of `table`.
    #[must_use]
    pub fn table(table: &str) -> Self {
        Self {
            spec: UpdateSpec {
                table: String::from(table),
                set: vec![],
                where_clause: None,
            },
            _state: PhantomData,
        }
    }

    /// Adds the first SET assignment.
    #[must_use]
    pub fn set(self, column: &str, value: impl IntoOperand) -> Update<HasSet> {
        let mut spec = self.spec;
        spec.set.push((String::from(column), value.into_operand()));
        Update {
            spec,
            _state: PhantomData,
        }
    }
}

// Methods available after SET
impl Update<HasSet> {
    /// Adds another SET assignment.
    #[must_use]
    pub fn set(mut self, column: &str, value: impl IntoOperand) -> Self {
        self.spec
            .set
            .push((String::from(column), value.into_operand()));
        self
    }

    /// Adds a WHERE clause.
    #[must_use]
    pub fn where_clause(mut self, cond: Condition) -> Self {
        self.spec.where_clause = Some(cond);
        self
    }

    /// Returns the finished description.
    #[must_use]
    pub fn into_spec(self) -> UpdateSpec {
        self.spec
    }

    /// Compiles once and returns the SQL with its binds.
    ///
    /// # Errors
    ///
    /// See [`UpdateSpec::compile`].
    pub fn build(self, ctx: &QueryContext) -> Result<(String, Vec<Bind>)> {
        Ok(self.spec.compile(ctx)?.into_parts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::condition::{col, raw};
    use crate::value::token;

    #[test]
    fn test_update_set_before_where() {
        let compiled = Update::table("users")
            .set("name", token("name"))
            .set("visits", raw("\"visits\" + 1"))
            .where_clause(col("id").eq(token("id")))
            .into_spec()
            .compile(&QueryContext::default())
            .unwrap();
        assert_eq!(
            compiled.sql(),
            "UPDATE \"users\" SET \"name\" = ?, \"visits\" = \"visits\" + 1 WHERE \"id\" = ?"
        );
        assert_eq!(compiled.token_names(), vec!["name", "id"]);
    }

    #[test]
    fn test_update_without_where() {
        let (sql, binds) = Update::table("users")
            .set("active", false)
            .build(&QueryContext::default())
            .unwrap();
        assert_eq!(sql, "UPDATE \"users\" SET \"active\" = ?");
        assert_eq!(binds.len(), 1);
    }

    #[test]
    fn test_update_empty_set_is_error() {
        let spec = UpdateSpec {
            table: String::from("users"),
            set: vec![],
            where_clause: None,
        };
        assert!(matches!(
            spec.compile(&QueryContext::default()),
            Err(BuildError::InvalidStatement(_))
        ));
    }
}
