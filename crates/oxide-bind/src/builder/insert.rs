//! INSERT statement builder using the typestate pattern.

use std::marker::PhantomData;

use tracing::debug;

use crate::context::QueryContext;
use crate::error::{BuildError, Result};
use crate::resolver::CompiledQuery;
use crate::value::{Bind, IntoBind};

/// A complete INSERT description.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertSpec {
    /// Target table.
    pub table: String,
    /// Column names.
    pub columns: Vec<String>,
    /// One bind per column, per row.
    pub rows: Vec<Vec<Bind>>,
}

impl InsertSpec {
    /// Compiles `INSERT INTO "t" ( "a", "b" ) VALUES ( ?, ? ), ...`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidStatement`] for an empty table, no
    /// columns, no rows, or a row whose length differs from the column list.
    pub fn compile(&self, ctx: &QueryContext) -> Result<CompiledQuery> {
        if self.table.trim().is_empty() {
            return Err(BuildError::InvalidStatement(String::from(
                "INSERT without a table",
            )));
        }
        if self.columns.is_empty() || self.rows.is_empty() {
            return Err(BuildError::InvalidStatement(String::from(
                "INSERT needs at least one column and one row",
            )));
        }

        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| ctx.quote_identifier(c))
            .collect();
        let mut sql = format!(
            "INSERT INTO {} ( {} ) VALUES ",
            ctx.quote_identifier(&self.table),
            columns.join(", ")
        );
        let mut binds = Vec::with_capacity(self.columns.len() * self.rows.len());

        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(BuildError::InvalidStatement(format!(
                    "row {i} has {} values for {} columns",
                    row.len(),
                    self.columns.len()
                )));
            }
            if i > 0 {
                sql.push_str(", ");
            }
            let placeholders: Vec<&str> = row.iter().map(|_| "?").collect();
            sql.push_str("( ");
            sql.push_str(&placeholders.join(", "));
            sql.push_str(" )");
            binds.extend(row.iter().cloned());
        }

        debug!(placeholders = binds.len(), "compiled INSERT");
        Ok(CompiledQuery::new(sql, binds))
    }
}

// Typestate markers

/// Marker: No values specified yet.
pub struct NoValues;
/// Marker: Values have been specified.
pub struct HasValues;

/// A fluent INSERT builder.
pub struct Insert<Values> {
    spec: InsertSpec,
    _state: PhantomData<Values>,
}

impl Insert<NoValues> {
    /// Starts an INSERT into `table`.
    #[must_use]
    pub fn into_table(table: &str) -> Self {
        Self {
            spec: InsertSpec {
                table: String::from(table),
                columns: vec![],
                rows: vec![],
            },
            _state: PhantomData,
        }
    }

    /// Specifies the columns to insert into.
    #[must_use]
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.spec.columns = cols.iter().map(|s| String::from(*s)).collect();
        self
    }

    /// Adds the first row of values.
    #[must_use]
    pub fn values<T: IntoBind>(self, vals: Vec<T>) -> Insert<HasValues> {
        let mut spec = self.spec;
        spec.rows.push(vals.into_iter().map(IntoBind::into_bind).collect());
        Insert {
            spec,
            _state: PhantomData,
        }
    }
}

// Methods available after adding values
impl Insert<HasValues> {
    /// Adds another row of values.
    #[must_use]
    pub fn and_values<T: IntoBind>(mut self, vals: Vec<T>) -> Self {
        self.spec
            .rows
            .push(vals.into_iter().map(IntoBind::into_bind).collect());
        self
    }

    /// Returns the finished description.
    #[must_use]
    pub fn into_spec(self) -> InsertSpec {
        self.spec
    }

    /// Compiles once and returns the SQL with its binds.
    ///
    /// # Errors
    ///
    /// See [`InsertSpec::compile`].
    pub fn build(self, ctx: &QueryContext) -> Result<(String, Vec<Bind>)> {
        Ok(self.spec.compile(ctx)?.into_parts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{token, SqlValue};

    #[test]
    fn test_insert_single_row() {
        let (sql, binds) = Insert::into_table("users")
            .columns(&["name", "email"])
            .values(vec!["Alice", "alice@example.com"])
            .build(&QueryContext::default())
            .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO \"users\" ( \"name\", \"email\" ) VALUES ( ?, ? )"
        );
        assert_eq!(binds[0], Bind::Value(SqlValue::Text(String::from("Alice"))));
    }

    #[test]
    fn test_insert_tokens_and_rows() {
        let spec = Insert::into_table("users")
            .columns(&["id", "name"])
            .values(vec![token("id1"), token("name1")])
            .and_values(vec![token("id2"), token("name2")])
            .into_spec();
        let compiled = spec.compile(&QueryContext::default()).unwrap();
        assert!(compiled.sql().ends_with("VALUES ( ?, ? ), ( ?, ? )"));
        assert_eq!(
            compiled.token_names(),
            vec!["id1", "name1", "id2", "name2"]
        );
    }

    #[test]
    fn test_insert_row_length_mismatch() {
        let err = Insert::into_table("users")
            .columns(&["id", "name"])
            .values(vec![1])
            .build(&QueryContext::default())
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidStatement(_)));
    }
}
