//! Compiled queries and value-token resolution.
//!
//! A [`CompiledQuery`] keeps the bind sequence produced at compile time.
//! Resolving it against a name→value lookup yields the positional values a
//! prepared-statement API expects, so one compiled statement can serve any
//! number of executions.

use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use crate::error::ResolveError;
use crate::value::{Bind, SqlValue};

/// A name→value lookup used to resolve value tokens.
pub trait ValueSource {
    /// Returns the value bound to `name`, if any.
    fn value_for(&self, name: &str) -> Option<&SqlValue>;
}

impl ValueSource for HashMap<String, SqlValue> {
    fn value_for(&self, name: &str) -> Option<&SqlValue> {
        self.get(name)
    }
}

impl ValueSource for BTreeMap<String, SqlValue> {
    fn value_for(&self, name: &str) -> Option<&SqlValue> {
        self.get(name)
    }
}

impl ValueSource for [(&str, SqlValue)] {
    fn value_for(&self, name: &str) -> Option<&SqlValue> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}

impl<const N: usize> ValueSource for [(&str, SqlValue); N] {
    fn value_for(&self, name: &str) -> Option<&SqlValue> {
        self.as_slice().value_for(name)
    }
}

/// The immutable result of compiling a statement.
///
/// `binds` holds exactly one entry per `?` in `sql`, in textual order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    sql: String,
    binds: Vec<Bind>,
}

impl CompiledQuery {
    pub(crate) fn new(sql: String, binds: Vec<Bind>) -> Self {
        Self { sql, binds }
    }

    /// Returns the SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the bind sequence, one per placeholder.
    #[must_use]
    pub fn binds(&self) -> &[Bind] {
        &self.binds
    }

    /// Returns the number of placeholders.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.binds.len()
    }

    /// Returns one entry per placeholder, in placeholder order.
    ///
    /// A value token yields `Some(name)`. A value fixed at build time, such
    /// as a literal limit or the `0` a rownum window binds for a missing
    /// offset, yields `None` and needs no lookup when resolving.
    #[must_use]
    pub fn value_token_names(&self) -> Vec<Option<&str>> {
        self.binds.iter().map(Bind::token_name).collect()
    }

    /// Returns the names of the value tokens only, in placeholder order.
    #[must_use]
    pub fn token_names(&self) -> Vec<&str> {
        self.binds.iter().filter_map(Bind::token_name).collect()
    }

    /// Resolves every bind to a concrete value.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::MissingValue`] for the first token whose name
    /// is absent from `values`.
    pub fn resolve<S: ValueSource + ?Sized>(
        &self,
        values: &S,
    ) -> Result<Vec<SqlValue>, ResolveError> {
        self.binds
            .iter()
            .map(|bind| match bind {
                Bind::Value(v) => Ok(v.clone()),
                Bind::Token(t) => {
                    values
                        .value_for(t.name())
                        .cloned()
                        .ok_or_else(|| ResolveError::MissingValue {
                            name: String::from(t.name()),
                        })
                }
            })
            .collect()
    }

    /// Resolves every bind, substituting NULL for tokens with no value.
    #[must_use]
    pub fn resolve_lenient<S: ValueSource + ?Sized>(&self, values: &S) -> Vec<SqlValue> {
        self.binds
            .iter()
            .map(|bind| match bind {
                Bind::Value(v) => v.clone(),
                Bind::Token(t) => values.value_for(t.name()).cloned().unwrap_or_else(|| {
                    warn!(token = t.name(), "no value supplied, binding NULL");
                    SqlValue::Null
                }),
            })
            .collect()
    }

    /// Consumes the query and returns the SQL and binds.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<Bind>) {
        (self.sql, self.binds)
    }
}

/// Counts `?` placeholders outside quoted text.
#[cfg(test)]
pub(crate) fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut in_string = false;
    for c in sql.chars() {
        match c {
            '\'' => in_string = !in_string,
            '?' if !in_string => count += 1,
            _ => {}
        }
    }
    count
}
