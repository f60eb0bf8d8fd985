//! Reusable statement objects.
//!
//! A [`Statement`] pairs a description with the context it is compiled
//! for. Compilation happens on first access, exactly once even under
//! concurrent first access, and the result is kept for the statement's
//! lifetime. Each execution then only resolves value tokens.

use std::sync::{Arc, OnceLock};

use super::condition::Condition;
use super::delete::DeleteSpec;
use super::from::TableRef;
use super::insert::InsertSpec;
use super::select::{Field, SelectOptions, SelectSpec};
use super::update::UpdateSpec;
use crate::context::QueryContext;
use crate::error::{Error, Result};
use crate::resolver::{CompiledQuery, ValueSource};
use crate::value::SqlValue;

/// A statement description that can be compiled for a context.
pub trait Compile {
    /// Statement kind, for diagnostics.
    const KIND: &'static str;

    /// Compiles the description.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`](crate::BuildError) for a malformed description.
    fn compile(&self, ctx: &QueryContext) -> Result<CompiledQuery>;
}

impl Compile for SelectSpec {
    const KIND: &'static str = "SELECT";

    fn compile(&self, ctx: &QueryContext) -> Result<CompiledQuery> {
        Self::compile(self, ctx)
    }
}

impl Compile for InsertSpec {
    const KIND: &'static str = "INSERT";

    fn compile(&self, ctx: &QueryContext) -> Result<CompiledQuery> {
        Self::compile(self, ctx)
    }
}

impl Compile for UpdateSpec {
    const KIND: &'static str = "UPDATE";

    fn compile(&self, ctx: &QueryContext) -> Result<CompiledQuery> {
        Self::compile(self, ctx)
    }
}

impl Compile for DeleteSpec {
    const KIND: &'static str = "DELETE";

    fn compile(&self, ctx: &QueryContext) -> Result<CompiledQuery> {
        Self::compile(self, ctx)
    }
}

/// A description bound to a context, compiled lazily and cached.
///
/// Failed compilation is cached as well; the same error is returned on
/// every access.
#[derive(Debug)]
pub struct Statement<S> {
    spec: S,
    ctx: Arc<QueryContext>,
    compiled: OnceLock<Result<CompiledQuery>>,
}

/// A SELECT statement object.
pub type SelectStatement = Statement<SelectSpec>;

impl<S: Compile> Statement<S> {
    /// Binds a description to a context.
    #[must_use]
    pub fn new(ctx: impl Into<Arc<QueryContext>>, spec: S) -> Self {
        Self {
            spec,
            ctx: ctx.into(),
            compiled: OnceLock::new(),
        }
    }

    /// Returns the compiled query, compiling on first access.
    ///
    /// # Errors
    ///
    /// Returns the [`BuildError`](crate::BuildError) compilation produced.
    pub fn compiled(&self) -> Result<&CompiledQuery> {
        self.compiled
            .get_or_init(|| self.spec.compile(&self.ctx))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Returns the SQL text.
    ///
    /// # Errors
    ///
    /// See [`Statement::compiled`].
    pub fn sql(&self) -> Result<&str> {
        Ok(self.compiled()?.sql())
    }

    /// Returns one entry per placeholder; see
    /// [`CompiledQuery::value_token_names`].
    ///
    /// # Errors
    ///
    /// See [`Statement::compiled`].
    pub fn value_token_names(&self) -> Result<Vec<Option<&str>>> {
        Ok(self.compiled()?.value_token_names())
    }

    /// Returns the value token names only, in placeholder order.
    ///
    /// # Errors
    ///
    /// See [`Statement::compiled`].
    pub fn token_names(&self) -> Result<Vec<&str>> {
        Ok(self.compiled()?.token_names())
    }

    /// Resolves the bind values for one execution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Build`] if the statement does not compile and
    /// [`Error::Resolve`] if a token has no value.
    pub fn resolve<V: ValueSource + ?Sized>(
        &self,
        values: &V,
    ) -> std::result::Result<Vec<SqlValue>, Error> {
        Ok(self.compiled()?.resolve(values)?)
    }

    /// Returns the description.
    #[must_use]
    pub const fn spec(&self) -> &S {
        &self.spec
    }

    /// Returns the context.
    #[must_use]
    pub fn context(&self) -> &QueryContext {
        &self.ctx
    }

    /// Returns the statement kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        S::KIND
    }
}

impl SelectStatement {
    /// Creates a SELECT statement from positional parts.
    #[must_use]
    pub fn select(
        ctx: impl Into<Arc<QueryContext>>,
        fields: Vec<Field>,
        from: Vec<TableRef>,
        where_clause: Option<Condition>,
        options: SelectOptions,
    ) -> Self {
        Self::new(ctx, SelectSpec::new(fields, from, where_clause, options))
    }
}
