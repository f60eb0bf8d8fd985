//! Oracle dialect.

use super::{Dialect, LimitDialect};

/// Oracle dialect.
///
/// Pre-12c Oracle has no LIMIT clause, so pagination goes through `ROWNUM`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OracleDialect;

impl OracleDialect {
    /// Creates a new Oracle dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn limit_dialect(&self) -> LimitDialect {
        LimitDialect::RowNum
    }
}
