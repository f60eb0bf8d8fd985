//! MySQL / MariaDB dialect.

use super::{Dialect, LimitDialect};

/// MySQL dialect: backtick quoting and `LIMIT offset, count` pagination.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> (char, char) {
        ('`', '`')
    }

    fn limit_dialect(&self) -> LimitDialect {
        LimitDialect::Xy
    }
}
