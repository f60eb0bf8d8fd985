//! SQL Dialect support.
//!
//! Dialects differ in how identifiers are quoted and in how a result set
//! is paginated. A [`Dialect`] describes both; the
//! [`QueryContext`](crate::QueryContext) freezes the choice for every
//! statement built from it.

mod generic;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;

use std::fmt;
use std::str::FromStr;

pub use generic::GenericDialect;
pub use mysql::MySqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::error::ConfigError;

/// Pagination grammar used to render LIMIT/OFFSET.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitDialect {
    /// Trailing `LIMIT ? OFFSET ?`.
    Offset,
    /// Trailing `LIMIT ?, ?` (offset first).
    Xy,
    /// No native LIMIT; the query is wrapped in two subselects filtering on `ROWNUM`.
    RowNum,
}

impl LimitDialect {
    /// Returns the identifier used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Offset => "offset",
            Self::Xy => "xy",
            Self::RowNum => "rownum",
        }
    }
}

impl fmt::Display for LimitDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LimitDialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "offset" => Ok(Self::Offset),
            "xy" => Ok(Self::Xy),
            "rownum" => Ok(Self::RowNum),
            _ => Err(ConfigError::UnknownLimitDialect(String::from(s))),
        }
    }
}

/// Trait for SQL dialect-specific behavior.
pub trait Dialect {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the opening and closing identifier quote characters.
    fn identifier_quote(&self) -> (char, char) {
        ('"', '"')
    }

    /// Returns the separator between qualified name parts (`schema.table.column`).
    fn name_separator(&self) -> char {
        '.'
    }

    /// Returns the pagination grammar.
    fn limit_dialect(&self) -> LimitDialect {
        LimitDialect::Offset
    }
}

/// Looks up a built-in dialect by name.
///
/// Matching is case-insensitive and accepts the usual aliases
/// (`pg`, `postgresql`, `mariadb`).
///
/// # Errors
///
/// Returns [`ConfigError::UnknownDialect`] for any other name.
pub fn dialect_by_name(name: &str) -> Result<&'static dyn Dialect, ConfigError> {
    let dialect: &'static dyn Dialect = match name.to_ascii_lowercase().as_str() {
        "generic" | "ansi" | "standard" => &GenericDialect,
        "postgres" | "postgresql" | "pg" => &PostgresDialect,
        "sqlite" => &SqliteDialect,
        "mysql" | "mariadb" => &MySqlDialect,
        "oracle" => &OracleDialect,
        _ => return Err(ConfigError::UnknownDialect(String::from(name))),
    };
    Ok(dialect)
}
