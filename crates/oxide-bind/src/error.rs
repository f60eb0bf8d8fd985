//! Error types for statement building, resolution and configuration.

use thiserror::Error;

/// A statement description that cannot be compiled.
///
/// These are fatal to the compile call and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Malformed FROM clause entry or chain.
    #[error("invalid FROM clause: {0}")]
    InvalidFrom(String),

    /// A condition the condition compiler rejects.
    #[error("invalid condition: {0}")]
    InvalidCondition(String),

    /// Malformed INSERT/UPDATE/DELETE/SELECT description.
    #[error("invalid statement: {0}")]
    InvalidStatement(String),

    /// A JSON statement description with the wrong shape.
    #[error("invalid statement description: {0}")]
    Description(String),
}

/// A bind value that could not be resolved at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The value mapping has no entry for a token.
    #[error("no value supplied for token '{name}'")]
    MissingValue {
        /// Name of the unresolved token.
        name: String,
    },
}

/// Invalid query context configuration, detected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The dialect name is not known.
    #[error("unknown dialect: {0}")]
    UnknownDialect(String),

    /// The limit dialect identifier is not one of `offset`, `xy`, `rownum`.
    #[error("unknown limit dialect: {0}")]
    UnknownLimitDialect(String),

    /// The quote setting must be one or two characters.
    #[error("invalid identifier quote: {0:?}")]
    InvalidQuote(String),
}

/// Any error raised by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Compilation failed.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Context configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for statement compilation.
pub type Result<T, E = BuildError> = std::result::Result<T, E>;
