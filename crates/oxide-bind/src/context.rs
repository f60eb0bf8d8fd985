//! Query context shared by every statement built for one database.
//!
//! A [`QueryContext`] is created once per application (or connection) and
//! never changes afterwards. It carries the dialect name, the pagination
//! grammar, the identifier quote characters and the name separator, and it
//! is the identifier quoter used by all compilers.

use serde::Deserialize;

use crate::dialect::{dialect_by_name, Dialect, LimitDialect};
use crate::error::ConfigError;

/// Immutable compilation settings derived from a dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryContext {
    dialect: String,
    limit_dialect: LimitDialect,
    quote: (char, char),
    separator: char,
}

impl QueryContext {
    /// Creates a context from a dialect.
    #[must_use]
    pub fn new(dialect: &(impl Dialect + ?Sized)) -> Self {
        Self {
            dialect: String::from(dialect.name()),
            limit_dialect: dialect.limit_dialect(),
            quote: dialect.identifier_quote(),
            separator: dialect.name_separator(),
        }
    }

    /// Creates a context for a built-in dialect name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownDialect`] if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(dialect_by_name(name)?))
    }

    /// Creates a context from a configuration record.
    ///
    /// The named dialect provides the defaults; every other field overrides it.
    ///
    /// # Errors
    ///
    /// Fails on an unknown dialect or limit dialect, or a quote setting that
    /// is not one or two characters long.
    pub fn from_config(config: &ContextConfig) -> Result<Self, ConfigError> {
        let mut ctx = Self::from_name(&config.dialect)?;
        if let Some(limit) = &config.limit_dialect {
            ctx.limit_dialect = limit.parse()?;
        }
        if let Some(quote) = &config.quote {
            let mut chars = quote.chars();
            ctx.quote = match (chars.next(), chars.next(), chars.next()) {
                (Some(q), None, None) => (q, q),
                (Some(open), Some(close), None) => (open, close),
                _ => return Err(ConfigError::InvalidQuote(quote.clone())),
            };
        }
        if let Some(separator) = config.separator {
            ctx.separator = separator;
        }
        Ok(ctx)
    }

    /// Returns the same context with a different pagination grammar.
    #[must_use]
    pub const fn with_limit_dialect(mut self, limit_dialect: LimitDialect) -> Self {
        self.limit_dialect = limit_dialect;
        self
    }

    /// Returns the dialect name.
    #[must_use]
    pub fn dialect(&self) -> &str {
        &self.dialect
    }

    /// Returns the pagination grammar.
    #[must_use]
    pub const fn limit_dialect(&self) -> LimitDialect {
        self.limit_dialect
    }

    /// Returns the opening and closing quote characters.
    #[must_use]
    pub const fn quote_chars(&self) -> (char, char) {
        self.quote
    }

    /// Returns the qualified-name separator.
    #[must_use]
    pub const fn separator(&self) -> char {
        self.separator
    }

    /// Quotes a possibly qualified identifier.
    ///
    /// Each separator-delimited part is quoted on its own; `*` is left bare.
    ///
    /// ```rust
    /// use oxide_bind::{dialect::MySqlDialect, QueryContext};
    ///
    /// let ctx = QueryContext::new(&MySqlDialect);
    /// assert_eq!(ctx.quote_identifier("u.id"), "`u`.`id`");
    /// assert_eq!(ctx.quote_identifier("u.*"), "`u`.*");
    /// ```
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        for (i, part) in name.split(self.separator).enumerate() {
            if i > 0 {
                out.push(self.separator);
            }
            self.push_quoted(&mut out, part);
        }
        out
    }

    /// Quotes a single name without splitting on the separator.
    #[must_use]
    pub fn quote_name(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        self.push_quoted(&mut out, name);
        out
    }

    fn push_quoted(&self, out: &mut String, part: &str) {
        if part == "*" {
            out.push('*');
            return;
        }
        let (open, close) = self.quote;
        out.push(open);
        for c in part.chars() {
            if c == close {
                out.push(close);
            }
            out.push(c);
        }
        out.push(close);
    }
}

impl Default for QueryContext {
    fn default() -> Self {
        Self::new(&crate::dialect::GenericDialect)
    }
}

/// Serializable context settings, e.g. read from a JSON config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// Built-in dialect name.
    #[serde(default = "default_dialect")]
    pub dialect: String,
    /// Pagination grammar override (`offset`, `xy`, `rownum`).
    #[serde(default)]
    pub limit_dialect: Option<String>,
    /// Quote override: one character, or opening and closing characters.
    #[serde(default)]
    pub quote: Option<String>,
    /// Name separator override.
    #[serde(default)]
    pub separator: Option<char>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            limit_dialect: None,
            quote: None,
            separator: None,
        }
    }
}

fn default_dialect() -> String {
    String::from("generic")
}
