//! Bind values and value tokens.
//!
//! Every `?` placeholder in a compiled statement is backed by a [`Bind`]:
//! either a value fixed when the statement was built, or a named
//! [`ValueToken`] that is looked up when the statement is executed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A SQL value that can be used as a parameter.
///
/// All values are parameterized; `to_sql_inline` exists for diagnostics only.
/// Serialized untagged, so JSON scalars map directly onto variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns the SQL representation for inline use (escaped).
    ///
    /// **Warning**: Prefer using parameterized queries instead.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(true) => String::from("TRUE"),
            Self::Bool(false) => String::from("FALSE"),
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => {
                let escaped = s.replace('\'', "''");
                format!("'{escaped}'")
            }
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
        }
    }

    /// Returns true for `SqlValue::Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

macro_rules! int_to_sql_value {
    ($($ty:ty),*) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::Int(i64::from(self))
                }
            }
        )*
    };
}

int_to_sql_value!(i64, i32, i16, i8, u32, u16, u8);

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

/// A named placeholder standing in for a value supplied at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValueToken {
    name: String,
}

impl ValueToken {
    /// Creates a token with the given logical name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the logical name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ValueToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.name)
    }
}

/// Shorthand for [`ValueToken::new`].
#[must_use]
pub fn token(name: impl Into<String>) -> ValueToken {
    ValueToken::new(name)
}

/// What a single `?` placeholder stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    /// A value fixed when the statement was built.
    Value(SqlValue),
    /// A value looked up by name when the statement is resolved.
    Token(ValueToken),
}

impl Bind {
    /// Returns the token name, if this bind is a token.
    #[must_use]
    pub fn token_name(&self) -> Option<&str> {
        match self {
            Self::Token(t) => Some(t.name()),
            Self::Value(_) => None,
        }
    }
}

/// Types that can stand behind a placeholder.
pub trait IntoBind {
    /// Converts into a `Bind`.
    fn into_bind(self) -> Bind;
}

impl<T: ToSqlValue> IntoBind for T {
    fn into_bind(self) -> Bind {
        Bind::Value(self.to_sql_value())
    }
}

impl IntoBind for ValueToken {
    fn into_bind(self) -> Bind {
        Bind::Token(self)
    }
}

impl IntoBind for Bind {
    fn into_bind(self) -> Bind {
        self
    }
}
