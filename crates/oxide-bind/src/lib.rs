//! # oxide-bind
//!
//! A database-agnostic SQL statement builder whose compiled queries can be
//! re-bound cheaply.
//!
//! A statement is described once, compiled once into SQL text with `?`
//! placeholders, and then executed any number of times. Values that change
//! between executions are written as named [`ValueToken`]s; each execution
//! only resolves those names against the current values.
//!
//! This crate provides:
//! - SELECT with joins, GROUP BY, ORDER BY and three pagination grammars
//!   (`LIMIT ? OFFSET ?`, `LIMIT ?, ?` and an Oracle `ROWNUM` wrapper)
//! - INSERT, UPDATE and DELETE on the same condition compiler
//! - Statement objects that compile lazily and cache the result
//! - Loading statement descriptions from JSON
//!
//! ## Compile once, bind many times
//!
//! ```rust
//! use oxide_bind::builder::{col, Select};
//! use oxide_bind::{token, QueryContext, SqlValue, Statement};
//!
//! let spec = Select::new()
//!     .fields(&["id", "name"])
//!     .from("users")
//!     .where_clause(col("team_id").eq(token("team")))
//!     .order_by(&["name"])
//!     .limit(25)
//!     .into_spec();
//! let stmt = Statement::new(QueryContext::default(), spec);
//!
//! assert_eq!(
//!     stmt.sql().unwrap(),
//!     "SELECT \"id\", \"name\" FROM \"users\" WHERE \"team_id\" = ? ORDER BY \"name\" LIMIT ?"
//! );
//! let binds = stmt.resolve(&[("team", SqlValue::Int(7))]).unwrap();
//! assert_eq!(binds, vec![SqlValue::Int(7), SqlValue::Int(25)]);
//! ```
//!
//! ## SQL Injection Prevention
//!
//! Values never reach the SQL text; they are always bound:
//!
//! ```rust
//! use oxide_bind::builder::{col, Select};
//! use oxide_bind::QueryContext;
//!
//! let user_input = "'; DROP TABLE users; --";
//! let (sql, binds) = Select::new()
//!     .fields(&["id"])
//!     .from("users")
//!     .where_clause(col("name").eq(user_input))
//!     .build(&QueryContext::default())
//!     .unwrap();
//!
//! assert_eq!(sql, "SELECT \"id\" FROM \"users\" WHERE \"name\" = ?");
//! assert_eq!(binds.len(), 1);
//! ```

pub mod builder;
pub mod context;
pub mod dialect;
pub mod error;
pub mod json;
pub mod resolver;
pub mod value;

pub use builder::{
    col, Condition, Delete, Insert, Join, Select, SelectSpec, SelectStatement, Statement,
    TableRef, Update,
};
pub use context::{ContextConfig, QueryContext};
pub use dialect::{dialect_by_name, Dialect, LimitDialect};
pub use error::{BuildError, ConfigError, Error, ResolveError, Result};
pub use json::StatementDescription;
pub use resolver::{CompiledQuery, ValueSource};
pub use value::{token, Bind, IntoBind, SqlValue, ToSqlValue, ValueToken};
