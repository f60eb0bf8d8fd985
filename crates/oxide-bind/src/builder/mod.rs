//! Statement builders.
//!
//! Each statement kind has a plain description (`SelectSpec`,
//! `InsertSpec`, ...) that compiles to a [`CompiledQuery`](crate::CompiledQuery),
//! and a fluent builder that uses the typestate pattern so an incomplete
//! statement does not type-check.
//!
//! # Example
//!
//! ```rust
//! use oxide_bind::builder::{col, Select};
//! use oxide_bind::{token, QueryContext};
//!
//! let (sql, binds) = Select::new()
//!     .fields(&["id", "name"])
//!     .from("users")
//!     .where_clause(col("active").eq(true))
//!     .limit(token("page_size"))
//!     .build(&QueryContext::default())
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT \"id\", \"name\" FROM \"users\" WHERE \"active\" = ? LIMIT ?"
//! );
//! assert_eq!(binds.len(), 2);
//! ```

mod clauses;
mod condition;
mod delete;
mod from;
mod insert;
mod limit;
mod select;
mod statement;
mod update;

pub use clauses::{append_group_by, append_order_by, Direction, OrderTerm};
pub use condition::{
    col, column_ref, compile_where, raw, CmpOp, Column, Condition, IntoOperand, Operand,
    Predicate,
};
pub use delete::{Delete, DeleteSpec};
pub use from::{compile_from, Join, JoinBuilder, JoinConstraint, JoinKind, TableRef};
pub use insert::{HasValues, Insert, InsertSpec, NoValues};
pub use limit::apply_limit;
pub use select::{Field, HasFrom, NoFrom, Select, SelectOptions, SelectSpec};
pub use statement::{Compile, SelectStatement, Statement};
pub use update::{HasSet, NoSet, Update, UpdateSpec};
