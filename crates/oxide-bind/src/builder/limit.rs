//! LIMIT/OFFSET rewriting for the three pagination grammars.
//!
//! Runs last: the `rownum` form wraps everything built so far, so GROUP BY
//! and ORDER BY must already be in place. Binds added here always follow
//! the existing ones, which keeps bind order equal to placeholder order.

use tracing::{debug, trace};

use crate::context::QueryContext;
use crate::dialect::LimitDialect;
use crate::value::{Bind, SqlValue};

/// Applies LIMIT/OFFSET to a complete SELECT.
///
/// Without a limit nothing changes and any offset is ignored. For the
/// `rownum` grammar a missing offset counts as 0.
#[must_use]
pub fn apply_limit(
    sql: String,
    binds: &mut Vec<Bind>,
    limit: Option<&Bind>,
    offset: Option<&Bind>,
    ctx: &QueryContext,
) -> String {
    let Some(limit) = limit else {
        if offset.is_some() {
            debug!("offset without limit is ignored");
        }
        return sql;
    };

    match ctx.limit_dialect() {
        LimitDialect::Offset => limit_offset(sql, binds, limit, offset),
        LimitDialect::Xy => limit_xy(sql, binds, limit, offset),
        LimitDialect::RowNum => limit_rownum(&sql, binds, limit, offset, ctx),
    }
}

/// `... LIMIT ? OFFSET ?`
fn limit_offset(
    mut sql: String,
    binds: &mut Vec<Bind>,
    limit: &Bind,
    offset: Option<&Bind>,
) -> String {
    sql.push_str(" LIMIT ?");
    binds.push(limit.clone());
    if let Some(offset) = offset {
        sql.push_str(" OFFSET ?");
        binds.push(offset.clone());
    }
    sql
}

/// `... LIMIT ?, ?` with the offset first.
fn limit_xy(
    mut sql: String,
    binds: &mut Vec<Bind>,
    limit: &Bind,
    offset: Option<&Bind>,
) -> String {
    sql.push_str(" LIMIT");
    if let Some(offset) = offset {
        sql.push_str(" ?,");
        binds.push(offset.clone());
    }
    sql.push_str(" ?");
    binds.push(limit.clone());
    sql
}

/// Wraps the query twice, filtering on `ROWNUM`.
///
/// Binds: limit, offset (upper bound is `limit + offset`), offset again
/// (exclusive lower bound).
fn limit_rownum(
    sql: &str,
    binds: &mut Vec<Bind>,
    limit: &Bind,
    offset: Option<&Bind>,
    ctx: &QueryContext,
) -> String {
    let inner = ctx.quote_name("A");
    let outer = ctx.quote_name("B");
    let row = ctx.quote_name("r");
    let offset = offset.cloned().unwrap_or(Bind::Value(SqlValue::Int(0)));

    trace!(inner_placeholders = binds.len(), "wrapping query for ROWNUM pagination");
    binds.push(limit.clone());
    binds.push(offset.clone());
    binds.push(offset);

    format!(
        "SELECT * FROM ( SELECT {inner}.*, ROWNUM {row} FROM ( {sql} ) {inner} \
         WHERE ROWNUM <= ? + ? ) {outer} WHERE {row} > ?"
    )
}
