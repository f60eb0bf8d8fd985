//! Tests for LIMIT/OFFSET across the offset, xy and rownum grammars.

mod common;
use common::*;

use oxide_bind::builder::{col, Select};
use oxide_bind::{token, LimitDialect, SelectSpec, SqlValue};

fn paged(limit: Option<i64>, offset: Option<i64>) -> SelectSpec {
    let mut spec = Select::new()
        .fields(&["id"])
        .from("users")
        .where_clause(col("team").eq(token("team")))
        .order_by(&["id"])
        .into_spec();
    spec.limit = limit.map(|n| oxide_bind::Bind::Value(SqlValue::Int(n)));
    spec.offset = offset.map(|n| oxide_bind::Bind::Value(SqlValue::Int(n)));
    spec
}

fn resolved(spec: &SelectSpec, dialect: &str) -> (String, Vec<SqlValue>) {
    let compiled = compile(spec, dialect);
    let values = compiled.resolve(&[("team", SqlValue::Int(1))]).unwrap();
    (String::from(compiled.sql()), values)
}

#[test]
fn offset_dialect_limit_and_offset() {
    let (sql, values) = resolved(&paged(Some(10), Some(5)), "postgres");
    assert!(sql.ends_with("ORDER BY \"id\" LIMIT ? OFFSET ?"), "{sql}");
    assert_eq!(values, ints(&[1, 10, 5]));
}

#[test]
fn offset_dialect_limit_only() {
    let (sql, values) = resolved(&paged(Some(10), None), "sqlite");
    assert!(sql.ends_with(" LIMIT ?"), "{sql}");
    assert_eq!(values, ints(&[1, 10]));
}

#[test]
fn xy_dialect_puts_offset_first() {
    let (sql, values) = resolved(&paged(Some(10), Some(5)), "mysql");
    assert!(sql.ends_with("ORDER BY `id` LIMIT ?, ?"), "{sql}");
    assert_eq!(values, ints(&[1, 5, 10]));

    let (sql, values) = resolved(&paged(Some(10), None), "mysql");
    assert!(sql.ends_with(" LIMIT ?"), "{sql}");
    assert_eq!(values, ints(&[1, 10]));
}

#[test]
fn rownum_dialect_wraps_whole_query() {
    let (sql, values) = resolved(&paged(Some(10), Some(5)), "oracle");
    assert_eq!(
        sql,
        "SELECT * FROM ( SELECT \"A\".*, ROWNUM \"r\" FROM ( \
         SELECT \"id\" FROM \"users\" WHERE \"team\" = ? ORDER BY \"id\" \
         ) \"A\" WHERE ROWNUM <= ? + ? ) \"B\" WHERE \"r\" > ?"
    );
    assert_eq!(values, ints(&[1, 10, 5, 5]));
}

#[test]
fn rownum_dialect_without_offset_starts_at_zero() {
    let (_, values) = resolved(&paged(Some(10), None), "oracle");
    assert_eq!(values, ints(&[1, 10, 0, 0]));
}

#[test]
fn no_limit_ignores_offset() {
    for dialect in ["generic", "mysql", "oracle"] {
        let (sql, values) = resolved(&paged(None, Some(5)), dialect);
        assert!(!sql.contains("LIMIT") && !sql.contains("ROWNUM"), "{sql}");
        assert_eq!(values, ints(&[1]));
    }
}

#[test]
fn limit_tokens_resolve_per_execution() {
    let spec = Select::new()
        .from("events")
        .limit(token("size"))
        .offset(token("skip"))
        .into_spec();
    let compiled = compile(&spec, "oracle");
    assert_eq!(compiled.token_names(), vec!["size", "skip", "skip"]);
    for page in 0..3 {
        let values = compiled
            .resolve(&[("size", SqlValue::Int(20)), ("skip", SqlValue::Int(page * 20))])
            .unwrap();
        assert_eq!(values, ints(&[20, page * 20, page * 20]));
    }
}

#[test]
fn limit_dialect_override() {
    let spec = paged(Some(10), Some(5));
    let ctx = ctx("generic").with_limit_dialect(LimitDialect::Xy);
    let compiled = spec.compile(&ctx).unwrap();
    assert!(compiled.sql().ends_with("ORDER BY \"id\" LIMIT ?, ?"));
    assert_placeholders_match(&compiled);
}
