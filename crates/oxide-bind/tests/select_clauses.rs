//! Tests for field lists, WHERE, GROUP BY and ORDER BY placement.

mod common;
use common::*;

use oxide_bind::builder::{col, Direction, OrderTerm, Select};
use oxide_bind::{token, BuildError, Condition};

#[test]
fn group_by_follows_where() {
    let spec = Select::new()
        .fields(&["foo", "bar"])
        .field_raw("COUNT(*) AS n")
        .from("t")
        .where_clause(col("x").gt(1))
        .group_by(&["foo", "bar"])
        .into_spec();
    assert_eq!(
        compile(&spec, "generic").sql(),
        "SELECT \"foo\", \"bar\", COUNT(*) AS n FROM \"t\" WHERE \"x\" > ? GROUP BY \"foo\", \"bar\""
    );
}

#[test]
fn order_by_mixed_directions() {
    let spec = Select::new()
        .from("t")
        .order_by_term(OrderTerm::asc("foo"))
        .order_by(&["bar"])
        .into_spec();
    let compiled = compile(&spec, "generic");
    assert!(compiled.sql().ends_with("ORDER BY \"foo\" ASC, \"bar\""));
}

#[test]
fn order_by_desc() {
    let spec = Select::new()
        .from("t")
        .order_by_desc(&["created_at"])
        .order_by_term(OrderTerm::from(("id", Direction::Asc)))
        .into_spec();
    assert!(compile(&spec, "generic")
        .sql()
        .ends_with("ORDER BY \"created_at\" DESC, \"id\" ASC"));
}

#[test]
fn clauses_come_in_fixed_order() {
    let spec = Select::new()
        .fields(&["team", "COUNT"])
        .from("players")
        .where_clause(col("active").eq(true))
        .group_by(&["team"])
        .order_by(&["team"])
        .limit(5)
        .into_spec();
    let sql = String::from(compile(&spec, "generic").sql());
    let where_at = sql.find(" WHERE ").unwrap();
    let group_at = sql.find(" GROUP BY ").unwrap();
    let order_at = sql.find(" ORDER BY ").unwrap();
    let limit_at = sql.find(" LIMIT ").unwrap();
    assert!(where_at < group_at && group_at < order_at && order_at < limit_at);
}

#[test]
fn empty_where_is_omitted() {
    let spec = Select::new()
        .from("t")
        .where_clause(Condition::all([]))
        .into_spec();
    assert_eq!(compile(&spec, "generic").sql(), "SELECT * FROM \"t\"");
}

#[test]
fn where_alternatives_and_raw() {
    let spec = Select::new()
        .from("t")
        .where_clause(Condition::any([
            col("a").eq(token("a")),
            Condition::raw("b < now()"),
        ]))
        .into_spec();
    let compiled = compile(&spec, "generic");
    assert_eq!(
        compiled.sql(),
        "SELECT * FROM \"t\" WHERE ( \"a\" = ? OR b < now() )"
    );
    assert_eq!(compiled.token_names(), vec!["a"]);
}

#[test]
fn empty_field_name_is_error() {
    let spec = Select::new().fields(&[""]).from("t").into_spec();
    assert!(matches!(
        spec.compile(&ctx("generic")),
        Err(BuildError::InvalidStatement(_))
    ));
}

#[test]
fn sql_is_stable_across_compilations() {
    let spec = Select::new()
        .from("t")
        .where_clause(col("a").in_list([1, 2, 3]))
        .limit(token("n"))
        .into_spec();
    let first = compile(&spec, "oracle");
    let second = compile(&spec, "oracle");
    assert_eq!(first, second);
}
