//! Tests for statement descriptions loaded from JSON.

mod common;
use common::*;

use oxide_bind::{BuildError, SqlValue, StatementDescription};

#[test]
fn json_from_examples() {
    let cases = [
        (r#""users""#, "FROM \"users\""),
        (r#"{"raw": "users"}"#, "FROM users"),
        (r#"["users", {"raw": "user_emails"}]"#, "FROM \"users\", user_emails"),
        (
            r#"[{"name": "users", "as": "u"}, "user_emails"]"#,
            "FROM \"users\" \"u\", \"user_emails\"",
        ),
        (
            r#"[{"users": "u"}, {"user_emails": "e", "using": "user_id"}]"#,
            "FROM \"users\" \"u\" JOIN \"user_emails\" \"e\" ON ( \"e\".\"user_id\" = \"u\".\"user_id\" )",
        ),
    ];
    for (from, expected) in cases {
        let json = format!(r#"{{"select": {{"from": {from}}}}}"#);
        assert_eq!(from_part(&compile_json(&json, "generic")), expected, "{json}");
    }
}

#[test]
fn json_join_on_with_binds() {
    let compiled = compile_json(
        r#"{"select": {
            "fields": ["u.id", {"raw": "COUNT(o.id) AS orders"}],
            "from": [
                {"users": "u"},
                {"name": "orders", "as": "o", "join": "left",
                 "on": {"o.user_id": {"$col": "u.id"}, "o.state": {"$token": "state"}}}
            ],
            "where": {"u.active": true},
            "group_by": "u.id",
            "order_by": [["u.id", "desc"]]
        }}"#,
        "generic",
    );
    assert_eq!(
        compiled.sql(),
        "SELECT \"u\".\"id\", COUNT(o.id) AS orders FROM \"users\" \"u\" \
         LEFT JOIN \"orders\" \"o\" ON ( \"o\".\"state\" = ? AND \"o\".\"user_id\" = \"u\".\"id\" ) \
         WHERE ( \"u\".\"active\" = ? ) GROUP BY \"u\".\"id\" ORDER BY \"u\".\"id\" DESC"
    );
    assert_eq!(compiled.value_token_names(), vec![Some("state"), None]);
}

#[test]
fn json_group_order_limit() {
    let compiled = compile_json(
        r#"{"select": {
            "from": "t",
            "group_by": ["foo", "bar"],
            "order_by": [["foo", "asc"], "bar"],
            "limit": 10,
            "offset": 5
        }}"#,
        "oracle",
    );
    assert!(compiled.sql().contains("GROUP BY \"foo\", \"bar\" ORDER BY \"foo\" ASC, \"bar\" )"));
    let none: [(&str, SqlValue); 0] = [];
    assert_eq!(compiled.resolve(&none).unwrap(), ints(&[10, 5, 5]));
}

#[test]
fn json_where_shapes() {
    let compiled = compile_json(
        r#"{"select": {
            "from": "t",
            "where": [
                {"a": {">=": {"$token": "a"}}, "b": null},
                {"c": {"in": [1, 2]}},
                "d = 1"
            ],
            "limit": {"$token": "n"}
        }}"#,
        "sqlite",
    );
    assert_eq!(
        compiled.sql(),
        "SELECT * FROM \"t\" WHERE ( ( \"a\" >= ? AND \"b\" IS NULL ) OR ( \"c\" IN ( ?, ? ) ) OR d = 1 ) LIMIT ?"
    );
    assert_eq!(
        compiled.value_token_names(),
        vec![Some("a"), None, None, Some("n")]
    );
    assert_eq!(compiled.token_names(), vec!["a", "n"]);
}

#[test]
fn json_insert_update_delete() {
    let insert = compile_json(
        r#"{"insert": {"table": "users", "values": {"name": {"$token": "name"}, "age": 30}}}"#,
        "postgres",
    );
    assert_eq!(
        insert.sql(),
        "INSERT INTO \"users\" ( \"age\", \"name\" ) VALUES ( ?, ? )"
    );

    let rows = compile_json(
        r#"{"insert": {"table": "t", "columns": ["a", "b"], "values": [[1, 2], [3, 4]]}}"#,
        "generic",
    );
    assert!(rows.sql().ends_with("VALUES ( ?, ? ), ( ?, ? )"));

    let update = compile_json(
        r#"{"update": {"table": "users", "set": {"visits": {"$raw": "visits + 1"}}, "where": {"id": {"$token": "id"}}}}"#,
        "generic",
    );
    assert_eq!(
        update.sql(),
        "UPDATE \"users\" SET \"visits\" = visits + 1 WHERE ( \"id\" = ? )"
    );

    let delete = compile_json(r#"{"delete": {"table": "sessions"}}"#, "mysql");
    assert_eq!(delete.sql(), "DELETE FROM `sessions`");
}

#[test]
fn json_rejects_malformed() {
    for bad in [
        r#"{"select": {"fields": ["id"]}}"#,
        r#"{"select": {"from": "t", "limit": "ten"}}"#,
        r#"{"select": {"from": "t", "order_by": [["id", "sideways"]]}}"#,
        r#"{"select": {"from": "t", "where": {"a": {"~": 1}}}}"#,
        r#"{"select": {"from": "t", "having": "x"}}"#,
        r#"{"insert": {"table": "t", "values": 5}}"#,
    ] {
        assert!(
            matches!(StatementDescription::from_json(bad), Err(BuildError::Description(_))),
            "accepted {bad}"
        );
    }
}

#[test]
fn json_kind() {
    let statement = StatementDescription::from_json(r#"{"delete": {"table": "t"}}"#).unwrap();
    assert_eq!(statement.kind(), "DELETE");
}
