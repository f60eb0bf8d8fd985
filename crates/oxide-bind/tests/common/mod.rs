#![allow(dead_code)]

use oxide_bind::{CompiledQuery, QueryContext, SelectSpec, SqlValue, StatementDescription};

pub fn ctx(dialect: &str) -> QueryContext {
    QueryContext::from_name(dialect)
        .unwrap_or_else(|e| panic!("Unknown dialect {dialect}: {e}"))
}

pub fn compile(spec: &SelectSpec, dialect: &str) -> CompiledQuery {
    let compiled = spec
        .compile(&ctx(dialect))
        .unwrap_or_else(|e| panic!("Failed to compile: {spec:?}\nError: {e:?}"));
    assert_placeholders_match(&compiled);
    compiled
}

pub fn compile_json(json: &str, dialect: &str) -> CompiledQuery {
    let statement = StatementDescription::from_json(json)
        .unwrap_or_else(|e| panic!("Failed to load: {json}\nError: {e:?}"));
    let compiled = statement
        .compile(&ctx(dialect))
        .unwrap_or_else(|e| panic!("Failed to compile: {json}\nError: {e:?}"));
    assert_placeholders_match(&compiled);
    compiled
}

/// Text after the first `FROM ` of the SQL.
pub fn from_part(compiled: &CompiledQuery) -> &str {
    let sql = compiled.sql();
    let start = sql
        .find(" FROM ")
        .unwrap_or_else(|| panic!("No FROM in {sql}"));
    &sql[start + 1..]
}

/// Counts `?` outside string literals and checks it against the binds and
/// the value token names.
pub fn assert_placeholders_match(compiled: &CompiledQuery) {
    let mut in_string = false;
    let mut count = 0;
    for c in compiled.sql().chars() {
        match c {
            '\'' => in_string = !in_string,
            '?' if !in_string => count += 1,
            _ => {}
        }
    }
    assert_eq!(
        count,
        compiled.binds().len(),
        "Placeholder/bind mismatch in {}",
        compiled.sql()
    );
    assert_eq!(
        count,
        compiled.value_token_names().len(),
        "Placeholder/name mismatch in {}",
        compiled.sql()
    );
}

pub fn ints(values: &[i64]) -> Vec<SqlValue> {
    values.iter().copied().map(SqlValue::Int).collect()
}
