//! Statement descriptions loaded from JSON.
//!
//! This is the record form of the builders: a single JSON object such as
//!
//! ```json
//! { "select": {
//!     "fields": ["u.id", {"raw": "COUNT(*) AS n"}],
//!     "from": [{"users": "u"}, {"user_emails": "e", "using": "user_id"}],
//!     "where": {"u.active": true, "u.id": {">": {"$token": "min_id"}}},
//!     "group_by": "u.id",
//!     "order_by": [["u.id", "desc"]],
//!     "limit": {"$token": "limit"}
//! } }
//! ```
//!
//! Everything is turned into the closed builder types while loading, so a
//! malformed entry is reported here and never reaches compilation.
//!
//! Conditions: an object is a conjunction over its keys (in sorted order),
//! an array is a disjunction, a string is raw SQL. Bound values are JSON
//! scalars or `{"$token": name}`; `{"$col": name}` and `{"$raw": sql}` are
//! unbound operands.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::builder::{
    CmpOp, Condition, DeleteSpec, Direction, Field, InsertSpec, Join, JoinConstraint, JoinKind,
    Operand, OrderTerm, Predicate, SelectSpec, TableRef, UpdateSpec,
};
use crate::context::QueryContext;
use crate::error::{BuildError, Result};
use crate::resolver::CompiledQuery;
use crate::value::{Bind, SqlValue, ValueToken};

/// Keys of a FROM object that are never a shorthand table name.
const TABLE_KEYS: [&str; 5] = ["name", "as", "join", "on", "using"];

/// Any statement loaded from JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementDescription {
    /// A SELECT.
    Select(SelectSpec),
    /// An INSERT.
    Insert(InsertSpec),
    /// An UPDATE.
    Update(UpdateSpec),
    /// A DELETE.
    Delete(DeleteSpec),
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum Wire {
    Select(SelectWire),
    Insert(InsertWire),
    Update(UpdateWire),
    Delete(DeleteWire),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SelectWire {
    #[serde(default)]
    fields: Option<Value>,
    from: Value,
    #[serde(default, rename = "where")]
    where_clause: Option<Value>,
    #[serde(default)]
    group_by: Option<Value>,
    #[serde(default)]
    order_by: Option<Value>,
    #[serde(default)]
    limit: Option<Value>,
    #[serde(default)]
    offset: Option<Value>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct InsertWire {
    table: String,
    #[serde(default)]
    columns: Vec<String>,
    values: Value,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateWire {
    table: String,
    set: Map<String, Value>,
    #[serde(default, rename = "where")]
    where_clause: Option<Value>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DeleteWire {
    table: String,
    #[serde(default, rename = "where")]
    where_clause: Option<Value>,
}

impl StatementDescription {
    /// Parses a description from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Description`] for invalid JSON or a malformed entry.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(description_error)?;
        Self::from_value(value)
    }

    /// Converts an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Description`] for a malformed entry.
    pub fn from_value(value: Value) -> Result<Self> {
        let wire: Wire = serde_json::from_value(value).map_err(description_error)?;
        match wire {
            Wire::Select(w) => Ok(Self::Select(select_spec(w)?)),
            Wire::Insert(w) => Ok(Self::Insert(insert_spec(w)?)),
            Wire::Update(w) => Ok(Self::Update(UpdateSpec {
                table: w.table,
                set: w
                    .set
                    .iter()
                    .map(|(column, v)| Ok((column.clone(), operand(v)?)))
                    .collect::<Result<_>>()?,
                where_clause: w.where_clause.as_ref().map(condition).transpose()?,
            })),
            Wire::Delete(w) => Ok(Self::Delete(DeleteSpec {
                table: w.table,
                where_clause: w.where_clause.as_ref().map(condition).transpose()?,
            })),
        }
    }

    /// Returns the statement kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Select(_) => "SELECT",
            Self::Insert(_) => "INSERT",
            Self::Update(_) => "UPDATE",
            Self::Delete(_) => "DELETE",
        }
    }

    /// Compiles the statement.
    ///
    /// # Errors
    ///
    /// Returns the [`BuildError`] the statement's compiler produces.
    pub fn compile(&self, ctx: &QueryContext) -> Result<CompiledQuery> {
        match self {
            Self::Select(s) => s.compile(ctx),
            Self::Insert(s) => s.compile(ctx),
            Self::Update(s) => s.compile(ctx),
            Self::Delete(s) => s.compile(ctx),
        }
    }
}

/// Parses a FROM value: a name, one object, or an array of entries.
///
/// # Errors
///
/// Returns [`BuildError::Description`] for anything that is not a string, an
/// object, or an array of those.
pub fn from_clause(value: &Value) -> Result<Vec<TableRef>> {
    match value {
        Value::Array(items) => items.iter().map(table_ref).collect(),
        Value::String(_) | Value::Object(_) => Ok(vec![table_ref(value)?]),
        other => Err(BuildError::Description(format!(
            "FROM must be a table, an object or an array, got {other}"
        ))),
    }
}

/// Parses a WHERE / ON condition.
///
/// # Errors
///
/// Returns [`BuildError::Description`] for an unsupported shape or operator.
pub fn condition(value: &Value) -> Result<Condition> {
    match value {
        Value::Object(map) => {
            let mut items = Vec::with_capacity(map.len());
            for (key, v) in sorted(map) {
                let item = match key.as_str() {
                    "$and" => Condition::And(sub_conditions(key, v)?),
                    "$or" => Condition::Or(sub_conditions(key, v)?),
                    column => column_condition(column, v)?,
                };
                items.push(item);
            }
            Ok(Condition::And(items))
        }
        Value::Array(items) => Ok(Condition::Or(
            items.iter().map(condition).collect::<Result<_>>()?,
        )),
        Value::String(sql) => Ok(Condition::Raw(sql.clone())),
        other => Err(BuildError::Description(format!(
            "a condition must be an object, an array or SQL text, got {other}"
        ))),
    }
}

fn select_spec(w: SelectWire) -> Result<SelectSpec> {
    Ok(SelectSpec {
        fields: w.fields.as_ref().map(fields).transpose()?.unwrap_or_default(),
        from: from_clause(&w.from)?,
        where_clause: w.where_clause.as_ref().map(condition).transpose()?,
        group_by: w
            .group_by
            .as_ref()
            .map(|v| names(v, "group_by"))
            .transpose()?
            .unwrap_or_default(),
        order_by: w.order_by.as_ref().map(order_by).transpose()?.unwrap_or_default(),
        limit: w.limit.as_ref().map(|v| count(v, "limit")).transpose()?,
        offset: w.offset.as_ref().map(|v| count(v, "offset")).transpose()?,
    })
}

fn insert_spec(w: InsertWire) -> Result<InsertSpec> {
    let (columns, rows) = match (&w.values, w.columns.is_empty()) {
        // {"col": value, ...} with no column list
        (Value::Object(map), true) => {
            let (columns, row): (Vec<_>, Vec<_>) = sorted(map)
                .into_iter()
                .map(|(column, v)| Ok((column.clone(), bind(v)?)))
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .unzip();
            (columns, vec![row])
        }
        (Value::Array(items), false) if items.iter().all(Value::is_array) => {
            let rows = items
                .iter()
                .filter_map(Value::as_array)
                .map(|vals| vals.iter().map(bind).collect::<Result<Vec<_>>>())
                .collect::<Result<Vec<_>>>()?;
            (w.columns, rows)
        }
        (Value::Array(vals), false) => (
            w.columns,
            vec![vals.iter().map(bind).collect::<Result<Vec<_>>>()?],
        ),
        _ => {
            return Err(BuildError::Description(String::from(
                "INSERT values must be an object, or rows matching \"columns\"",
            )))
        }
    };
    Ok(InsertSpec {
        table: w.table,
        columns,
        rows,
    })
}

fn table_ref(value: &Value) -> Result<TableRef> {
    let map = match value {
        Value::String(name) => return Ok(TableRef::Plain(name.clone())),
        Value::Object(map) => map,
        other => {
            return Err(BuildError::Description(format!(
                "FROM entries must be table names or objects, got {other}"
            )))
        }
    };

    if let Some(raw) = map.get("raw") {
        return match (raw, map.len()) {
            (Value::String(sql), 1) => Ok(TableRef::Raw(sql.clone())),
            _ => Err(BuildError::Description(String::from(
                "a raw FROM entry is {\"raw\": \"sql\"} and nothing else",
            ))),
        };
    }

    let shorthand: Vec<(&String, &Value)> = map
        .iter()
        .filter(|(k, _)| !TABLE_KEYS.contains(&k.as_str()))
        .collect();
    let (name, alias) = match (shorthand.as_slice(), map.get("name")) {
        ([], Some(name)) => (text(name, "name")?, map.get("as").map(|a| text(a, "as")).transpose()?),
        ([(name, alias)], None) if !map.contains_key("as") => {
            let alias = match alias {
                Value::Null => None,
                other => Some(text(other, "alias")?),
            };
            ((*name).clone(), alias)
        }
        _ => {
            return Err(BuildError::Description(format!(
                "cannot tell the table name in FROM entry {value}"
            )))
        }
    };

    let constraint = match (map.get("on"), map.get("using")) {
        (Some(on), None) => Some(JoinConstraint::On(condition(on)?)),
        (None, Some(using)) => Some(JoinConstraint::Using(text(using, "using")?)),
        (None, None) => None,
        (Some(_), Some(_)) => {
            return Err(BuildError::Description(format!(
                "join on {name} has both \"on\" and \"using\""
            )))
        }
    };
    let kind = match map.get("join") {
        None => JoinKind::Inner,
        Some(kind) => match text(kind, "join")?.to_ascii_lowercase().as_str() {
            "inner" => JoinKind::Inner,
            "left" => JoinKind::Left,
            other => return Err(BuildError::Description(format!("unknown join kind: {other}"))),
        },
    };

    match (constraint, alias) {
        (Some(constraint), alias) => Ok(TableRef::Joined(Join {
            name,
            alias,
            kind,
            constraint,
        })),
        (None, _) if map.contains_key("join") => Err(BuildError::Description(format!(
            "join on {name} needs \"on\" or \"using\""
        ))),
        (None, Some(alias)) => Ok(TableRef::Aliased { name, alias }),
        (None, None) => Ok(TableRef::Plain(name)),
    }
}

fn column_condition(column: &str, value: &Value) -> Result<Condition> {
    let predicate = match value {
        Value::Null => Predicate::IsNull,
        Value::Array(items) => Predicate::In {
            negated: false,
            items: items.iter().map(operand).collect::<Result<_>>()?,
        },
        Value::Object(map) if is_operand(map) => Predicate::Cmp(CmpOp::Eq, operand(value)?),
        Value::Object(map) => {
            let mut items = Vec::with_capacity(map.len());
            for (op, arg) in sorted(map) {
                items.push(Condition::Compare {
                    column: String::from(column),
                    predicate: operator_predicate(column, op, arg)?,
                });
            }
            // {">": 1, "<": 5}: every operator must hold
            return match items.len() {
                0 => Err(BuildError::Description(format!("no operator given for {column}"))),
                1 => Ok(items.remove(0)),
                _ => Ok(Condition::And(items)),
            };
        }
        scalar => Predicate::Cmp(CmpOp::Eq, operand(scalar)?),
    };
    Ok(Condition::Compare {
        column: String::from(column),
        predicate,
    })
}

fn operator_predicate(column: &str, op: &str, arg: &Value) -> Result<Predicate> {
    let op = op.trim().to_ascii_lowercase();
    match (op.as_str(), arg) {
        ("is", Value::Null) => Ok(Predicate::IsNull),
        ("is not", Value::Null) => Ok(Predicate::IsNotNull),
        ("in" | "not in", Value::Array(items)) => Ok(Predicate::In {
            negated: op == "not in",
            items: items.iter().map(operand).collect::<Result<_>>()?,
        }),
        ("between" | "not between", Value::Array(bounds)) if bounds.len() == 2 => {
            Ok(Predicate::Between {
                negated: op == "not between",
                low: operand(&bounds[0])?,
                high: operand(&bounds[1])?,
            })
        }
        (other, arg) => match CmpOp::parse(other) {
            Some(cmp) => Ok(Predicate::Cmp(cmp, operand(arg)?)),
            None => Err(BuildError::Description(format!(
                "unsupported operator {other:?} on {column} with {arg}"
            ))),
        },
    }
}

fn sub_conditions(key: &str, value: &Value) -> Result<Vec<Condition>> {
    match value {
        Value::Array(items) => items.iter().map(condition).collect(),
        other => Err(BuildError::Description(format!(
            "{key} takes an array of conditions, got {other}"
        ))),
    }
}

fn is_operand(map: &Map<String, Value>) -> bool {
    map.len() == 1 && map.keys().all(|k| matches!(k.as_str(), "$token" | "$col" | "$raw"))
}

fn operand(value: &Value) -> Result<Operand> {
    if let Value::Object(map) = value {
        match (map.get("$col"), map.get("$raw")) {
            (Some(col), None) if map.len() == 1 => {
                return Ok(Operand::Column(text(col, "$col")?));
            }
            (None, Some(raw)) if map.len() == 1 => return Ok(Operand::Raw(text(raw, "$raw")?)),
            _ => {}
        }
    }
    Ok(Operand::Bind(bind(value)?))
}

fn bind(value: &Value) -> Result<Bind> {
    let v = match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Int(i),
            None => SqlValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Object(map) if map.len() == 1 && map.contains_key("$token") => {
            return Ok(Bind::Token(ValueToken::new(text(&map["$token"], "$token")?)));
        }
        other => {
            return Err(BuildError::Description(format!(
                "expected a value or {{\"$token\": name}}, got {other}"
            )))
        }
    };
    Ok(Bind::Value(v))
}

fn count(value: &Value, what: &str) -> Result<Bind> {
    match bind(value)? {
        b @ (Bind::Token(_) | Bind::Value(SqlValue::Int(_))) => Ok(b),
        Bind::Value(other) => Err(BuildError::Description(format!(
            "{what} must be an integer or a token, got {}",
            other.to_sql_inline()
        ))),
    }
}

fn fields(value: &Value) -> Result<Vec<Field>> {
    let field = |v: &Value| -> Result<Field> {
        match v {
            Value::String(name) => Ok(Field::Column(name.clone())),
            Value::Object(map) if map.len() == 1 && map.contains_key("raw") => {
                Ok(Field::Raw(text(&map["raw"], "raw")?))
            }
            other => Err(BuildError::Description(format!(
                "fields must be names or {{\"raw\": sql}}, got {other}"
            ))),
        }
    };
    match value {
        Value::Array(items) => items.iter().map(field).collect(),
        single => Ok(vec![field(single)?]),
    }
}

fn names(value: &Value, what: &str) -> Result<Vec<String>> {
    match value {
        Value::String(name) => Ok(vec![name.clone()]),
        Value::Array(items) => items.iter().map(|v| text(v, what)).collect(),
        other => Err(BuildError::Description(format!(
            "{what} must be a name or an array of names, got {other}"
        ))),
    }
}

fn order_by(value: &Value) -> Result<Vec<OrderTerm>> {
    let term = |v: &Value| -> Result<OrderTerm> {
        match v {
            Value::String(name) => Ok(OrderTerm::Column(name.clone())),
            Value::Array(pair) if pair.len() == 2 => {
                let direction: Direction = text(&pair[1], "order_by direction")?
                    .parse()
                    .map_err(|e: BuildError| BuildError::Description(e.to_string()))?;
                Ok(OrderTerm::Directed(text(&pair[0], "order_by")?, direction))
            }
            other => Err(BuildError::Description(format!(
                "order_by entries must be a name or [name, direction], got {other}"
            ))),
        }
    };
    match value {
        Value::Array(items) => items.iter().map(term).collect(),
        single => Ok(vec![term(single)?]),
    }
}

fn text(value: &Value, what: &str) -> Result<String> {
    value
        .as_str()
        .map(String::from)
        .ok_or_else(|| BuildError::Description(format!("{what} must be a string, got {value}")))
}

fn sorted(map: &Map<String, Value>) -> Vec<(&String, &Value)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

fn description_error(err: serde_json::Error) -> BuildError {
    BuildError::Description(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_ref_shapes() {
        assert_eq!(table_ref(&json!("users")).unwrap(), TableRef::table("users"));
        assert_eq!(table_ref(&json!({"raw": "users"})).unwrap(), TableRef::raw("users"));
        assert_eq!(
            table_ref(&json!({"name": "users", "as": "u"})).unwrap(),
            TableRef::aliased("users", "u")
        );
        assert_eq!(
            table_ref(&json!({"users": "u"})).unwrap(),
            TableRef::aliased("users", "u")
        );
        assert_eq!(
            table_ref(&json!({"user_emails": "e", "using": "user_id"})).unwrap(),
            TableRef::Joined(Join::inner("user_emails").alias("e").using("user_id"))
        );
        assert_eq!(
            table_ref(&json!({"name": "orders", "join": "left", "using": "id"})).unwrap(),
            TableRef::Joined(Join::left("orders").using("id"))
        );
    }

    #[test]
    fn test_table_ref_rejects_malformed() {
        for bad in [
            json!(42),
            json!(true),
            json!({"a": "x", "b": "y"}),
            json!({"users": "u", "name": "users"}),
            json!({"users": "u", "on": {"a": 1}, "using": "id"}),
            json!({"users": null, "join": "left"}),
            json!({"users": "u", "join": "cross", "using": "id"}),
            json!({"raw": "x", "as": "y"}),
        ] {
            assert!(
                matches!(table_ref(&bad), Err(BuildError::Description(_))),
                "accepted {bad}"
            );
        }
        assert!(from_clause(&json!(null)).is_err());
        assert!(from_clause(&json!(["users", 3])).is_err());
    }

    #[test]
    fn test_condition_shapes() {
        let cond = condition(&json!({
            "b": {"$token": "b"},
            "a": null,
            "c": {">": 1, "<=": 5},
            "$or": [{"d": [1, 2]}, "e IS NOT NULL"]
        }))
        .unwrap();
        let (sql, binds) = crate::builder::compile_where(&cond, &QueryContext::default()).unwrap();
        assert_eq!(
            sql,
            "WHERE ( ( ( \"d\" IN ( ?, ? ) ) OR e IS NOT NULL ) AND \"a\" IS NULL \
             AND \"b\" = ? AND ( \"c\" <= ? AND \"c\" > ? ) )"
        );
        assert_eq!(binds.len(), 5);
        assert_eq!(binds[2].token_name(), Some("b"));
    }

    #[test]
    fn test_operators() {
        let cond = condition(&json!({
            "x": {"between": [1, {"$token": "hi"}]},
            "y": {"not in": []},
            "z": {"is not": null},
            "w": {"like": "a%"},
            "v": {"=": {"$col": "t.v"}}
        }))
        .unwrap();
        let (sql, _) = crate::builder::compile_where(&cond, &QueryContext::default()).unwrap();
        assert_eq!(
            sql,
            "WHERE ( \"v\" = \"t\".\"v\" AND \"w\" LIKE ? AND \"x\" BETWEEN ? AND ? \
             AND 1=1 AND \"z\" IS NOT NULL )"
        );
        assert!(condition(&json!({"x": {"~~": 1}})).is_err());
        assert!(condition(&json!(5)).is_err());
    }

    #[test]
    fn test_limit_must_be_integer_or_token() {
        assert_eq!(count(&json!(10), "limit").unwrap(), Bind::Value(SqlValue::Int(10)));
        assert!(count(&json!({"$token": "n"}), "limit").is_ok());
        assert!(count(&json!("10"), "limit").is_err());
        assert!(count(&json!(1.5), "limit").is_err());
    }

    #[test]
    fn test_unknown_statement_kind() {
        assert!(StatementDescription::from_json(r#"{"merge": {}}"#).is_err());
        assert!(StatementDescription::from_json("not json").is_err());
    }
}
