use actix_web::error::ErrorBadRequest;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::MySqlPool;

/// SQL bindable value enum
#[derive(Debug, PartialEq)]
pub enum SqlValue {
    String(String),
    I64(i64),
    F64(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

/// SQL update container
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Builds a dynamic UPDATE from a JSON object payload.
///
/// Only keys present in `allowed_columns` are accepted; anything else is
/// a 400. Column names therefore never come from user input.
pub fn build_update_sql(
    table: &str,
    allowed_columns: &[&str],
    payload: &Value,
    id_column: &str,
    id_value: i64,
) -> Result<SqlUpdate, actix_web::Error> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ErrorBadRequest("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(ErrorBadRequest("No fields provided for update"));
    }

    if let Some(bad) = obj.keys().find(|k| !allowed_columns.contains(&k.as_str())) {
        return Err(ErrorBadRequest(format!("Unknown field: {}", bad)));
    }

    let set_clause = obj
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values = Vec::with_capacity(obj.len() + 1);

    for value in obj.values() {
        values.push(json_to_sql_value(value)?);
    }

    // WHERE id = ?
    values.push(SqlValue::I64(id_value));

    Ok(SqlUpdate { sql, values })
}

/// Strings that parse as a date or datetime are bound as such so MySQL
/// DATE/DATETIME columns accept them.
fn json_to_sql_value(value: &Value) -> Result<SqlValue, actix_web::Error> {
    let v = match value {
        Value::String(s) => {
            if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                SqlValue::Date(d)
            } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                SqlValue::DateTime(dt)
            } else {
                SqlValue::String(s.clone())
            }
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SqlValue::I64(i)
            } else if let Some(f) = n.as_f64() {
                SqlValue::F64(f)
            } else {
                return Err(ErrorBadRequest("Unsupported numeric value"));
            }
        }
        Value::Bool(b) => SqlValue::Bool(*b),
        Value::Null => SqlValue::Null,
        _ => return Err(ErrorBadRequest("Unsupported JSON value type")),
    };
    Ok(v)
}

/// Execute the update
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COLUMNS: &[&str] = &["notes", "status", "check_out_time", "location_lat"];

    #[test]
    fn builds_set_clause_for_allowed_columns() {
        let payload = json!({"notes": "covered shift", "status": "half_day"});

        let update =
            build_update_sql("attendance_records", COLUMNS, &payload, "id", 7).unwrap();

        assert!(update.sql.starts_with("UPDATE attendance_records SET "));
        assert!(update.sql.contains("notes = ?"));
        assert!(update.sql.contains("status = ?"));
        assert!(update.sql.ends_with("WHERE id = ?"));
        // two fields plus the id binding
        assert_eq!(update.values.len(), 3);
        assert_eq!(*update.values.last().unwrap(), SqlValue::I64(7));
    }

    #[test]
    fn rejects_unknown_columns() {
        let payload = json!({"status": "late", "role": "admin"});
        assert!(build_update_sql("attendance_records", COLUMNS, &payload, "id", 1).is_err());
    }

    #[test]
    fn rejects_empty_and_non_object_payloads() {
        assert!(build_update_sql("t", COLUMNS, &json!({}), "id", 1).is_err());
        assert!(build_update_sql("t", COLUMNS, &json!([1, 2]), "id", 1).is_err());
    }

    #[test]
    fn parses_dates_datetimes_and_numbers() {
        let payload = json!({
            "check_out_time": "2025-06-02T18:10:00",
            "location_lat": 40.7128,
            "notes": null
        });

        let update = build_update_sql("attendance_records", COLUMNS, &payload, "id", 1).unwrap();

        assert!(update.values.contains(&SqlValue::DateTime(
            NaiveDateTime::parse_from_str("2025-06-02T18:10:00", "%Y-%m-%dT%H:%M:%S").unwrap()
        )));
        assert!(update.values.contains(&SqlValue::F64(40.7128)));
        assert!(update.values.contains(&SqlValue::Null));
    }
}
