//! Request records to query parameters.

use phf::phf_map;
use secrecy::{ExposeSecret as _, SecretString};
use serde::Serialize;
use serde_json::Value;

use crate::Result;
use crate::error::Error;
use crate::transport::Query;

const API_TOKEN: &str = "api_token";

/// Record field names that the service spells differently.
static RENAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "symbol" => "s",
    "start" => "from",
    "finish" => "to",
    "kind" => "type",
    "contract" => "contract_name",
    "extract" => "filter",
    "tag" => "t",
    "lookup" => "s",
    "trade_date_start" => "trade_date_from",
    "trade_date_finish" => "trade_date_to",
};

/// Query parameter name for a record field.
#[must_use]
pub fn rename(field: &str) -> &str {
    RENAMES.get(field).copied().unwrap_or(field)
}

/// Build the query of one call from a request record.
///
/// The record must serialize to a flat map. Fields named in `exclude` and null values are
/// skipped, the remaining names go through the rename table, and sequences become repeated keys.
/// The API key always comes first.
pub fn prepare<T: Serialize + ?Sized>(
    key: &SecretString,
    record: &T,
    exclude: &[&str],
) -> Result<Query> {
    let mut query = Query::new();
    query.push(API_TOKEN, key.expose_secret());

    let fields = match serde_json::to_value(record)
        .map_err(|e| Error::validation(format!("unable to serialize request: {e}")))?
    {
        Value::Object(fields) => fields,
        Value::Null => return Ok(query),
        other => {
            return Err(Error::validation(format!(
                "request must serialize to a map, found {other}"
            )));
        }
    };

    for (field, value) in fields {
        if exclude.contains(&field.as_str()) {
            continue;
        }

        let name = rename(&field);
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(item) = scalar(&field, item)? {
                        query.push(name, item);
                    }
                }
            }
            value => {
                if let Some(value) = scalar(&field, value)? {
                    query.push(name, value);
                }
            }
        }
    }

    Ok(query)
}

fn scalar(field: &str, value: Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        Value::Number(number) => Ok(Some(number.to_string())),
        nested @ (Value::Array(_) | Value::Object(_)) => Err(Error::validation(format!(
            "field '{field}' must be a scalar or a list of scalars, found {nested}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn prepare_should_drop_nulls_and_exclusions() {
        let record = json!({
            "symbol": "MCD.US",
            "period": "d",
            "order": "a",
            "start": null,
            "finish": null,
            "fmt": "csv",
        });

        let query = prepare(&SecretString::from("demo"), &record, &["symbol"]).unwrap();

        assert_eq!(
            query.pairs(),
            [
                ("api_token".to_owned(), "demo".to_owned()),
                ("period".to_owned(), "d".to_owned()),
                ("order".to_owned(), "a".to_owned()),
                ("fmt".to_owned(), "csv".to_owned()),
            ]
        );
    }

    #[test]
    fn prepare_should_rename_fields() {
        let record = json!({
            "start": "2023-01-01",
            "finish": "2023-01-10",
            "extract": "last_close",
            "kind": "splits",
            "trade_date_start": "2023-01-02",
        });

        let query = prepare(&SecretString::from("key"), &record, &[]).unwrap();

        assert_eq!(query.get("from"), Some("2023-01-01"));
        assert_eq!(query.get("to"), Some("2023-01-10"));
        assert_eq!(query.get("filter"), Some("last_close"));
        assert_eq!(query.get("type"), Some("splits"));
        assert_eq!(query.get("trade_date_from"), Some("2023-01-02"));
        assert!(!query.contains_key("start"));
    }

    #[test]
    fn prepare_should_repeat_list_values() {
        let record = json!({"s": ["AAPL.US", "TSLA.US"], "limit": 50});

        let query = prepare(&SecretString::from("demo"), &record, &[]).unwrap();

        assert_eq!(query.get_all("s").collect::<Vec<_>>(), ["AAPL.US", "TSLA.US"]);
        assert_eq!(query.get("limit"), Some("50"));
    }

    #[test]
    fn prepare_should_reject_nested_maps() {
        let record = json!({"params": {"period": 50}});
        let err = prepare(&SecretString::from("demo"), &record, &[]).unwrap_err();
        assert_eq!(err.kind(), crate::error::Kind::Validation);
    }

    #[test]
    fn unit_record_should_only_carry_key() {
        let query = prepare(&SecretString::from("demo"), &(), &[]).unwrap();
        assert_eq!(query.len(), 1);
    }
}
