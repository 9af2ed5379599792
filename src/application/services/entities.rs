use chrono::{DateTime, NaiveDate};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::CommandProcessingError;

/// Typed read access over the open entity bag of a parsed command.
///
/// Keys are looked up as given (camelCase) and then in snake_case, since models
/// are not consistent about either.
pub struct Entities<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Entities<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map
            .get(key)
            .or_else(|| self.map.get(&to_snake_case(key)))
            .filter(|v| !v.is_null())
    }

    /// First of `keys` that is present.
    fn get_any<'k>(&self, keys: &[&'k str]) -> Option<(&'a Value, &'k str)> {
        keys.iter()
            .find_map(|key| self.get(key).map(|v| (v, *key)))
    }

    pub fn optional_str(&self, key: &str) -> Result<Option<String>, CommandProcessingError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(CommandProcessingError::invalid_entity(
                key,
                format!("expected a string, got {}", other),
            )),
        }
    }

    pub fn required_str(&self, keys: &[&str]) -> Result<String, CommandProcessingError> {
        for key in keys {
            if let Some(s) = self.optional_str(key)? {
                return Ok(s);
            }
        }
        Err(CommandProcessingError::invalid_entity(keys[0], "is required"))
    }

    /// Accepts numbers and numeric strings such as `"1,250.50"` or `"$40"`.
    pub fn optional_amount(&self, key: &str) -> Result<Option<f64>, CommandProcessingError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let amount = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => {
                let cleaned: String = s
                    .trim()
                    .chars()
                    .filter(|c| !matches!(c, ',' | '$' | ' '))
                    .collect();
                cleaned.parse::<f64>().ok()
            }
            _ => None,
        };
        match amount {
            Some(a) if a.is_finite() => Ok(Some(a)),
            _ => Err(CommandProcessingError::invalid_entity(
                key,
                format!("expected an amount, got {}", value),
            )),
        }
    }

    pub fn required_amount(&self, key: &str) -> Result<f64, CommandProcessingError> {
        self.optional_amount(key)?
            .ok_or_else(|| CommandProcessingError::invalid_entity(key, "is required"))
    }

    /// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
    pub fn optional_date(&self, key: &str) -> Result<Option<NaiveDate>, CommandProcessingError> {
        let Some(s) = self.optional_str(key)? else {
            return Ok(None);
        };
        NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(&s)
                    .ok()
                    .map(|dt| dt.date_naive())
            })
            .map(Some)
            .ok_or_else(|| {
                CommandProcessingError::invalid_entity(key, format!("invalid date: {}", s))
            })
    }

    pub fn required_date(&self, key: &str) -> Result<NaiveDate, CommandProcessingError> {
        self.optional_date(key)?
            .ok_or_else(|| CommandProcessingError::invalid_entity(key, "is required"))
    }

    /// Deserializes a lowercase tag such as `"expense"` into its enum.
    pub fn optional_enum<T: DeserializeOwned>(
        &self,
        keys: &[&str],
    ) -> Result<Option<T>, CommandProcessingError> {
        let Some((value, key)) = self.get_any(keys) else {
            return Ok(None);
        };
        let normalized = match value {
            Value::String(s) => Value::String(s.trim().to_lowercase().replace([' ', '-'], "_")),
            other => other.clone(),
        };
        serde_json::from_value(normalized).map(Some).map_err(|_| {
            CommandProcessingError::invalid_entity(key, format!("unexpected value {}", value))
        })
    }

    pub fn required_enum<T: DeserializeOwned>(
        &self,
        keys: &[&str],
    ) -> Result<T, CommandProcessingError> {
        self.optional_enum(keys)?
            .ok_or_else(|| CommandProcessingError::invalid_entity(keys[0], "is required"))
    }

    pub fn optional_object(&self, key: &str) -> Option<Map<String, Value>> {
        self.get(key).and_then(Value::as_object).cloned()
    }
}

fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::TransactionType;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn given_numeric_string_when_reading_amount_then_coerces() {
        let m = map(json!({ "amount": "$1,250.50" }));

        let amount = Entities::new(&m).required_amount("amount").unwrap();

        assert!((amount - 1250.5).abs() < f64::EPSILON);
    }

    #[test]
    fn given_word_when_reading_amount_then_rejects() {
        let m = map(json!({ "amount": "lots" }));

        let result = Entities::new(&m).optional_amount("amount");

        assert!(matches!(
            result,
            Err(CommandProcessingError::InvalidEntity { ref field, .. }) if field == "amount"
        ));
    }

    #[test]
    fn given_snake_case_key_when_reading_camel_case_then_found() {
        let m = map(json!({ "account_id": "A1" }));

        let id = Entities::new(&m).required_str(&["accountId"]).unwrap();

        assert_eq!(id, "A1");
    }

    #[test]
    fn given_rfc3339_timestamp_when_reading_date_then_keeps_day() {
        let m = map(json!({ "date": "2024-03-05T10:00:00Z" }));

        let date = Entities::new(&m).required_date("date").unwrap();

        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn given_capitalized_tag_when_reading_enum_then_normalizes() {
        let m = map(json!({ "type": "Expense" }));

        let kind: TransactionType = Entities::new(&m).required_enum(&["type"]).unwrap();

        assert_eq!(kind, TransactionType::Expense);
    }

    #[test]
    fn given_blank_string_when_reading_required_then_missing() {
        let m = map(json!({ "accountId": "  " }));

        let result = Entities::new(&m).required_str(&["accountId"]);

        assert!(result.is_err());
    }
}
