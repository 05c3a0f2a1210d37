//! Flat wire records
//!
//! Every service speaks flat string-keyed JSON bodies. Values may arrive as
//! JSON numbers or as quoted numeric strings; both are accepted. Typed
//! accessors perform the request validation: a missing or non-numeric field
//! is a malformed request, and identifiers/quantities must be positive.

use serde_json::Value;

use crate::error::ApiError;

/// A flat string-keyed request body
#[derive(Debug, Clone, Default)]
pub struct FlatRequest(serde_json::Map<String, Value>);

impl FlatRequest {
    /// Accepts only a flat JSON object
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ApiError::invalid("Invalid Request")),
        }
    }

    /// The `command` discriminator, lowercased
    pub fn command(&self) -> Option<String> {
        self.str_opt("command").map(|c| c.to_ascii_lowercase())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Optional string field; numbers are stringified
    pub fn str_opt(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Required non-empty string field
    pub fn str_field(&self, key: &str) -> Result<String, ApiError> {
        match self.str_opt(key) {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Err(ApiError::invalid("Invalid Request")),
        }
    }

    /// Optional integer field; `None` when absent, error when present but
    /// non-numeric
    pub fn int_opt(&self, key: &str) -> Result<Option<i64>, ApiError> {
        let Some(raw) = self.0.get(key) else {
            return Ok(None);
        };
        let parsed = match raw {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| ApiError::invalid("Invalid Request"))
    }

    /// Required positive identifier. Negative, zero, or non-numeric values
    /// short-circuit before any lookup.
    pub fn id_field(&self, key: &str) -> Result<i64, ApiError> {
        match self.int_opt(key)? {
            Some(v) if v > 0 => Ok(v),
            _ => Err(ApiError::invalid("Invalid Request")),
        }
    }

    /// Required positive quantity
    pub fn qty_field(&self, key: &str) -> Result<i64, ApiError> {
        self.id_field(key)
    }
}

/// True when the whole string parses as an integer. The identity service
/// rejects usernames/emails/passwords that are bare numbers.
pub fn is_integer(s: &str) -> bool {
    !s.is_empty() && s.trim().parse::<i64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn req(v: Value) -> FlatRequest {
        FlatRequest::from_value(v).unwrap()
    }

    #[test]
    fn rejects_non_object_body() {
        assert!(FlatRequest::from_value(json!([1, 2])).is_err());
        assert!(FlatRequest::from_value(json!("place order")).is_err());
    }

    #[test]
    fn id_field_accepts_numbers_and_numeric_strings() {
        let r = req(json!({"user_id": 7, "product_id": "12"}));
        assert_eq!(r.id_field("user_id").unwrap(), 7);
        assert_eq!(r.id_field("product_id").unwrap(), 12);
    }

    #[test]
    fn id_field_rejects_missing_zero_negative_and_garbage() {
        let r = req(json!({"a": 0, "b": -3, "c": "seven", "d": true}));
        assert!(r.id_field("missing").is_err());
        assert!(r.id_field("a").is_err());
        assert!(r.id_field("b").is_err());
        assert!(r.id_field("c").is_err());
        assert!(r.id_field("d").is_err());
    }

    #[test]
    fn command_is_case_insensitive() {
        let r = req(json!({"command": "Place Order"}));
        assert_eq!(r.command().as_deref(), Some("place order"));
    }

    #[test]
    fn integer_like_strings() {
        assert!(is_integer("12345"));
        assert!(is_integer(" -7 "));
        assert!(!is_integer("alice"));
        assert!(!is_integer("a1"));
        assert!(!is_integer(""));
    }
}
