//! Strict decoding of untyped request payloads into [`TransactionFeatures`].
//!
//! Checks run fail-fast in a fixed order: every schema column must be present,
//! then every value must convert to a finite float. Keys outside the schema
//! are ignored.

use serde_json::{Map, Value};

use crate::error::{PredictError, ValidationError};
use crate::schema::{FEATURE_COLUMNS, FEATURE_COUNT};
use crate::types::TransactionFeatures;

/// Parse a raw request body. An empty body decodes to `null`, which the
/// feature decoder reports as missing fields; anything else that is not JSON
/// is [`PredictError::MalformedBody`].
pub fn parse_body(body: &[u8]) -> Result<Value, PredictError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| PredictError::MalformedBody(e.to_string()))
}

/// Decode a JSON payload into a feature record.
pub fn decode_features(raw: &Value) -> Result<TransactionFeatures, ValidationError> {
    let map = match raw {
        Value::Object(map) if !map.is_empty() => map,
        _ => return Err(missing(FEATURE_COLUMNS.iter().copied())),
    };

    let absent: Vec<&str> = FEATURE_COLUMNS
        .iter()
        .copied()
        .filter(|c| !map.contains_key(*c))
        .collect();
    if !absent.is_empty() {
        return Err(missing(absent));
    }

    let mut v = [0.0; FEATURE_COUNT];
    for (slot, name) in v.iter_mut().zip(FEATURE_COLUMNS) {
        *slot = to_float(name, &map[name])?;
    }
    Ok(TransactionFeatures::from_vector(v))
}

/// Build a payload from values given positionally in schema order.
///
/// Values past the schema width are dropped; a short list leaves the
/// trailing columns absent.
pub fn positional_payload<S: AsRef<str>>(values: &[S]) -> Value {
    let map: Map<String, Value> = FEATURE_COLUMNS
        .iter()
        .zip(values)
        .map(|(name, v)| (name.to_string(), Value::String(v.as_ref().to_owned())))
        .collect();
    Value::Object(map)
}

fn missing<'a>(names: impl IntoIterator<Item = &'a str>) -> ValidationError {
    ValidationError::MissingFields(names.into_iter().map(str::to_owned).collect())
}

fn to_float(field: &str, value: &Value) -> Result<f64, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidType {
        field: field.to_owned(),
        reason,
    };

    let x = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| invalid(format!("number {n} is not representable as a float")))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(format!("could not convert string to float: '{s}'")))?,
        Value::Null => return Err(invalid("expected a number, got null".into())),
        Value::Bool(_) => return Err(invalid("expected a number, got a boolean".into())),
        Value::Array(_) => return Err(invalid("expected a number, got an array".into())),
        Value::Object(_) => return Err(invalid("expected a number, got an object".into())),
    };

    if !x.is_finite() {
        return Err(invalid(format!("{x} is not a finite number")));
    }
    Ok(x)
}
