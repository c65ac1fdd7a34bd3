//! Stored representation of a sensor reading and of batch-read input.
//!
//! Records are JSON objects with the field names already present on deployed
//! ledgers: `{"ID":..,"Timestamp":..,"Value":..}`. Lowercase names are accepted
//! on decode.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ContractError;

/// One sensor observation. `id` is the ledger key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorRecord {
    #[serde(rename = "ID", alias = "id")]
    pub id: String,
    /// Caller supplied, opaque to the ledger.
    #[serde(rename = "Timestamp", alias = "timestamp")]
    pub timestamp: String,
    #[serde(rename = "Value", alias = "value")]
    pub value: i64,
}

impl SensorRecord {
    pub fn new(id: impl Into<String>, timestamp: impl Into<String>, value: i64) -> Self {
        Self {
            id: id.into(),
            timestamp: timestamp.into(),
            value,
        }
    }
}

/// Deterministic: same record, same bytes.
pub fn encode(record: &SensorRecord) -> Result<Vec<u8>, ContractError> {
    serde_json::to_vec(record)
        .map_err(|e| ContractError::InvalidInput(format!("encode record {}: {e}", record.id)))
}

/// Parse stored bytes. The payload must be a JSON object before any field is read.
pub fn decode(bytes: &[u8]) -> Result<SensorRecord, ContractError> {
    let doc: Value = serde_json::from_slice(bytes)
        .map_err(|e| ContractError::Decode(format!("malformed record payload: {e}")))?;
    if !doc.is_object() {
        return Err(ContractError::Decode(format!(
            "record payload is not a JSON object: {}",
            json_type(&doc)
        )));
    }
    serde_json::from_value(doc).map_err(|e| ContractError::Decode(format!("record fields: {e}")))
}

/// Parse a JSON array of ids, e.g. `["s1","s2"]`. Order and duplicates are kept.
///
/// Text that is not JSON at all is a `Decode` error; JSON of the wrong shape is
/// `InvalidInput`.
pub fn validate_batch_input(raw: &str) -> Result<Vec<String>, ContractError> {
    let doc: Value = serde_json::from_str(raw)
        .map_err(|e| ContractError::Decode(format!("invalid JSON object as argument: {e}")))?;

    let items = match doc {
        Value::Array(items) => items,
        other => {
            return Err(ContractError::InvalidInput(format!(
                "expected a JSON array of ids, got {}",
                json_type(&other)
            )));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::String(id) => Ok(id),
            other => Err(ContractError::InvalidInput(format!(
                "element {idx} is {}, expected string",
                json_type(&other)
            ))),
        })
        .collect()
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContractErrorKind;

    #[test]
    fn should_round_trip_record() {
        // given
        let record = SensorRecord::new("s1", "2024-01-01T00:00:00Z", -42);

        // when
        let decoded = decode(&encode(&record).unwrap()).unwrap();

        // then
        assert_eq!(decoded, record);
    }

    #[test]
    fn should_encode_deployed_field_names_in_fixed_order() {
        // given
        let record = SensorRecord::new("s1", "t0", 7);

        // when
        let bytes = encode(&record).unwrap();

        // then
        assert_eq!(bytes, br#"{"ID":"s1","Timestamp":"t0","Value":7}"#.to_vec());
        assert_eq!(bytes, encode(&record).unwrap());
    }

    #[test]
    fn should_accept_lowercase_field_names() {
        // given
        let bytes = br#"{"id":"s9","timestamp":"t","value":150,"unit":"C"}"#;

        // when
        let record = decode(bytes).unwrap();

        // then
        assert_eq!(record, SensorRecord::new("s9", "t", 150));
    }

    #[test]
    fn should_reject_malformed_payloads() {
        let cases: [&[u8]; 5] = [
            b"",
            b"{\"ID\":",
            b"[1,2,3]",
            b"\"just a string\"",
            br#"{"ID":"s1","Timestamp":"t","Value":"high"}"#,
        ];
        for bytes in cases {
            let err = decode(bytes).unwrap_err();
            assert_eq!(err.kind(), ContractErrorKind::Decode, "{bytes:?}");
        }
    }

    #[test]
    fn should_reject_missing_field() {
        // when
        let err = decode(br#"{"ID":"s1","Value":1}"#).unwrap_err();

        // then
        assert_eq!(err.kind(), ContractErrorKind::Decode);
        assert!(err.to_string().contains("Timestamp"), "{err}");
    }

    #[test]
    fn should_parse_batch_ids_in_order_with_duplicates() {
        // when
        let ids = validate_batch_input(r#"["b","a","b"]"#).unwrap();

        // then
        assert_eq!(ids, vec!["b", "a", "b"]);
    }

    #[test]
    fn should_parse_empty_batch() {
        assert!(validate_batch_input("[]").unwrap().is_empty());
    }

    #[test]
    fn should_fail_decode_for_non_json_batch_input() {
        // when
        let err = validate_batch_input("[\"a\",").unwrap_err();

        // then
        assert_eq!(err.kind(), ContractErrorKind::Decode);
    }

    #[test]
    fn should_fail_invalid_input_for_wrong_batch_shape() {
        for raw in [r#"{"ids":["a"]}"#, r#""a""#, r#"["a",1]"#, r#"[null]"#] {
            let err = validate_batch_input(raw).unwrap_err();
            assert_eq!(err.kind(), ContractErrorKind::InvalidInput, "{raw}");
        }
    }
}
