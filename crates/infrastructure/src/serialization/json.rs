//! JSON helpers for storage and settings files.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// JSON deserialization failed.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(serde_json::Error),

    /// UTF-8 encoding error.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serializes a value to pretty JSON with a trailing newline.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;

    let mut json = String::from_utf8(buffer)?;
    json.push('\n');
    Ok(json)
}

/// Same as [`to_json_stable`], as bytes for direct file writing.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    to_json_stable(value).map(String::into_bytes)
}

/// Deserializes JSON from file bytes.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or doesn't match the expected type.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::Deserialize)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn storage_map_is_sorted_and_newline_terminated() {
        let mut map = BTreeMap::new();
        map.insert("user_details", r#"{"id":1}"#);
        map.insert("access_token", "abc");

        let json = to_json_stable(&map).unwrap();
        assert_eq!(
            json,
            "{\n  \"access_token\": \"abc\",\n  \"user_details\": \"{\\\"id\\\":1}\"\n}\n"
        );
    }

    #[test]
    fn bytes_round_trip() {
        let mut original = BTreeMap::new();
        original.insert("access_token".to_string(), "abc".to_string());

        let bytes = to_json_stable_bytes(&original).unwrap();
        let restored: BTreeMap<String, String> = from_json_bytes(&bytes).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn invalid_bytes_are_a_deserialize_error() {
        let result: Result<BTreeMap<String, String>, _> = from_json_bytes(b"{ nope");
        assert!(matches!(result, Err(SerializationError::Deserialize(_))));
    }
}
