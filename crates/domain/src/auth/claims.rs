//! Offline decoding of bearer token claims.
//!
//! Tokens are JWTs issued by the backend. Only the payload segment is read;
//! the signature is never verified here, the backend remains the authority.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, NO_PAD};
use base64::engine::DecodePaddingMode;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

/// base64url that accepts payloads with or without `=` padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    NO_PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Reasons a token could not be decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The token string is empty.
    #[error("token is empty")]
    Empty,

    /// The token has no payload segment.
    #[error("token has no payload segment")]
    MissingPayload,

    /// The payload is not valid base64url.
    #[error("token payload is not valid base64url: {0}")]
    Base64(String),

    /// The payload is not a JSON object.
    #[error("token payload is not a JSON object: {0}")]
    Claims(String),

    /// The `exp` claim is present but is not a usable timestamp.
    #[error("token expiry claim is not a valid timestamp")]
    InvalidExpiry,
}

/// Decodes the self-contained claims of a bearer token.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionDecoder;

impl SessionDecoder {
    /// Decodes the raw claim set of a token.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the token is not a well-formed JWT.
    pub fn decode_claims(token: &str) -> Result<Map<String, Value>, DecodeError> {
        if token.is_empty() {
            return Err(DecodeError::Empty);
        }

        let payload = token
            .split('.')
            .nth(1)
            .filter(|segment| !segment.is_empty())
            .ok_or(DecodeError::MissingPayload)?;

        let bytes = PAYLOAD_ENGINE
            .decode(payload)
            .map_err(|e| DecodeError::Base64(e.to_string()))?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(claims)) => Ok(claims),
            Ok(other) => Err(DecodeError::Claims(format!("expected object, found {other}"))),
            Err(e) => Err(DecodeError::Claims(e.to_string())),
        }
    }

    /// Extracts the expiry instant from a token.
    ///
    /// Returns `Ok(None)` for tokens without an `exp` claim (non-expiring).
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the token is malformed or `exp` is not numeric.
    pub fn decode_expiry(token: &str) -> Result<Option<DateTime<Utc>>, DecodeError> {
        let claims = Self::decode_claims(token)?;
        match claims.get("exp") {
            None | Some(Value::Null) => Ok(None),
            Some(exp) => exp
                .as_f64()
                .and_then(seconds_to_datetime)
                .map(Some)
                .ok_or(DecodeError::InvalidExpiry),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn seconds_to_datetime(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    // Millisecond resolution is plenty for expiry checks.
    DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)
}
