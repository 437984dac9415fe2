//! Cookie payload codecs.
//!
//! A codec turns a typed value into a string that can ride in a cookie value
//! and back. `decode` must be the left inverse of `encode` on its own output,
//! and both report failures as [`CodecError`] instead of panicking so the
//! session store can fall back to its default.

use std::marker::PhantomData;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Errors produced while encoding or decoding a cookie payload.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The value holds a character that cannot appear in a cookie value.
    #[error("value is not cookie-safe: contains {0:?}")]
    Unsafe(char),

    /// The payload is not valid URL-safe base64.
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The payload did not (de)serialize as JSON.
    #[error("payload is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode/decode pair for one cookie-persisted type.
pub trait CookieCodec: Send + Sync + 'static {
    type Value: Clone + Send + Sync + 'static;

    /// Encode a value into a cookie-safe payload.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] when the value cannot be represented.
    fn encode(&self, value: &Self::Value) -> Result<String, CodecError>;

    /// Decode a payload previously produced by [`CookieCodec::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] on malformed input.
    fn decode(&self, raw: &str) -> Result<Self::Value, CodecError>;
}

/// First character of `raw` that may not appear in a cookie value.
pub(crate) fn first_unsafe_char(raw: &str) -> Option<char> {
    raw.chars()
        .find(|c| c.is_control() || c.is_whitespace() || matches!(c, ';' | ',' | '"' | '\\'))
}

// =============================================================================
// STRING
// =============================================================================

/// Identity codec for opaque string credentials such as the session token.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl CookieCodec for StringCodec {
    type Value = String;

    fn encode(&self, value: &String) -> Result<String, CodecError> {
        match first_unsafe_char(value) {
            Some(c) => Err(CodecError::Unsafe(c)),
            None => Ok(value.clone()),
        }
    }

    fn decode(&self, raw: &str) -> Result<String, CodecError> {
        Ok(raw.to_owned())
    }
}

// =============================================================================
// JSON
// =============================================================================

/// JSON payload wrapped in unpadded URL-safe base64, so any serde value is
/// cookie-safe.
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> CookieCodec for JsonCodec<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Value = T;

    fn encode(&self, value: &T) -> Result<String, CodecError> {
        let json = serde_json::to_vec(value)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    fn decode(&self, raw: &str) -> Result<T, CodecError> {
        let json = URL_SAFE_NO_PAD.decode(raw.trim())?;
        Ok(serde_json::from_slice(&json)?)
    }
}

#[cfg(test)]
#[path = "codec_test.rs"]
mod tests;
