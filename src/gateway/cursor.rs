use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{de::DeserializeOwned, Serialize};

use super::GatewayError;

/// Opaque pagination marker referencing the last record of a page.
///
/// Callers only store it and hand it back. What it encodes is up to the
/// gateway that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    /// Encode a gateway-specific position as a URL-safe token.
    pub fn encode<T: Serialize>(position: &T) -> Result<Self, GatewayError> {
        let bytes =
            bitcode::serialize(position).map_err(|e| GatewayError::Validation(e.to_string()))?;
        Ok(Cursor(URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Decode a position previously produced by [`Cursor::encode`].
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(&self.0)
            .map_err(|e| GatewayError::Validation(format!("malformed cursor: {}", e)))?;
        bitcode::deserialize(&bytes)
            .map_err(|e| GatewayError::Validation(format!("malformed cursor: {}", e)))
    }

    /// Wrap a token received from elsewhere (e.g. a backend response).
    pub fn from_token(token: impl Into<String>) -> Self {
        Cursor(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
