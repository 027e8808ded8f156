//! Request payloads and their wire encoding

use crate::error::ConfigError;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// What the caller wants to send as a body.
///
/// The shape is decided once, when the value is converted into a `Payload`;
/// encoding never looks at it again.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
}

impl Payload {
    /// Build a form payload from name/value pairs
    pub fn form<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Payload::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Serialize any value into a JSON payload
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ConfigError> {
        serde_json::to_value(value)
            .map(Payload::Json)
            .map_err(|e| ConfigError::PayloadEncoding(e.to_string()))
    }

    /// Encode into body bytes plus the content type it implies
    pub fn encode(self) -> Result<RequestBody, ConfigError> {
        let body = match self {
            Payload::Text(text) => RequestBody::new(text.into_bytes(), None),
            Payload::Bytes(bytes) => RequestBody::new(bytes, None),
            Payload::Form(fields) => {
                let encoded = serde_urlencoded::to_string(&fields)
                    .map_err(|e| ConfigError::PayloadEncoding(e.to_string()))?;
                RequestBody::new(encoded.into_bytes(), Some(CONTENT_TYPE_FORM))
            }
            Payload::Json(value) => {
                let encoded = serde_json::to_vec(&value)
                    .map_err(|e| ConfigError::PayloadEncoding(e.to_string()))?;
                RequestBody::new(encoded, Some(CONTENT_TYPE_JSON))
            }
        };
        Ok(body)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

impl From<HashMap<String, String>> for Payload {
    fn from(fields: HashMap<String, String>) -> Self {
        Payload::form(fields)
    }
}

impl From<BTreeMap<String, String>> for Payload {
    fn from(fields: BTreeMap<String, String>) -> Self {
        Payload::form(fields)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Payload::Json(value)
    }
}

/// An encoded body waiting to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    bytes: Vec<u8>,
    content_type: Option<&'static str>,
}

impl RequestBody {
    fn new(bytes: Vec<u8>, content_type: Option<&'static str>) -> Self {
        Self {
            bytes,
            content_type,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn content_type(&self) -> Option<&'static str> {
        self.content_type
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
