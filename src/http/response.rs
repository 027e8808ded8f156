//! HTTP response wrapper: lazy body decoding, headers and cookies

use super::headers::flatten;
use super::request::RequestBuilder;
use crate::error::{DecodeError, RequestsError, Result};
use crate::utils::ContentTypeUtils;
use encoding_rs::{Encoding, UTF_8};
use flate2::read::MultiGzDecoder;
use reqwest::header::{HeaderMap, CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::{StatusCode, Version};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// The outcome of one terminal call.
///
/// Status, headers and `Set-Cookie` pairs are captured when the response
/// arrives. The body is read on the first call to [`bytes`](Self::bytes) (or
/// anything built on it), decompressed if needed, and cached; the underlying
/// stream is consumed exactly once.
///
/// Only the first error is kept. A response that already carries an error
/// returns `None` from every body accessor.
#[derive(Debug)]
pub struct Response {
    raw: Option<reqwest::Response>,
    status: Option<StatusCode>,
    version: Option<Version>,
    headers: HeaderMap,
    set_cookies: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    error: Option<RequestsError>,
}

impl Response {
    /// A response for an attempt that never reached the server
    pub fn failed(error: RequestsError) -> Self {
        Self {
            raw: None,
            status: None,
            version: None,
            headers: HeaderMap::new(),
            set_cookies: Vec::new(),
            body: None,
            error: Some(error),
        }
    }

    pub fn from_raw(raw: reqwest::Response) -> Self {
        let set_cookies = raw
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();
        Self {
            status: Some(raw.status()),
            version: Some(raw.version()),
            headers: raw.headers().clone(),
            set_cookies,
            body: None,
            error: None,
            raw: Some(raw),
        }
    }

    pub fn error(&self) -> Option<&RequestsError> {
        self.error.as_ref()
    }

    /// Status code; a non-2xx status is not an error
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn version(&self) -> Option<Version> {
        self.version
    }

    pub fn raw_headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn record(&mut self, err: RequestsError) {
        log::debug!("response error: {}", err);
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn carried(&mut self) -> &RequestsError {
        self.error
            .get_or_insert_with(|| RequestsError::Unavailable("no response body".to_string()))
    }

    fn unavailable(&self) -> RequestsError {
        RequestsError::Unavailable(
            self.error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no response body".to_string()),
        )
    }

    /// The decoded body, read on first use and cached afterwards
    pub async fn bytes(&mut self) -> Option<&[u8]> {
        if self.error.is_some() {
            return None;
        }
        if self.body.is_none() {
            let raw = self.raw.take()?;
            match read_body(raw, &self.headers).await {
                Ok(body) => self.body = Some(body),
                Err(err) => {
                    self.record(err.into());
                    return None;
                }
            }
        }
        self.body.as_deref()
    }

    /// The body as text, using the charset from `Content-Type` (UTF-8 if absent)
    pub async fn text(&mut self) -> Option<String> {
        let encoding = self
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(ContentTypeUtils::charset)
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(UTF_8);
        let body = self.bytes().await?;
        let (text, _, _) = encoding.decode(body);
        Some(text.into_owned())
    }

    /// Decode the body as JSON.
    ///
    /// A carried error is returned as is; a JSON failure is recorded and
    /// returned.
    pub async fn bind_json<T: DeserializeOwned>(
        &mut self,
    ) -> std::result::Result<T, &RequestsError> {
        let parsed = self
            .bytes()
            .await
            .map(|body| serde_json::from_slice::<T>(body));
        match parsed {
            Some(Ok(value)) => Ok(value),
            Some(Err(err)) => {
                self.record(DecodeError::Json(err).into());
                Err(self.carried())
            }
            None => Err(self.carried()),
        }
    }

    /// Cookie name/value pairs from `Set-Cookie`, attributes dropped
    pub fn cookies(&self) -> Option<HashMap<String, String>> {
        if self.set_cookies.is_empty() {
            return None;
        }
        Some(self.set_cookies.iter().cloned().collect())
    }

    /// Headers with repeated lines joined by `;`, keyed by lowercase name.
    ///
    /// `None` only when no response was received.
    pub fn headers(&self) -> Option<HashMap<String, String>> {
        self.status?;
        Some(flatten(&self.headers))
    }

    /// Merge this response's cookies into `builder` for its next request
    pub fn store_cookies_into(&self, builder: &mut RequestBuilder) {
        if self.set_cookies.is_empty() {
            return;
        }
        builder.set_cookies(self.set_cookies.iter().cloned());
    }

    /// Write the decoded body to `path`
    pub async fn save_to_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        if self.bytes().await.is_none() {
            return Err(self.unavailable());
        }
        let body = self.body.as_deref().unwrap_or_default();
        let mut file = File::create(path)?;
        file.write_all(body)?;
        Ok(())
    }

    /// Write the status line, headers and decoded body to `path`
    pub async fn dump_to_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        if self.bytes().await.is_none() {
            return Err(self.unavailable());
        }
        let mut file = File::create(path)?;
        if let (Some(version), Some(status)) = (self.version, self.status) {
            write!(file, "{:?} {}\r\n", version, status)?;
        }
        for (name, value) in self.headers.iter() {
            file.write_all(name.as_str().as_bytes())?;
            file.write_all(b": ")?;
            file.write_all(value.as_bytes())?;
            file.write_all(b"\r\n")?;
        }
        file.write_all(b"\r\n")?;
        file.write_all(self.body.as_deref().unwrap_or_default())?;
        Ok(())
    }
}

async fn read_body(
    raw: reqwest::Response,
    headers: &HeaderMap,
) -> std::result::Result<Vec<u8>, DecodeError> {
    let bytes = raw.bytes().await.map_err(DecodeError::Read)?;
    decode_body(headers, &bytes)
}

fn is_gzip(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().eq_ignore_ascii_case("gzip"))
        .unwrap_or(false)
}

/// Undo `Content-Encoding: gzip`; other bodies pass through untouched
pub fn decode_body(headers: &HeaderMap, raw: &[u8]) -> std::result::Result<Vec<u8>, DecodeError> {
    if raw.is_empty() || !is_gzip(headers) {
        return Ok(raw.to_vec());
    }
    let mut decoded = Vec::new();
    MultiGzDecoder::new(raw)
        .read_to_end(&mut decoded)
        .map_err(DecodeError::Gzip)?;
    log::debug!("gunzipped body: {} -> {} bytes", raw.len(), decoded.len());
    Ok(decoded)
}
