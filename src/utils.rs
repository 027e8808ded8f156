//! Utility functions and helpers

use crate::error::ConfigError;
use url::Url;

/// URL validation and parsing utilities
pub struct UrlUtils;

impl UrlUtils {
    /// Parse an absolute request URL
    pub fn parse_absolute(input: &str) -> std::result::Result<Url, ConfigError> {
        Url::parse(input).map_err(|source| ConfigError::MalformedUrl {
            input: input.to_string(),
            source,
        })
    }

    /// Validate a proxy address, adding `http://` if no scheme is provided
    pub fn parse_proxy(input: &str) -> std::result::Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidProxy {
            input: input.to_string(),
            reason,
        };

        let url_str = if input.contains("://") {
            input.to_string()
        } else {
            format!("http://{}", input)
        };

        let url = Url::parse(&url_str).map_err(|e| invalid(e.to_string()))?;
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }
        match url.scheme() {
            "http" | "https" | "socks5" | "socks5h" => Ok(url),
            other => Err(invalid(format!("unsupported scheme '{}'", other))),
        }
    }
}

/// Content-Type helpers
pub struct ContentTypeUtils;

impl ContentTypeUtils {
    /// Extract the `charset` parameter from a Content-Type value
    pub fn charset(content_type: &str) -> Option<&str> {
        content_type.split(';').skip(1).find_map(|param| {
            let (key, value) = param.split_once('=')?;
            if key.trim().eq_ignore_ascii_case("charset") {
                Some(value.trim().trim_matches('"'))
            } else {
                None
            }
        })
    }
}
