//! Configuration management for requests

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

/// Default `User-Agent` sent by every new builder
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:55.0) Gecko/20100101 Firefox/55.0";

/// HTTP method enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    /// Methods that carry a body instead of a query string
    pub fn is_write(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        };
        write!(f, "{}", method)
    }
}

impl FromStr for HttpMethod {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            _ => Err(()),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// Which wire protocol the transport should speak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolPreference {
    /// Plain HTTP/1.1 only
    #[default]
    Http1,
    /// Negotiate HTTP/2 over TLS via ALPN, falling back to HTTP/1.1
    Multiplexed,
}

/// Settings handed to the underlying transport when the client is built
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub proxy: Option<Url>,
    pub verify_certs: bool,
    pub protocol: ProtocolPreference,
    pub follow_redirects: bool,
    pub max_redirects: usize,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            proxy: None,
            verify_certs: true,
            protocol: ProtocolPreference::Http1,
            follow_redirects: true,
            max_redirects: 10,
            timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    pub transport: TransportConfig,
    /// Headers every new builder starts with, in send order
    pub default_headers: Vec<(String, String)>,
    /// Drop the query string before POST and PUT
    pub clear_query_on_write: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            transport: TransportConfig::default(),
            default_headers: vec![
                (
                    "Accept".to_string(),
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
                ),
                (
                    "Accept-Language".to_string(),
                    "zh-CN,zh;q=0.8,en-US;q=0.5,en;q=0.3".to_string(),
                ),
                ("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string()),
                ("Accept-Encoding".to_string(), "gzip".to_string()),
                ("DNT".to_string(), "1".to_string()),
            ],
            clear_query_on_write: true,
        }
    }
}
