//! requests - a fluent, chainable HTTP client
//!
//! A [`RequestBuilder`] accumulates method, URL, query, headers, cookies and
//! body through chained calls; a terminal verb hands it to the transport and
//! returns a [`Response`] that decodes gzip bodies, flattens headers and can
//! feed `Set-Cookie` values back into the next request.

pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod utils;

pub use config::{Config, HttpMethod, ProtocolPreference, TransportConfig};
pub use error::{ConfigError, DecodeError, RequestsError, Result};
pub use http::{Payload, RequestBuilder, Response};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
