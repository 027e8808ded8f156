//! HTTP client module
//!
//! This module provides the chainable request builder, the response wrapper
//! it produces, and the transport glue that sits between them and `reqwest`.

use crate::config::{ProtocolPreference, TransportConfig};
use crate::error::{RequestsError, Result};
use reqwest::{Client, ClientBuilder};
use url::Url;

pub mod cookie;
pub mod headers;
pub mod payload;
pub mod request;
pub mod response;

pub use cookie::CookieJar;
pub use headers::HeaderList;
pub use payload::{Payload, RequestBody};
pub use request::RequestBuilder;
pub use response::Response;

/// Transport settings plus the client built from them.
///
/// The client is built on first use and rebuilt after any settings change,
/// so successive configuration calls accumulate on the same settings.
#[derive(Debug, Default)]
pub struct Transport {
    config: TransportConfig,
    client: Option<Client>,
}

impl Transport {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Change the settings; the cached client is dropped
    pub fn configure(&mut self, update: impl FnOnce(&mut TransportConfig)) {
        update(&mut self.config);
        self.client = None;
    }

    /// Get the client for the current settings, building it if needed
    pub fn client(&mut self) -> Result<Client> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = build_client(&self.config)?;
        self.client = Some(client.clone());
        Ok(client)
    }
}

fn build_client(config: &TransportConfig) -> Result<Client> {
    let mut builder = ClientBuilder::new()
        .use_rustls_tls()
        .no_gzip()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .redirect(if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        });

    // Configure proxy if specified
    if let Some(proxy_url) = &config.proxy {
        let proxy = reqwest::Proxy::all(proxy_url.as_str()).map_err(RequestsError::Transport)?;
        builder = builder.proxy(proxy);
    }

    // Configure SSL/TLS
    if !config.verify_certs {
        builder = builder.danger_accept_invalid_certs(true);
    }

    if config.protocol == ProtocolPreference::Http1 {
        builder = builder.http1_only();
    }

    builder.build().map_err(RequestsError::Transport)
}

fn log_request(request: &reqwest::Request) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }

    let url = request.url();
    log::debug!("> {} {}", request.method(), request_path(url));
    if let Some(host) = url.host_str() {
        match url.port() {
            Some(port) => log::debug!("> Host: {}:{}", host, port),
            None => log::debug!("> Host: {}", host),
        }
    }
    for (name, value) in request.headers().iter() {
        let value = value.to_str().unwrap_or("<non-utf8>");
        log::debug!("> {}: {}", name, value);
    }
}

fn request_path(url: &Url) -> String {
    match url[url::Position::BeforePath..].trim() {
        "" => "/".to_string(),
        path => path.to_string(),
    }
}
