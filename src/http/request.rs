//! Chainable HTTP request builder

use super::cookie::CookieJar;
use super::headers::HeaderList;
use super::payload::{Payload, RequestBody};
use super::response::Response;
use super::{log_request, Transport};
use crate::config::{Config, HttpMethod, ProtocolPreference};
use crate::error::{ConfigError, RequestsError};
use crate::utils::UrlUtils;
use base64::Engine;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, USER_AGENT};
use serde::Serialize;
use url::Url;

/// Accumulates a request through chained calls and executes it on demand.
///
/// Configuration methods never fail outright. The first problem they hit is
/// kept in a sticky slot and reported by the next terminal verb through the
/// returned [`Response`], without touching the network. Later configuration
/// calls still take effect, but they do not replace the recorded error.
///
/// The builder is reusable: terminal verbs leave the URL, headers, cookies and
/// transport settings in place. A body is sent once and then consumed.
///
/// ```no_run
/// # async fn demo() {
/// use requests::RequestBuilder;
///
/// let mut req = RequestBuilder::new();
/// let mut resp = req
///     .set_url("http://localhost:8080/user")
///     .set_query([("name", "Tom"), ("age", "99")])
///     .get()
///     .await;
/// let body = resp.text().await;
/// # }
/// ```
#[derive(Debug)]
pub struct RequestBuilder {
    method: HttpMethod,
    url: Option<Url>,
    headers: HeaderList,
    cookies: CookieJar,
    body: Option<RequestBody>,
    error: Option<ConfigError>,
    transport: Transport,
    clear_query_on_write: bool,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    /// Create a builder with the default headers and transport settings
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let mut headers = HeaderList::new();
        for (name, value) in config.default_headers {
            headers.set(name, value);
        }
        Self {
            method: HttpMethod::default(),
            url: None,
            headers,
            cookies: CookieJar::new(),
            body: None,
            error: None,
            transport: Transport::new(config.transport),
            clear_query_on_write: config.clear_query_on_write,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn headers(&self) -> &HeaderList {
        &self.headers
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// The recorded configuration error, if any
    pub fn error(&self) -> Option<&ConfigError> {
        self.error.as_ref()
    }

    pub fn clear_error(&mut self) -> &mut Self {
        self.error = None;
        self
    }

    fn record(&mut self, err: ConfigError) {
        log::debug!("recording request error: {}", err);
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Set the absolute URL; a parse failure keeps the previous one
    pub fn set_url(&mut self, raw: &str) -> &mut Self {
        match UrlUtils::parse_absolute(raw) {
            Ok(url) => self.url = Some(url),
            Err(err) => self.record(err),
        }
        self
    }

    /// Append query parameters to the URL's existing ones
    pub fn set_query<I, K, V>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let Some(url) = self.url.as_mut() else {
            self.record(ConfigError::NoUrl);
            return self;
        };
        let mut pairs = params.into_iter().peekable();
        if pairs.peek().is_some() {
            let mut query = url.query_pairs_mut();
            for (key, value) in pairs {
                query.append_pair(key.as_ref(), value.as_ref());
            }
        }
        self
    }

    /// Remove the query string from the URL
    pub fn clear_query(&mut self) -> &mut Self {
        if let Some(url) = self.url.as_mut() {
            url.set_query(None);
        }
        self
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.set(name, value);
        self
    }

    pub fn set_headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.headers.set(name, value);
        }
        self
    }

    pub fn remove_header(&mut self, name: &str) -> &mut Self {
        self.headers.remove(name);
        self
    }

    pub fn clear_headers(&mut self) -> &mut Self {
        self.headers.clear();
        self
    }

    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) -> &mut Self {
        self.set_header(USER_AGENT.as_str(), user_agent)
    }

    /// `Authorization: Basic` from base64 of `username:password`
    pub fn set_basic_auth(&mut self, username: &str, password: &str) -> &mut Self {
        let credentials = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", username, password));
        self.set_header(AUTHORIZATION.as_str(), format!("Basic {}", credentials))
    }

    pub fn set_bearer_token(&mut self, token: &str) -> &mut Self {
        self.set_header(AUTHORIZATION.as_str(), format!("Bearer {}", token))
    }

    /// Append a cookie pair, keeping any earlier pair with the same name
    pub fn add_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.cookies.add(name, value);
        self
    }

    /// Merge cookie pairs: existing names are updated in place, new ones appended
    pub fn set_cookies<I, K, V>(&mut self, cookies: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in cookies {
            self.cookies.merge(name, value);
        }
        self
    }

    pub fn remove_cookie(&mut self, name: &str) -> &mut Self {
        self.cookies.remove(name);
        self
    }

    pub fn clear_cookies(&mut self) -> &mut Self {
        self.cookies.clear();
        self
    }

    /// Replace the body; an encoding failure keeps the previous body
    pub fn set_payload(&mut self, payload: impl Into<Payload>) -> &mut Self {
        match payload.into().encode() {
            Ok(body) => self.body = Some(body),
            Err(err) => self.record(err),
        }
        self
    }

    /// Serialize `value` as JSON and use it as the body
    pub fn set_json<T: Serialize + ?Sized>(&mut self, value: &T) -> &mut Self {
        match Payload::json(value) {
            Ok(payload) => self.set_payload(payload),
            Err(err) => {
                self.record(err);
                self
            }
        }
    }

    /// Prefer HTTP/2 negotiated over TLS.
    ///
    /// This also turns off server certificate verification, so any
    /// certificate is accepted. Only use it against hosts you trust.
    pub fn enable_protocol_upgrade(&mut self) -> &mut Self {
        log::warn!("protocol upgrade enabled: TLS certificate verification is disabled");
        self.transport.configure(|config| {
            config.protocol = ProtocolPreference::Multiplexed;
            config.verify_certs = false;
        });
        self
    }

    /// Route requests through a proxy.
    ///
    /// `http://` is assumed when no scheme is given. As with
    /// [`enable_protocol_upgrade`](Self::enable_protocol_upgrade), server
    /// certificates are no longer verified once a proxy is installed.
    pub fn set_proxy(&mut self, address: &str) -> &mut Self {
        match UrlUtils::parse_proxy(address) {
            Ok(proxy) => {
                log::warn!(
                    "proxy {} installed: TLS certificate verification is disabled",
                    proxy
                );
                self.transport.configure(|config| {
                    config.proxy = Some(proxy);
                    config.verify_certs = false;
                });
            }
            Err(err) => self.record(err),
        }
        self
    }

    pub async fn get(&mut self) -> Response {
        self.send(HttpMethod::Get).await
    }

    pub async fn post(&mut self) -> Response {
        self.send(HttpMethod::Post).await
    }

    pub async fn post_payload(&mut self, payload: impl Into<Payload>) -> Response {
        self.set_payload(payload);
        self.post().await
    }

    pub async fn post_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Response {
        self.set_json(value);
        self.post().await
    }

    pub async fn post_form<I, K, V>(&mut self, fields: I) -> Response
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.set_payload(Payload::form(fields));
        self.post().await
    }

    pub async fn put(&mut self) -> Response {
        self.send(HttpMethod::Put).await
    }

    pub async fn put_payload(&mut self, payload: impl Into<Payload>) -> Response {
        self.set_payload(payload);
        self.put().await
    }

    pub async fn patch(&mut self) -> Response {
        self.send(HttpMethod::Patch).await
    }

    pub async fn delete(&mut self) -> Response {
        self.send(HttpMethod::Delete).await
    }

    pub async fn head(&mut self) -> Response {
        self.send(HttpMethod::Head).await
    }

    pub async fn options(&mut self) -> Response {
        self.send(HttpMethod::Options).await
    }

    /// Execute with the given method.
    ///
    /// POST and PUT drop the query string first unless the builder was
    /// configured otherwise. Errors never escape as `Err`; check
    /// [`Response::error`].
    pub async fn send(&mut self, method: HttpMethod) -> Response {
        self.method = method;
        if self.clear_query_on_write && method.is_write() {
            self.clear_query();
        }
        self.execute().await
    }

    async fn execute(&mut self) -> Response {
        if let Some(err) = &self.error {
            return Response::failed(err.clone().into());
        }
        let Some(url) = self.url.clone() else {
            return Response::failed(ConfigError::NoUrl.into());
        };

        let client = match self.transport.client() {
            Ok(client) => client,
            Err(err) => return Response::failed(err),
        };

        let mut request = client.request(self.method.into(), url);

        // Add headers
        for (name, value) in self.headers.iter() {
            if name.eq_ignore_ascii_case(COOKIE.as_str()) {
                continue;
            }
            request = request.header(name, value);
        }

        if let Some(cookie_header) = self.cookie_header() {
            request = request.header(COOKIE, cookie_header);
        }

        if let Some(body) = &self.body {
            if let Some(content_type) = body.content_type() {
                if !self.headers.contains(CONTENT_TYPE.as_str()) {
                    request = request.header(CONTENT_TYPE, content_type);
                }
            }
            request = request.body(body.as_bytes().to_vec());
        }

        // a request that never gets built keeps its body for the next attempt
        let request = match request.build() {
            Ok(request) => request,
            Err(err) => return Response::failed(RequestsError::Transport(err)),
        };
        self.body = None;

        log_request(&request);

        match client.execute(request).await {
            Ok(raw) => Response::from_raw(raw),
            Err(err) => {
                log::debug!("transport error: {}", err);
                Response::failed(RequestsError::Transport(err))
            }
        }
    }

    /// The `Cookie` line that will be sent: an explicit `Cookie` header
    /// first, then the jar.
    pub fn cookie_header(&self) -> Option<String> {
        let explicit = self.headers.get(COOKIE.as_str());
        match (explicit, self.cookies.to_header_value()) {
            (Some(existing), Some(jar)) => Some(format!("{}; {}", existing, jar)),
            (Some(existing), None) => Some(existing.to_string()),
            (None, jar) => jar,
        }
    }
}
