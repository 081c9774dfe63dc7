//! Postmark async client implementation.

use crate::email::EmailService;
use crate::error::{ErrorResponse, RawResponse};
use crate::{Error, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.postmarkapp.com/";
const USER_AGENT_VALUE: &str = concat!("postmark-client/", env!("CARGO_PKG_VERSION"));

const ENV_SERVER_TOKEN: &str = "POSTMARK_SERVER_TOKEN";
const ENV_ACCOUNT_TOKEN: &str = "POSTMARK_ACCOUNT_TOKEN";
const ENV_BASE_URL: &str = "POSTMARK_BASE_URL";

/// Async client for the Postmark API.
///
/// Use [`Client::new`] for defaults or [`Client::builder`] for custom settings
/// like tokens, a base URL override, proxies, or an injected `reqwest::Client`.
/// The client is cheap to share by reference; construct it once and reuse it.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    server_token: String,
    account_token: String,
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client with the default base URL, no tokens and a default transport.
    ///
    /// # Examples
    /// ```no_run
    /// # use postmark_client::Client;
    /// # fn main() -> Result<(), postmark_client::Error> {
    /// let mut client = Client::new()?;
    /// client.set_server_token("server-token");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// Base URL every operation path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn server_token(&self) -> &str {
        &self.server_token
    }

    pub fn account_token(&self) -> &str {
        &self.account_token
    }

    /// Replace the server token sent with email operations.
    pub fn set_server_token(&mut self, token: impl Into<String>) {
        self.server_token = token.into();
    }

    /// Replace the account token.
    pub fn set_account_token(&mut self, token: impl Into<String>) {
        self.account_token = token.into();
    }

    /// Access the email endpoints.
    pub fn email(&self) -> EmailService<'_> {
        EmailService::new(self)
    }

    /// Build a request for `path`, resolved relative to the base URL.
    ///
    /// Paths should be given without a leading slash. When `body` is present
    /// it is JSON-encoded as the payload; otherwise the request has no body.
    /// No headers are set.
    ///
    /// # Errors
    /// [`Error::Url`] when `path` is not a valid relative reference,
    /// [`Error::Json`] when the body cannot be serialized.
    pub fn new_request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Request>
    where
        B: Serialize + ?Sized,
    {
        let url = self.base_url.join(path)?;

        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        Ok(builder.build()?)
    }

    /// Send a request and read the whole response.
    ///
    /// Non-2xx statuses are turned into [`Error::Api`] by [`check_response`].
    pub async fn execute(&self, request: reqwest::Request) -> Result<RawResponse> {
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(%method, %url, "sending postmark request");

        let response = self.http.execute(request).await?;
        let status = response.status();
        let url = response.url().clone();
        let headers = response.headers().clone();

        // The body is always drained here so the connection is released
        // before returning, whatever the status.
        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(err) if status.is_success() => return Err(err.into()),
            Err(err) => {
                tracing::debug!(error = %err, "failed to read error response body");
                Vec::new()
            }
        };

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "postmark response received");

        check_response(RawResponse {
            status,
            url,
            headers,
            body,
        })
    }

    /// Send a request and decode a successful JSON payload into `T`.
    pub async fn execute_json<T>(&self, request: reqwest::Request) -> Result<(T, RawResponse)>
    where
        T: DeserializeOwned,
    {
        let raw = self.execute(request).await?;
        match serde_json::from_slice(&raw.body) {
            Ok(value) => Ok((value, raw)),
            Err(source) => Err(Error::Decode {
                source,
                response: Box::new(raw),
            }),
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("http", &self.http)
            .field("base_url", &self.base_url.as_str())
            .field("server_token", &redact(&self.server_token))
            .field("account_token", &redact(&self.account_token))
            .finish()
    }
}

fn redact(token: &str) -> &'static str {
    if token.is_empty() { "" } else { "<redacted>" }
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "ErrorCode", default)]
    error_code: i64,
    #[serde(rename = "Message", default)]
    message: String,
}

/// Check a response for an API error.
///
/// A status outside `200..=299` is an error. Its code and message are decoded
/// from the body when possible; an empty or malformed body yields code `0`
/// and an empty message rather than a decode failure.
pub fn check_response(response: RawResponse) -> Result<RawResponse> {
    if response.status.is_success() {
        return Ok(response);
    }

    let body: ApiErrorBody = serde_json::from_slice(&response.body).unwrap_or_default();
    tracing::warn!(
        status = response.status.as_u16(),
        error_code = body.error_code,
        message = %body.message,
        "postmark api error"
    );

    Err(Error::Api(ErrorResponse {
        error_code: body.error_code,
        message: body.message,
        response: Box::new(response),
    }))
}

/// Append `options` to `path` as URL query parameters.
///
/// `options` must serialize to a flat struct or map; each field is emitted
/// under its serialized name, in name order. Fields skipped during
/// serialization (`skip_serializing_if`) are left out, `null` fields are sent
/// with an empty value and sequences repeat the key once per element. `None`
/// returns `path` unchanged.
pub fn add_options<O>(path: &str, options: Option<&O>) -> Result<String>
where
    O: Serialize + ?Sized,
{
    let Some(options) = options else {
        return Ok(path.to_string());
    };

    let fields = match serde_json::to_value(options)? {
        serde_json::Value::Object(fields) => fields,
        other => return Err(Error::Query(format!("options must be a struct, got {other}"))),
    };

    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in fields {
        match value {
            serde_json::Value::Array(items) => {
                for item in items {
                    query.append_pair(&name, &query_value(&name, item)?);
                }
            }
            value => {
                query.append_pair(&name, &query_value(&name, value)?);
            }
        }
    }

    let (path, _) = path.split_once('?').unwrap_or((path, ""));
    let query = query.finish();
    if query.is_empty() {
        Ok(path.to_string())
    } else {
        Ok(format!("{path}?{query}"))
    }
}

fn query_value(name: &str, value: serde_json::Value) -> Result<String> {
    match value {
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(Error::Query(format!(
            "option `{name}` must be a scalar or a list of scalars, got {other}"
        ))),
    }
}

/// Builder for configuring a Postmark client.
///
/// Start with [`Client::builder`] to override defaults.
#[derive(Clone)]
pub struct ClientBuilder {
    http: Option<reqwest::Client>,
    base_url: String,
    server_token: String,
    account_token: String,
    proxy: Option<String>,
    user_agent: String,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - Base URL `https://api.postmarkapp.com/`
    /// - Empty server and account tokens
    /// - No proxy, no timeout
    /// - A fresh `reqwest::Client`
    pub fn new() -> Self {
        Self {
            http: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            server_token: String::new(),
            account_token: String::new(),
            proxy: None,
            user_agent: USER_AGENT_VALUE.to_string(),
            timeout: None,
        }
    }

    /// Create a builder seeded from the environment.
    ///
    /// Reads `POSTMARK_SERVER_TOKEN`, `POSTMARK_ACCOUNT_TOKEN` and
    /// `POSTMARK_BASE_URL`; unset variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut builder = Self::new();
        if let Some(token) = lookup(ENV_SERVER_TOKEN) {
            builder.server_token = token;
        }
        if let Some(token) = lookup(ENV_ACCOUNT_TOKEN) {
            builder.account_token = token;
        }
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            builder.base_url = base_url;
        }
        builder
    }

    /// Set the server token used by email operations.
    pub fn server_token(mut self, token: impl Into<String>) -> Self {
        self.server_token = token.into();
        self
    }

    /// Set the account token.
    pub fn account_token(mut self, token: impl Into<String>) -> Self {
        self.account_token = token.into();
        self
    }

    /// Override the API base URL.
    ///
    /// Useful for testing against a local mock server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use an existing `reqwest::Client` as transport.
    ///
    /// Proxy, user agent and timeout settings on this builder are
    /// ignored in that case; configure them on the injected client instead.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Set a proxy URL (e.g., "http://127.0.0.1:8080" or "socks5://...").
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Total per-request timeout enforced by the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    ///
    /// No network activity happens here.
    ///
    /// # Errors
    /// [`Error::Url`] for an unparsable base URL, [`Error::Request`] when the
    /// transport cannot be constructed (e.g. an invalid proxy URL).
    ///
    /// # Examples
    /// ```no_run
    /// # use postmark_client::Client;
    /// # fn main() -> Result<(), postmark_client::Error> {
    /// let client = Client::builder()
    ///     .server_token("server-token")
    ///     .user_agent("my-app/1.0")
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<Client> {
        let mut base_url = Url::parse(&self.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = match self.http {
            Some(http) => http,
            None => {
                let mut builder = reqwest::Client::builder().user_agent(self.user_agent);

                if let Some(proxy_url) = &self.proxy {
                    builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
                }
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }

                builder.build()?
            }
        };

        Ok(Client {
            http,
            base_url,
            server_token: self.server_token,
            account_token: self.account_token,
        })
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("http", &self.http)
            .field("base_url", &self.base_url)
            .field("server_token", &redact(&self.server_token))
            .field("account_token", &redact(&self.account_token))
            .field("proxy", &self.proxy)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
