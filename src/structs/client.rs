use crate::errors::GigzError;
use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;

/// Base URL used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Gigz Client options. Pass this into the `new()` function of the Gigz Client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL of the Gigz REST API, including the `/api` prefix.
    pub api_base_url: String,
    /// Whether Gigz should print debug statements.
    pub debug: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            debug: false,
        }
    }
}

impl ClientOptions {
    /// Reads `GIGZ_API_BASE_URL` and `GIGZ_DEBUG` from the environment, falling back to the defaults.
    pub fn from_env() -> Self {
        let mut options = Self::default();

        if let Ok(url) = std::env::var("GIGZ_API_BASE_URL") {
            if !url.trim().is_empty() {
                options.api_base_url = url.trim().to_string();
            }
        }

        if let Ok(debug) = std::env::var("GIGZ_DEBUG") {
            options.debug = matches!(debug.trim(), "1" | "true" | "yes");
        }

        options
    }
}

/// Percent-encodes one path segment. Ids and emails may hold `/`, `#`, `?` or `%`.
pub fn path_segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// A request to the Gigz API, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the base URL, always starting with `/`.
    pub path: String,
    pub body: Option<Value>,
    /// Bearer credential for the `Authorization` header.
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: &str) -> Self {
        // Append a / to path if it does not start with one
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        Self {
            method,
            path,
            body: None,
            bearer: None,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: &str) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attaches a JSON body.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, GigzError> {
        self.body = Some(serde_json::to_value(body).or(Err(GigzError::FailedToEncode))?);
        Ok(self)
    }

    pub fn bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }
}

/// Raw response from the Gigz API. Empty or non-JSON bodies are `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Moves requests to the API and back. Returns `Err` only when no response was received.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, GigzError>;
}

/// `Transport` backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or proxies).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, GigzError> {
        let url = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), request.path);

        let mut builder = self.http.request(request.method, url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| {
            tracing::debug!("request failed before a response arrived: {}", err);
            GigzError::NetworkError
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.or(Err(GigzError::NetworkError))?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        Ok(ApiResponse { status, body })
    }
}

/// Gigz Client. Used to interact with the Gigz API.
#[derive(Clone)]
pub struct Client {
    /// Whether Gigz should print debug statements.
    pub debug: bool,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").field("debug", &self.debug).finish()
    }
}

impl Client {
    /// Creates a new Gigz client talking HTTP to `options.api_base_url`.
    pub fn new(options: ClientOptions) -> Result<Self, GigzError> {
        let base_url = Url::parse(&options.api_base_url).or(Err(GigzError::InvalidBaseUrl))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(GigzError::InvalidBaseUrl);
        }

        Ok(Self::with_transport(
            options,
            Arc::new(HttpTransport::new(base_url)),
        ))
    }

    /// Creates a client on top of any `Transport`.
    pub fn with_transport(options: ClientOptions, transport: Arc<dyn Transport>) -> Self {
        Self {
            debug: options.debug,
            transport,
        }
    }

    /// Sends a request and decodes a successful body into `T`.
    pub async fn api_call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, GigzError> {
        let body = self.api_call_raw(request).await?;
        serde_json::from_value(body).or(Err(GigzError::FailedToDecode))
    }

    /// Sends a request and returns the raw body of a successful response.
    pub async fn api_call_raw(&self, request: ApiRequest) -> Result<Value, GigzError> {
        tracing::debug!(method = %request.method, path = %request.path, "gigz api call");

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(GigzError::from_status(response.status, &response.body));
        }

        Ok(response.body)
    }
}
