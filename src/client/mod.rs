//! HTTP client wrapper for the Knowhub REST API.
//!
//! [`ApiClient`] sends JSON requests with session cookies and caller
//! identification headers, unwraps the `{success, msg, data}` envelope, and
//! mirrors each call into the debug log when a [`DebugRecorder`] is attached.
//! Errors are logged and then returned unchanged; there are no retries.

pub mod envelope;
pub mod error;
pub mod headers;
pub mod path;

pub use envelope::ApiEnvelope;
pub use error::{extract_message, ClientError, GENERIC_ERROR_MESSAGE};
pub use headers::{identification_headers, AGENT_ID_HEADER, CLIENT_TYPE_HEADER};
pub use path::encode_path;

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{ApiConfig, KnowhubConfig};
use crate::debug::{DebugRecorder, DebugStore, HttpMethod};

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    /// Overrides the client-wide timeout for this call
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Backend API client.
///
/// Cheap to clone; clones share the connection pool, cookie jar and debug
/// recorder.
#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
    recorder: Option<DebugRecorder>,
}

impl ApiClient {
    /// Build a client. Passing `None` for `recorder` disables call recording.
    pub fn new(config: ApiConfig, recorder: Option<DebugRecorder>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .cookie_store(true)
            .default_headers(identification_headers(&config)?)
            .pool_max_idle_per_host(8)
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            config,
            http,
            recorder,
        })
    }

    /// Build a client from full configuration, attaching a fresh debug store
    /// when `debug.enabled` is set.
    pub fn from_config(config: &KnowhubConfig) -> Result<Self, ClientError> {
        let recorder = config
            .debug
            .enabled
            .then(|| DebugRecorder::new(Arc::new(DebugStore::new(config.debug.max_entries))));
        Self::new(config.api.clone(), recorder)
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn recorder(&self) -> Option<&DebugRecorder> {
        self.recorder.as_ref()
    }

    /// Underlying HTTP client, shared with the chat streamer so both use the
    /// same session cookies.
    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        config: Option<RequestConfig>,
    ) -> Result<ApiEnvelope<T>, ClientError> {
        self.request::<T, ()>(HttpMethod::Get, path, None, config)
            .await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
        config: Option<RequestConfig>,
    ) -> Result<ApiEnvelope<T>, ClientError> {
        self.request(HttpMethod::Post, path, body, config).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
        config: Option<RequestConfig>,
    ) -> Result<ApiEnvelope<T>, ClientError> {
        self.request(HttpMethod::Put, path, body, config).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        config: Option<RequestConfig>,
    ) -> Result<ApiEnvelope<T>, ClientError> {
        self.request::<T, ()>(HttpMethod::Delete, path, None, config)
            .await
    }

    /// Issue one call and record its lifecycle.
    pub async fn request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        config: Option<RequestConfig>,
    ) -> Result<ApiEnvelope<T>, ClientError> {
        let config = config.unwrap_or_default();
        let raw_url = self.config.url_for(path);
        let started = Instant::now();

        let request_body = match body.map(serde_json::to_value).transpose() {
            Ok(value) => value,
            Err(e) => {
                let correlation_id = self.begin(method, &raw_url, None);
                let err = ClientError::Encode(e.to_string());
                return Err(self.finish_err(correlation_id, method, started, None, None, err));
            }
        };

        let correlation_id = self.begin(
            method,
            &with_query(&raw_url, &config.query),
            request_body.clone(),
        );

        let url = match build_url(&raw_url, &config.query) {
            Ok(url) => url,
            Err(err) => {
                return Err(self.finish_err(correlation_id, method, started, None, None, err));
            }
        };

        tracing::debug!(
            correlation_id = correlation_id.as_deref().unwrap_or("-"),
            method = %method,
            url = %url,
            "Dispatching API call"
        );

        let mut builder = self
            .http
            .request(method.into(), url)
            .headers(config.headers);
        if let Some(body) = &request_body {
            builder = builder.json(body);
        }
        let timeout = config.timeout.or_else(|| self.config.timeout());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let status = e.status().map(|s| s.as_u16());
                let err = map_transport_error(e, timeout);
                return Err(self.finish_err(correlation_id, method, started, status, None, err));
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                let err = map_transport_error(e, timeout);
                return Err(self.finish_err(
                    correlation_id,
                    method,
                    started,
                    Some(status.as_u16()),
                    None,
                    err,
                ));
            }
        };
        let response_body = parse_body(&text);

        if status.is_client_error() || status.is_server_error() {
            let message = response_body
                .as_ref()
                .and_then(extract_message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                });
            let err = ClientError::Api {
                status: status.as_u16(),
                message,
                body: response_body.clone(),
            };
            return Err(self.finish_err(
                correlation_id,
                method,
                started,
                Some(status.as_u16()),
                response_body,
                err,
            ));
        }

        let envelope = match &response_body {
            None => ApiEnvelope::empty_success(),
            Some(value) => match serde_json::from_value::<ApiEnvelope<T>>(value.clone()) {
                Ok(envelope) => envelope,
                Err(e) => {
                    let err = ClientError::InvalidResponse(format!(
                        "Failed to parse response envelope: {}",
                        e
                    ));
                    return Err(self.finish_err(
                        correlation_id,
                        method,
                        started,
                        Some(status.as_u16()),
                        response_body,
                        err,
                    ));
                }
            },
        };

        if let (Some(recorder), Some(id)) = (&self.recorder, &correlation_id) {
            recorder.complete(id, status.as_u16(), response_body);
        }
        observe(method, "success", started);
        tracing::debug!(
            correlation_id = correlation_id.as_deref().unwrap_or("-"),
            method = %method,
            status = status.as_u16(),
            duration_ms = started.elapsed().as_millis() as u64,
            "API call completed"
        );

        Ok(envelope)
    }

    fn begin(
        &self,
        method: HttpMethod,
        url: &str,
        request_body: Option<serde_json::Value>,
    ) -> Option<String> {
        self.recorder
            .as_ref()
            .map(|recorder| recorder.begin(method, url, request_body))
    }

    /// Record a failed call and hand the error back for propagation.
    fn finish_err(
        &self,
        correlation_id: Option<String>,
        method: HttpMethod,
        started: Instant,
        status: Option<u16>,
        response_body: Option<serde_json::Value>,
        err: ClientError,
    ) -> ClientError {
        if let (Some(recorder), Some(id)) = (&self.recorder, &correlation_id) {
            recorder.fail(id, status, response_body, err.to_string());
        }
        observe(method, "error", started);
        tracing::warn!(
            correlation_id = correlation_id.as_deref().unwrap_or("-"),
            method = %method,
            status = status.unwrap_or(0),
            error = %err,
            "API call failed"
        );
        err
    }
}

fn observe(method: HttpMethod, outcome: &'static str, started: Instant) {
    metrics::counter!(
        "knowhub_http_requests_total",
        "method" => method.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!(
        "knowhub_http_request_duration_seconds",
        "method" => method.as_str()
    )
    .record(started.elapsed().as_secs_f64());
}

fn build_url(raw: &str, query: &[(String, String)]) -> Result<Url, ClientError> {
    let mut url = Url::parse(raw)
        .map_err(|e| ClientError::Configuration(format!("invalid URL '{}': {}", raw, e)))?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

/// URL as it will be sent, for the debug log. Falls back to the raw string
/// when it cannot be parsed.
fn with_query(raw: &str, query: &[(String, String)]) -> String {
    build_url(raw, query)
        .map(String::from)
        .unwrap_or_else(|_| raw.to_string())
}

/// JSON when possible, else the raw text as a JSON string. Empty is `None`.
fn parse_body(text: &str) -> Option<serde_json::Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(
        serde_json::from_str(text)
            .unwrap_or_else(|_| serde_json::Value::String(text.to_string())),
    )
}

fn map_transport_error(e: reqwest::Error, timeout: Option<Duration>) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout(timeout.map(|t| t.as_millis() as u64).unwrap_or(0))
    } else {
        ClientError::Network(e.to_string())
    }
}
