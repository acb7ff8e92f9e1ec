//! HTTP plumbing: plain-data request/response types and the transport
//! seam.
//!
//! # Design
//! Requests and responses are plain data. The client builds [`HttpRequest`]
//! values and interprets [`HttpResponse`] values without ever touching the
//! network, so every operation can be exercised with canned responses. The
//! actual round-trip goes through the [`HttpTransport`] trait, a
//! fetch-style primitive (method, URL, headers, body in; status, headers,
//! body out) with [`ReqwestTransport`] as the default implementation.
//! Tests and embedders substitute their own.

use async_trait::async_trait;

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// An HTTP request described as plain data.
///
/// Built by `StepUpClient::build_*` methods and executed by an
/// [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL, query string included.
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Encoded body; `None` sends no body.
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
///
/// Produced by an [`HttpTransport`], consumed by `StepUpClient::parse_*`
/// methods.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Response body as plain text.
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Deserialize the response body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Query parameters for a request: either a pre-built string or key/value
/// pairs encoded during assembly.
#[derive(Debug, Clone)]
pub enum Query {
    /// Used verbatim; the caller is responsible for any encoding.
    Raw(String),
    /// Values are percent-encoded exactly once during assembly. Keys are
    /// fixed identifiers and taken as-is.
    Pairs(Vec<(String, String)>),
}

impl Query {
    pub fn pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Query::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Assemble the final query string.
    pub fn encode(&self) -> String {
        match self {
            Query::Raw(raw) => raw.clone(),
            Query::Pairs(pairs) => pairs
                .iter()
                .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
                .collect::<Vec<_>>()
                .join("&"),
        }
    }
}

/// Request body. The JSON-vs-text decision is an explicit branch: `Json`
/// is serialized during assembly and tags the request with
/// `Content-Type: application/json`, `Text` passes through unchanged with
/// no injected header.
#[derive(Debug, Clone)]
pub enum Body {
    Text(String),
    Json(serde_json::Value),
}

/// The external collaborator that executes [`HttpRequest`]s.
///
/// Implementations own connection management and TLS; the client owns
/// request composition and response interpretation. Failures map to
/// [`ApiError::Transport`] and are never caught inside operations.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Default transport backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.http.get(&request.url),
            HttpMethod::Post => self.http.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
