use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, ClientBuilder, Method, Response};
use serde::Serialize;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("Failed to encode request body: {0}")]
    BodyEncode(#[source] serde_json::Error),
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

impl HttpClientError {
    /// HTTP status attached to the underlying reqwest error, if any.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            HttpClientError::Request(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpClientError::Request(e) if e.is_timeout())
    }
}

/// Thin wrapper over [`reqwest::Client`] that resolves request paths against a base url.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: Url,
    client: Client,
}

impl HttpClient {
    pub fn builder(base_url: &str) -> HttpClientBuilder {
        HttpClientBuilder {
            base_url: base_url.to_string(),
            client_builder: Client::builder(),
        }
    }

    pub fn request(&self) -> RequestBuilder<'_> {
        RequestBuilder::new(self)
    }

    fn build_url(&self, segments: &[String]) -> Result<Url, HttpClientError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| HttpClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "cannot be a base".to_string(),
            })?;
            // each segment is percent-encoded, so ids containing '/' stay a single segment
            path.pop_if_empty().extend(segments);
        }

        Ok(url)
    }

    async fn send_request(&self, builder: RequestBuilder<'_>) -> Result<Response, HttpClientError> {
        let url = self.build_url(&builder.segments)?;
        tracing::trace!(method = %builder.method, %url, "Sending HTTP request");

        let mut request =
            self.client.request(builder.method, url).header(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(body) = builder.json {
            request = request.json(&body);
        }

        Ok(request.send().await?)
    }
}

pub struct HttpClientBuilder {
    base_url: String,
    client_builder: ClientBuilder,
}

impl HttpClientBuilder {
    /// Upper bound on the whole request, connection through body.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.client_builder = self.client_builder.timeout(timeout);
        self
    }

    pub fn build(self) -> Result<HttpClient, HttpClientError> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|e| HttpClientError::InvalidBaseUrl { url: self.base_url.clone(), reason: e.to_string() })?;
        if base_url.cannot_be_a_base() {
            return Err(HttpClientError::InvalidBaseUrl { url: self.base_url, reason: "cannot be a base".to_string() });
        }

        Ok(HttpClient { base_url, client: self.client_builder.build()? })
    }
}

pub struct RequestBuilder<'a> {
    client: &'a HttpClient,
    method: Method,
    segments: Vec<String>,
    json: Option<serde_json::Value>,
}

impl<'a> RequestBuilder<'a> {
    fn new(client: &'a HttpClient) -> Self {
        Self { client, method: Method::GET, segments: Vec::new(), json: None }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Appends `path` to the request path. Slashes inside `path` separate segments.
    pub fn path(mut self, path: &str) -> Self {
        self.segments.extend(path.split('/').filter(|s| !s.is_empty()).map(str::to_string));
        self
    }

    /// Appends a single segment verbatim; it is percent-encoded when the url is built.
    pub fn path_segment(mut self, segment: &str) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    /// Serializes `body` as the JSON payload and sets `Content-Type: application/json`.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, HttpClientError> {
        self.json = Some(serde_json::to_value(body).map_err(HttpClientError::BodyEncode)?);
        Ok(self)
    }

    pub async fn send(self) -> Result<Response, HttpClientError> {
        self.client.send_request(self).await
    }
}
