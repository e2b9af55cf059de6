//! Network fetch abstraction
//!
//! [`Fetcher`] is the only way the pipeline reaches the network. Fetches are
//! attempted once; there are no retries.

use crate::error::NetworkError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE, ETAG};
use reqwest::{Client, Url};

/// What the pipeline reads from a response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResponse {
    /// `Content-Type` header
    pub content_type: Option<String>,
    /// `ETag` header
    pub etag: Option<String>,
    /// Response body
    pub body: String,
}

impl FetchResponse {
    /// Response with a content type and body
    #[must_use]
    pub fn new(content_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            etag: None,
            body: body.into(),
        }
    }

    /// With validation tag
    #[inline]
    #[must_use]
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }
}

/// Asynchronous fetch of a script or config location
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url`
    async fn fetch(&self, url: &str) -> Result<FetchResponse, NetworkError>;
}

/// HTTP fetcher backed by `reqwest`
///
/// Relative locations (`/app.ts`) resolve against the page base URL.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base: Option<Url>,
}

impl HttpFetcher {
    /// Create fetcher with a default client
    ///
    /// # Errors
    /// Returns `NetworkError::Request` if the client cannot be built
    pub fn new() -> Result<Self, NetworkError> {
        let client = Client::builder()
            .build()
            .map_err(|e| NetworkError::request("<client>", e))?;
        Ok(Self::with_client(client))
    }

    /// Create fetcher around an existing client
    #[inline]
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client, base: None }
    }

    /// With page base URL
    ///
    /// # Errors
    /// Returns `NetworkError::InvalidUrl` if `base` is not absolute
    pub fn with_base(mut self, base: &str) -> Result<Self, NetworkError> {
        self.base = Some(parse_url(base)?);
        Ok(self)
    }

    /// Resolve a location against the base URL
    ///
    /// # Errors
    /// Returns `NetworkError::InvalidUrl` if the location cannot be resolved
    pub fn resolve(&self, location: &str) -> Result<Url, NetworkError> {
        match &self.base {
            Some(base) => base.join(location).map_err(|e| NetworkError::InvalidUrl {
                url: location.to_string(),
                reason: e.to_string(),
            }),
            None => parse_url(location),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, NetworkError> {
        let resolved = self.resolve(url)?;
        tracing::debug!("Fetching {}", resolved);

        let response = self
            .client
            .get(resolved)
            .send()
            .await
            .map_err(|e| NetworkError::request(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let headers = response.headers();
        let content_type = header_value(headers, CONTENT_TYPE.as_str());
        let etag = header_value(headers, ETAG.as_str());
        let body = response
            .text()
            .await
            .map_err(|e| NetworkError::request(url, e))?;

        Ok(FetchResponse {
            content_type,
            etag,
            body,
        })
    }
}

fn parse_url(url: &str) -> Result<Url, NetworkError> {
    Url::parse(url).map_err(|e| NetworkError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
