use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap};
use reqwest::{Method, Url};

use crate::context::Context;
use crate::error::TransportError;

/// Fully formed request to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Unencoded path segments, percent-encoding is left to the transport
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
}

impl Request {
    pub fn new(method: Method, segments: Vec<String>) -> Self {
        Self {
            method,
            segments,
            query: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Request path, e.g. `/containers/container_id`
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// First value of the query parameter `key`
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Response as received from the engine, before status handling
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
    }
}

/// Executes requests against the engine
///
/// Implementations must stop waiting once `ctx` is cancelled or its deadline
/// passes, and report that as [`TransportError::Cancelled`] or
/// [`TransportError::DeadlineExceeded`].
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, ctx: &Context, request: Request) -> Result<Response, TransportError>;
}

/// HTTP transport to the engine's TCP endpoint
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Creates a transport for `base_url`, e.g. `http://127.0.0.1:2375`
    ///
    /// `timeout` bounds every single request in addition to the context deadline.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{base_url}: {e}")))?;

        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base_url,
            timeout,
        })
    }

    /// Resolves `request` against the base URL
    ///
    /// `.` and `..` segments are rejected, URL normalization would drop them
    /// and the request would reach a different endpoint.
    fn url(&self, request: &Request) -> Result<Url, TransportError> {
        if let Some(segment) = request
            .segments
            .iter()
            .find(|segment| matches!(segment.as_str(), "." | ".."))
        {
            return Err(TransportError::InvalidUrl(format!(
                "dot segment '{segment}' in path {}",
                request.path()
            )));
        }

        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|()| TransportError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(&request.segments);

        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }

        Ok(url)
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, ctx: &Context, request: Request) -> Result<Response, TransportError> {
        let url = self.url(&request)?;

        log::debug!("{} {url}", request.method);

        let mut builder = self
            .http
            .request(request.method, url)
            .header(ACCEPT, "application/json");

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        ctx.run(async {
            let response = builder.send().await?;

            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = response.bytes().await?.to_vec();

            Ok(Response {
                status,
                headers,
                body,
            })
        })
        .await
    }
}
