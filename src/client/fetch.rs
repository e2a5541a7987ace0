//! Message sources for the client page.

use crate::api::{HelloResponse, HELLO_ROUTE};
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::header::{HeaderValue, ACCEPT, HOST};
use hyper::{Method, Request, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use std::future::Future;
use thiserror::Error;
use tokio::net::TcpStream;
use tracing::debug;

/// Default backend location.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3003";

/// Errors that can occur while fetching the message.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid backend URL '{0}': only http://host[:port] is supported")]
    InvalidUrl(String),

    #[error("failed to connect to backend: {0}")]
    Connect(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("backend responded with {0}")]
    Status(StatusCode),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Something the page can ask for its message.
pub trait MessageSource: Send + Sync + 'static {
    /// Fetch the message once.
    fn fetch_message(&self) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Fetches the message from the backend's hello endpoint over HTTP/1.1.
#[derive(Debug, Clone)]
pub struct HttpMessageSource {
    uri: Uri,
    /// Origin-form request target, `<base path>/api/hello`.
    target: Uri,
    host: String,
    port: u16,
}

impl HttpMessageSource {
    /// Target `<base_url>/api/hello`.
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let invalid = || FetchError::InvalidUrl(base_url.to_string());

        let url = format!("{}{}", base_url.trim_end_matches('/'), HELLO_ROUTE);
        let uri: Uri = url.parse().map_err(|_| invalid())?;

        if uri.scheme_str() != Some("http") {
            return Err(invalid());
        }
        // IPv6 literals keep their brackets in the URI but not in the socket address
        let host = uri
            .host()
            .ok_or_else(invalid)?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        let port = uri.port_u16().unwrap_or(80);
        let target = uri
            .path_and_query()
            .cloned()
            .map(Uri::from)
            .ok_or_else(invalid)?;

        Ok(Self {
            uri,
            target,
            host,
            port,
        })
    }

    /// Full URL of the hello endpoint.
    pub fn url(&self) -> &Uri {
        &self.uri
    }

    async fn fetch(&self) -> Result<HelloResponse, FetchError> {
        let stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        let io = TokioIo::new(stream);

        let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!(error = %e, "backend connection error");
            }
        });

        let authority = self
            .uri
            .authority()
            .map(|a| a.as_str())
            .unwrap_or(self.host.as_str());
        let host = HeaderValue::from_str(authority)
            .map_err(|_| FetchError::InvalidUrl(self.uri.to_string()))?;

        let mut req = Request::new(Empty::<Bytes>::new());
        *req.method_mut() = Method::GET;
        *req.uri_mut() = self.target.clone();
        req.headers_mut().insert(HOST, host);
        req.headers_mut()
            .insert(ACCEPT, HeaderValue::from_static("application/json"));

        let response = sender.send_request(req).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.into_body().collect().await?.to_bytes();
        Ok(serde_json::from_slice(&body)?)
    }
}

impl MessageSource for HttpMessageSource {
    async fn fetch_message(&self) -> Result<String, FetchError> {
        debug!(url = %self.uri, "fetching message");
        Ok(self.fetch().await?.message)
    }
}
