use async_trait::async_trait;
use axum::body::Body as AxumBody;
use hyper::{Request, Response};
use thiserror::Error;

/// Custom error type for upstream HTTP client operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpClientError {
    /// Error when the connection to the upstream target fails
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error when the outgoing request cannot be built or dispatched
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type alias for upstream HTTP client operations
pub type HttpClientResult<T> = Result<T, HttpClientError>;

/// HttpClient defines the port (interface) used to forward proxied requests
/// to their upstream target.
///
/// Failures are surfaced to the caller unmodified; no retries happen behind
/// this port. Dropping the returned future cancels the in-flight upstream
/// call, which is how client-disconnect cancellation propagates.
#[async_trait]
pub trait HttpClient: Send + Sync + 'static {
    /// Send an HTTP request to its (already rewritten) upstream target
    ///
    /// # Arguments
    /// * `req` - The request to forward; its URI must be absolute
    ///
    /// # Returns
    /// A future that resolves to the upstream response or an error
    async fn send_request(&self, req: Request<AxumBody>) -> HttpClientResult<Response<AxumBody>>;
}
