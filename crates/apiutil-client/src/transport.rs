//! Transport abstraction
//!
//! The client only needs "perform one HTTP request, return one HTTP response
//! or an error". Anything implementing [`Transport`] can back it: the default
//! [`ReqwestTransport`], a custom client, or a closure in tests:
//!
//! ```rust
//! use apiutil_client::transport::{HttpRequest, HttpResponse, Transport};
//!
//! let transport = |_req: HttpRequest| -> apiutil_client::Result<HttpResponse> {
//!     Ok(http::Response::builder().status(200).body(Vec::new())?)
//! };
//! let response = transport.execute(http::Request::new(Vec::new())).unwrap();
//! assert_eq!(response.status(), 200);
//! ```

use crate::error::Result;
use std::time::Duration;

pub type HttpRequest = http::Request<Vec<u8>>;
pub type HttpResponse = http::Response<Vec<u8>>;

/// Performs a single blocking HTTP round trip.
///
/// Timeouts and cancellation are the implementation's responsibility.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse> + Send + Sync,
{
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self(request)
    }
}

/// Default transport backed by `reqwest::blocking`
///
/// The URI is handed to reqwest as a URL, which removes `.` and `..` path
/// segments before sending.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn from_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let (parts, body) = request.into_parts();

        let response = self
            .client
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers)
            .body(body)
            .send()?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes()?;

        let mut out = http::Response::builder()
            .status(status.as_u16())
            .body(bytes.to_vec())?;
        *out.headers_mut() = headers;
        Ok(out)
    }
}
