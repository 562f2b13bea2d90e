//! Transport layer: plain request/response values and the [`Transport`] seam.
//!
//! The client builds [`HttpRequest`] values and hands them to a transport,
//! which performs the round trip and returns a fully buffered
//! [`HttpResponse`]. Swap the transport to add credentials, proxies or a
//! fake for tests.

use crate::error::QontoError;
use bytes::Bytes;
use log::debug;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client as HttpClient, Method, StatusCode, Url};
use std::fmt;
use std::future::Future;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Outgoing request, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// Raw response as returned by the transport, body already read.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Executes one HTTP round trip.
///
/// The request is borrowed so the client can hand the very same value to
/// its completion callback. Dropping the returned future must abort the call.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: &HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, QontoError>> + Send;
}

/// Default transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: HttpClient,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, QontoError> {
        let http = HttpClient::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self { http })
    }

    /// Use an already configured `reqwest` client.
    pub fn from_client(http: HttpClient) -> Self {
        Self { http }
    }
}

impl Transport for ReqwestTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, QontoError> {
        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        debug!("Read {} byte body with status {}", body.len(), status);

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Sets the Qonto `Authorization: <login>:<secret-key>` header on every
/// request before delegating to the inner transport.
#[derive(Clone)]
pub struct AuthTransport<T> {
    inner: T,
    login: String,
    secret_key: String,
}

impl<T> AuthTransport<T> {
    pub fn new(inner: T, login: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            inner,
            login: login.into(),
            secret_key: secret_key.into(),
        }
    }

    fn credentials(&self) -> Result<HeaderValue, QontoError> {
        let mut value = HeaderValue::from_str(&format!("{}:{}", self.login, self.secret_key))
            .map_err(|_| {
                QontoError::InvalidParameter("credentials must be visible ASCII characters")
            })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for AuthTransport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthTransport")
            .field("inner", &self.inner)
            .field("login", &self.login)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl<T: Transport> Transport for AuthTransport<T> {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, QontoError> {
        let mut request = request.clone();
        request.headers.insert(AUTHORIZATION, self.credentials()?);
        self.inner.execute(&request).await
    }
}
