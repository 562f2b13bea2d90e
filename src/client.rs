use crate::decode::{DecodeTarget, Json, extract_meta};
use crate::error::{QontoError, check_response};
use crate::http::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::services::{Attachments, Labels, Memberships, Organizations, Transactions};
use bytes::Bytes;
use log::{debug, info};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, StatusCode, Url};
use serde::de::{DeserializeOwned, Error as DeError};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://thirdparty.qonto.com/v2/";
pub const LIBRARY_USER_AGENT: &str = "qontoapi/v2";
const MEDIA_TYPE: &str = "application/json";

/// Hook invoked with the request and raw response after every completed
/// round trip, before the status is classified.
pub type RequestCompletionCallback = dyn Fn(&HttpRequest, &HttpResponse) + Send + Sync;

/// Pagination block returned by list endpoints. Fields the API leaves out or
/// sets to `null` are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMeta {
    #[serde(default, deserialize_with = "zero_if_null", skip_serializing_if = "is_zero")]
    pub current_page: u64,
    #[serde(default, deserialize_with = "zero_if_null", skip_serializing_if = "is_zero")]
    pub next_page: u64,
    #[serde(default, deserialize_with = "zero_if_null", skip_serializing_if = "is_zero")]
    pub prev_page: u64,
    #[serde(default, deserialize_with = "zero_if_null", skip_serializing_if = "is_zero")]
    pub total_pages: u64,
    #[serde(default, deserialize_with = "zero_if_null", skip_serializing_if = "is_zero")]
    pub total_count: u64,
    #[serde(default, deserialize_with = "zero_if_null", skip_serializing_if = "is_zero")]
    pub per_page: u64,
}

impl ResponseMeta {
    pub fn has_next_page(&self) -> bool {
        self.next_page != 0
    }
}

fn zero_if_null<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<i64> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(0),
        Some(n) => u64::try_from(n).map_err(|_| D::Error::custom("negative pagination value")),
    }
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// Response envelope: the raw response plus pagination metadata for list
/// endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    method: Method,
    url: Url,
    raw: HttpResponse,
    pub meta: Option<ResponseMeta>,
}

impl Response {
    pub(crate) fn new(method: Method, url: Url, raw: HttpResponse) -> Self {
        Self {
            method,
            url,
            raw,
            meta: None,
        }
    }

    /// Method of the request that produced this response.
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.raw.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.raw.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.raw.body
    }

    pub fn raw(&self) -> &HttpResponse {
        &self.raw
    }
}

/// Qonto API client.
///
/// Holds no per-request state, so a single instance can serve concurrent
/// callers. Configure it with the `with_*` methods before first use.
#[derive(Clone)]
pub struct Client<T = ReqwestTransport> {
    transport: T,
    base_url: Url,
    user_agent: HeaderValue,
    timeout: Option<Duration>,
    on_request_completed: Option<Arc<RequestCompletionCallback>>,
}

impl<T: fmt::Debug> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("transport", &self.transport)
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("on_request_completed", &self.on_request_completed.is_some())
            .finish()
    }
}

impl Client<ReqwestTransport> {
    /// Create a client using the default `reqwest` transport.
    ///
    /// The transport adds no credentials; wrap it in
    /// [`AuthTransport`](crate::AuthTransport) and use [`Client::with_transport`]
    /// to talk to the live API.
    pub fn new() -> Result<Self, QontoError> {
        Self::with_transport(ReqwestTransport::new()?)
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T) -> Result<Self, QontoError> {
        let base_url = parse_base_url(DEFAULT_BASE_URL)?;
        info!("Initialized Qonto API client with default base URL");
        Ok(Self {
            transport,
            base_url,
            user_agent: HeaderValue::from_static(LIBRARY_USER_AGENT),
            timeout: None,
            on_request_completed: None,
        })
    }

    /// Override the base URL (useful for tests or proxies). A trailing slash
    /// is appended when missing so relative paths resolve underneath it.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, QontoError> {
        self.base_url = parse_base_url(base_url)?;
        info!("Updated Qonto API base URL to {}", self.base_url);
        Ok(self)
    }

    /// Prefix the library user agent with a custom one, space separated.
    pub fn with_user_agent(mut self, user_agent: &str) -> Result<Self, QontoError> {
        let combined = format!("{} {}", user_agent, LIBRARY_USER_AGENT);
        self.user_agent = HeaderValue::from_str(&combined)
            .map_err(|_| QontoError::InvalidParameter("user agent must be visible ASCII"))?;
        Ok(self)
    }

    /// Deadline for each transport round trip.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn on_request_completed<F>(mut self, callback: F) -> Self
    where
        F: Fn(&HttpRequest, &HttpResponse) + Send + Sync + 'static,
    {
        self.on_request_completed = Some(Arc::new(callback));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.to_str().unwrap_or(LIBRARY_USER_AGENT)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn organizations(&self) -> Organizations<'_, T> {
        Organizations::new(self)
    }

    pub fn transactions(&self) -> Transactions<'_, T> {
        Transactions::new(self)
    }

    pub fn memberships(&self) -> Memberships<'_, T> {
        Memberships::new(self)
    }

    pub fn labels(&self) -> Labels<'_, T> {
        Labels::new(self)
    }

    pub fn attachments(&self) -> Attachments<'_, T> {
        Attachments::new(self)
    }

    /// Build a request for `path`, resolved against the base URL.
    ///
    /// A body, when given, is sent as JSON. Read endpoints of the Qonto API
    /// expect their filters this way too.
    pub fn new_request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<HttpRequest, QontoError>
    where
        B: Serialize + ?Sized,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|source| QontoError::InvalidUrl {
                input: path.to_owned(),
                source,
            })?;

        let body = body
            .map(|value| serde_json::to_vec(value).map(Bytes::from))
            .transpose()
            .map_err(QontoError::Serialization)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert(USER_AGENT, self.user_agent.clone());

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Send a request and decode a successful body into `target`.
    ///
    /// Without a target the body is left unread in the returned envelope.
    /// Pagination metadata is attached whenever a 2xx body carries a `meta`
    /// key. Statuses outside 2xx become [`QontoError::Api`].
    pub async fn send(
        &self,
        request: HttpRequest,
        target: Option<&mut (dyn DecodeTarget + Send)>,
    ) -> Result<Response, QontoError> {
        let raw = self.execute(&request).await?;
        let mut response = check_response(Response::new(request.method, request.url, raw))?;
        response.meta = extract_meta(response.body());

        let Some(target) = target else {
            return Ok(response);
        };
        if let Some(sink) = target.as_sink() {
            if let Err(source) = sink.write_all(response.body()) {
                return Err(QontoError::Sink {
                    response: Box::new(response),
                    source,
                });
            }
            return Ok(response);
        }
        if let Err(source) = target.decode_json(response.body()) {
            return Err(QontoError::Decode {
                response: Box::new(response),
                source,
            });
        }
        Ok(response)
    }

    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, QontoError> {
        debug!("{} request to {}", request.method, request.url);
        let raw = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.transport.execute(request))
                .await
                .map_err(|_| QontoError::Timeout(limit))??,
            None => self.transport.execute(request).await?,
        };
        debug!("Received status {}", raw.status);

        if let Some(callback) = &self.on_request_completed {
            callback(request, &raw);
        }
        Ok(raw)
    }

    /// Send a request and decode the JSON body into `R`.
    pub(crate) async fn fetch<R, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(R, Response), QontoError>
    where
        R: DeserializeOwned + Send,
        B: Serialize + ?Sized,
    {
        let request = self.new_request(method, path, body)?;
        let mut root = Json::<R>::new();
        let target: &mut (dyn DecodeTarget + Send) = &mut root;
        let response = self.send(request, Some(target)).await?;
        match root.into_inner() {
            Some(value) => Ok((value, response)),
            None => Err(QontoError::Decode {
                response: Box::new(response),
                source: serde_json::Error::custom("response body was not decoded"),
            }),
        }
    }
}

fn parse_base_url(input: &str) -> Result<Url, QontoError> {
    let mut url = Url::parse(input).map_err(|source| QontoError::InvalidUrl {
        input: input.to_owned(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(QontoError::InvalidParameter(
            "base url must be a hierarchical http(s) url",
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replies with a fixed status and body.
    #[derive(Debug)]
    struct Canned {
        status: u16,
        body: &'static str,
        calls: Mutex<usize>,
    }

    impl Canned {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                calls: Mutex::new(0),
            }
        }
    }

    impl Transport for Canned {
        async fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, QontoError> {
            *self.calls.lock().unwrap() += 1;
            Ok(HttpResponse {
                status: StatusCode::from_u16(self.status).unwrap(),
                headers: HeaderMap::new(),
                body: Bytes::from_static(self.body.as_bytes()),
            })
        }
    }

    fn client() -> Client<Canned> {
        Client::with_transport(Canned::new(200, "{}")).unwrap()
    }

    #[test]
    fn defaults() {
        let c = client();
        assert_eq!(c.base_url().as_str(), DEFAULT_BASE_URL);
        assert_eq!(c.user_agent(), LIBRARY_USER_AGENT);
    }

    #[test]
    fn new_request_sets_standard_headers() {
        let req = client()
            .new_request(Method::GET, "organizations/9134", None::<&()>)
            .unwrap();
        assert_eq!(
            req.url.as_str(),
            "https://thirdparty.qonto.com/v2/organizations/9134"
        );
        assert_eq!(req.headers[CONTENT_TYPE], MEDIA_TYPE);
        assert_eq!(req.headers[ACCEPT], MEDIA_TYPE);
        assert_eq!(req.headers[USER_AGENT], LIBRARY_USER_AGENT);
        assert!(req.body.is_none());
    }

    #[test]
    fn new_request_resolves_like_url_references() {
        let c = client();
        let cases = [
            ("labels", "https://thirdparty.qonto.com/v2/labels"),
            ("transactions/abc?x=1", "https://thirdparty.qonto.com/v2/transactions/abc?x=1"),
            ("/foo", "https://thirdparty.qonto.com/foo"),
            ("../v1/labels", "https://thirdparty.qonto.com/v1/labels"),
            ("https://example.com/other", "https://example.com/other"),
        ];
        for (path, want) in cases {
            let req = c.new_request(Method::GET, path, None::<&()>).unwrap();
            assert_eq!(req.url.as_str(), want, "resolving {path}");
            assert_eq!(req.url, c.base_url().join(path).unwrap());
        }
    }

    #[test]
    fn new_request_encodes_body() {
        #[derive(Serialize)]
        struct Page {
            current_page: u32,
            per_page: u32,
        }

        let req = client()
            .new_request(
                Method::GET,
                "labels",
                Some(&Page {
                    current_page: 1,
                    per_page: 10,
                }),
            )
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(req.body.as_ref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"current_page": 1, "per_page": 10}));
    }

    #[test]
    fn new_request_bad_url() {
        let err = client()
            .new_request(Method::GET, "http://[::1", None::<&()>)
            .unwrap_err();
        assert!(matches!(err, QontoError::InvalidUrl { .. }), "{err:?}");
    }

    #[test]
    fn new_request_unserializable_body() {
        let mut map = std::collections::HashMap::new();
        map.insert((1, 2), "tuple keys are not JSON object keys");
        let err = client()
            .new_request(Method::GET, "labels", Some(&map))
            .unwrap_err();
        assert!(matches!(err, QontoError::Serialization(_)), "{err:?}");
    }

    #[test]
    fn custom_user_agent_is_prefixed() {
        let c = client().with_user_agent("testing/0.0.1").unwrap();
        let req = c.new_request(Method::GET, "/foo", None::<&()>).unwrap();
        assert_eq!(req.headers[USER_AGENT], "testing/0.0.1 qontoapi/v2");
    }

    #[test]
    fn custom_base_url_gets_trailing_slash() {
        let c = client().with_base_url("http://localhost/foo").unwrap();
        assert_eq!(c.base_url().as_str(), "http://localhost/foo/");
        let req = c.new_request(Method::GET, "labels", None::<&()>).unwrap();
        assert_eq!(req.url.as_str(), "http://localhost/foo/labels");
    }

    #[test]
    fn custom_base_url_rejects_garbage() {
        let err = client().with_base_url(":").unwrap_err();
        assert!(matches!(err, QontoError::InvalidUrl { .. }));
        let err = client().with_base_url("mailto:ops@example.com").unwrap_err();
        assert!(matches!(err, QontoError::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn send_decodes_json() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Foo {
            #[serde(rename = "A")]
            a: String,
        }

        let c = Client::with_transport(Canned::new(200, r#"{"A":"a"}"#)).unwrap();
        let req = c.new_request(Method::GET, "/", None::<&()>).unwrap();
        let mut target = Json::<Foo>::new();
        let resp = c.send(req, Some(&mut target)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.meta, None);
        assert_eq!(target.into_inner(), Some(Foo { a: "a".into() }));
    }

    #[tokio::test]
    async fn send_copies_raw_body_into_sink() {
        let c = Client::with_transport(Canned::new(200, "not json at all")).unwrap();
        let req = c.new_request(Method::GET, "attachments/1", None::<&()>).unwrap();
        let mut buf = Vec::new();
        c.send(req, Some(&mut buf)).await.unwrap();
        assert_eq!(buf, b"not json at all");
    }

    #[tokio::test]
    async fn send_without_target_keeps_body() {
        let c = Client::with_transport(Canned::new(200, "[]")).unwrap();
        let req = c.new_request(Method::GET, "labels", None::<&()>).unwrap();
        let resp = c.send(req, None).await.unwrap();
        assert_eq!(resp.body().as_ref(), b"[]");
    }

    #[tokio::test]
    async fn send_reports_decode_failure_with_response() {
        let c = Client::with_transport(Canned::new(200, "<html>")).unwrap();
        let req = c.new_request(Method::GET, "labels", None::<&()>).unwrap();
        let mut target = Json::<serde_json::Value>::new();
        let err = c.send(req, Some(&mut target)).await.unwrap_err();
        assert!(matches!(err, QontoError::Decode { .. }), "{err:?}");
        assert_eq!(err.response().unwrap().body().as_ref(), b"<html>");
    }

    #[tokio::test]
    async fn send_classifies_http_error() {
        let c = Client::with_transport(Canned::new(400, "Bad Request")).unwrap();
        let req = c.new_request(Method::GET, "labels", None::<&()>).unwrap();
        let mut target = Json::<serde_json::Value>::new();
        let err = c.send(req, Some(&mut target)).await.unwrap_err();
        match err {
            QontoError::Api(api) => {
                assert_eq!(api.code, 400);
                assert_eq!(api.message, "Bad Request");
            }
            other => panic!("expected api error, got {other:?}"),
        }
        assert!(target.get().is_none());
        assert_eq!(*c.transport().calls.lock().unwrap(), 1);
    }

    #[test]
    fn meta_serializes_without_zero_fields() {
        let meta = ResponseMeta {
            current_page: 1,
            total_count: 2,
            ..Default::default()
        };
        assert!(!meta.has_next_page());
        assert_eq!(
            serde_json::to_value(meta).unwrap(),
            serde_json::json!({"current_page": 1, "total_count": 2})
        );
    }
}
