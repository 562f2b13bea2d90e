use crate::client::Response;
use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QontoError {
    #[error("malformed url {input:?}: {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to encode request body: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("api rejected request: {0}")]
    Api(#[from] ApiError),

    #[error("invalid or unexpected response body ({}): {source}", .response.status())]
    Decode {
        response: Box<Response>,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to copy response body to sink: {source}")]
    Sink {
        response: Box<Response>,
        #[source]
        source: std::io::Error,
    },
}

impl QontoError {
    /// Response envelope attached to the failure, when the round trip completed.
    pub fn response(&self) -> Option<&Response> {
        match self {
            QontoError::Api(err) => Some(&err.response),
            QontoError::Decode { response, .. } | QontoError::Sink { response, .. } => {
                Some(response)
            }
            _ => None,
        }
    }

    /// Wrap an arbitrary error raised by a custom [`Transport`](crate::Transport).
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        QontoError::Transport(err.into())
    }
}

/// Error reported by the API for a response outside the 2xx range.
#[derive(Debug, Error)]
pub struct ApiError {
    pub response: Box<Response>,
    pub code: i64,
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} {}",
            self.response.method(),
            self.response.url(),
            self.response.status().as_u16(),
            self.message
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Unprocessable,
    TooManyRequests,
    Server,
    Unexpected(StatusCode),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn kind(&self) -> ApiErrorKind {
        match self.status() {
            StatusCode::BAD_REQUEST => ApiErrorKind::BadRequest,
            StatusCode::UNAUTHORIZED => ApiErrorKind::Unauthorized,
            StatusCode::FORBIDDEN => ApiErrorKind::Forbidden,
            StatusCode::NOT_FOUND => ApiErrorKind::NotFound,
            StatusCode::UNPROCESSABLE_ENTITY => ApiErrorKind::Unprocessable,
            StatusCode::TOO_MANY_REQUESTS => ApiErrorKind::TooManyRequests,
            status if status.is_server_error() => ApiErrorKind::Server,
            status => ApiErrorKind::Unexpected(status),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    code: i64,
    message: String,
}

/// Classify a response. Anything outside 200..=299 becomes an [`ApiError`].
///
/// An empty body yields zero code and empty message. A body that is not the
/// `{code, message}` shape is kept verbatim as the message, with the HTTP
/// status as the code.
pub(crate) fn check_response(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let (code, message) = if response.body().is_empty() {
        (0, String::new())
    } else {
        match serde_json::from_slice::<ErrorBody>(response.body()) {
            Ok(body) => (body.code, body.message),
            Err(_) => (
                i64::from(status.as_u16()),
                String::from_utf8_lossy(response.body()).into_owned(),
            ),
        }
    };

    Err(ApiError {
        response: Box::new(response),
        code,
        message,
    })
}
