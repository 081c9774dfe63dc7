//! Error types for Postmark operations.

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use url::Url;

/// Errors that can occur while talking to the Postmark API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport failure: connection, TLS, redirect loop or timeout.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The operation path could not be resolved against the base URL.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// The request body could not be serialized to JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Options could not be encoded as query parameters.
    #[error("query encoding error: {0}")]
    Query(String),

    /// A token or header value contains characters not allowed in HTTP headers.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// The API answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ErrorResponse),

    /// The API answered 2xx but the payload did not match the expected shape.
    #[error("failed to decode response body: {source}")]
    Decode {
        source: serde_json::Error,
        response: Box<RawResponse>,
    },
}

impl Error {
    /// The raw response associated with this error, if one was received.
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            Error::Api(err) => Some(&*err.response),
            Error::Decode { response, .. } => Some(&**response),
            _ => None,
        }
    }
}

/// An error reported by the Postmark API.
///
/// The code and message are decoded from the response body on a best-effort
/// basis: an empty or malformed body leaves them at `0` and `""`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("API error {error_code} {message:?}")]
pub struct ErrorResponse {
    pub error_code: i64,
    pub message: String,
    pub response: Box<RawResponse>,
}

/// A fully-read HTTP response, kept for diagnostics.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// The body as UTF-8 text, lossily converted.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: u16) -> RawResponse {
        RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            url: Url::parse("https://api.postmarkapp.com/email").unwrap(),
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    #[test]
    fn api_error_renders_code_and_quoted_message() {
        let err = ErrorResponse {
            error_code: 300,
            message: "Invalid email request".to_string(),
            response: Box::new(raw(422)),
        };
        assert_eq!(err.to_string(), r#"API error 300 "Invalid email request""#);
    }

    #[test]
    fn empty_api_error_still_renders() {
        let err = Error::from(ErrorResponse {
            error_code: 0,
            message: String::new(),
            response: Box::new(raw(400)),
        });
        assert_eq!(err.to_string(), r#"API error 0 """#);
        assert_eq!(err.response().map(|r| r.status.as_u16()), Some(400));
    }

    #[test]
    fn build_errors_carry_no_response() {
        let err = Error::Query("bad".to_string());
        assert!(err.response().is_none());
    }
}
