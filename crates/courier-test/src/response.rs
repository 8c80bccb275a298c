//! Test response wrapper.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;

use courier_core::response::Message;
use courier_core::{ResponseBody, REQUEST_ID_HEADER};

use crate::error::TestError;

/// A buffered response with assertion helpers.
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Buffers an `http::Response`.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::BodyRead`] if the body fails.
    pub async fn from_http<B>(response: http::Response<B>) -> Result<Self, TestError>
    where
        B: http_body::Body,
        B::Error: std::fmt::Display,
    {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TestError::BodyRead(e.to_string()))?
            .to_bytes();

        Ok(Self {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    /// Creates a response from raw parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns the status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header as a string.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the default request-id header.
    pub fn request_id(&self) -> Option<&str> {
        self.header_str(REQUEST_ID_HEADER)
    }

    /// Returns the raw body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as text.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::BodyRead`] for non-UTF-8 bodies.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("invalid UTF-8: {e}")))
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::Json`] if decoding fails.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Decodes the body as a `{code, data}` envelope.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::Json`] if decoding fails.
    pub fn envelope<T: DeserializeOwned>(&self) -> Result<ResponseBody<T>, TestError> {
        self.json()
    }

    /// Decodes the body as an error envelope.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::Json`] if decoding fails.
    pub fn error_envelope(&self) -> Result<ResponseBody<Message>, TestError> {
        self.json()
    }

    /// Asserts the status.
    ///
    /// # Panics
    ///
    /// Panics on mismatch.
    #[track_caller]
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "expected status {expected}, got {}; body: {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts a header value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    #[track_caller]
    pub fn assert_header(&self, name: &str, expected: &str) -> &Self {
        assert_eq!(
            self.header_str(name),
            Some(expected),
            "header '{name}' mismatch"
        );
        self
    }

    /// Asserts the envelope code and error message.
    ///
    /// # Panics
    ///
    /// Panics if the body is not an error envelope or either field differs.
    #[track_caller]
    pub fn assert_error(&self, code: &str, msg: &str) -> &Self {
        let envelope = match self.error_envelope() {
            Ok(envelope) => envelope,
            Err(e) => panic!(
                "not an error envelope ({e}): {}",
                String::from_utf8_lossy(&self.body)
            ),
        };
        assert_eq!(envelope.code, code, "envelope code mismatch");
        assert_eq!(
            envelope.data.map(|m| m.msg).as_deref(),
            Some(msg),
            "envelope message mismatch"
        );
        self
    }

    /// Asserts that `needle` does not occur anywhere in the body.
    ///
    /// # Panics
    ///
    /// Panics if it does.
    #[track_caller]
    pub fn assert_body_lacks(&self, needle: &str) -> &Self {
        let body = String::from_utf8_lossy(&self.body);
        assert!(!body.contains(needle), "body leaks '{needle}': {body}");
        self
    }
}
