//! Request identifiers.
//!
//! Every request carries exactly one id, taken from the incoming `Request-Id`
//! header when present so that ids survive across service hops, or generated
//! once when absent. A generated id is written back into the request's own
//! header map so that anything reading the header later sees the same value.
//!
//! Generated ids are UUID v7: time-ordered, which keeps log lines sortable.

use http::header::{HeaderMap, HeaderName, HeaderValue};
use std::fmt;
use uuid::Uuid;

/// The default header used to propagate request ids.
pub const REQUEST_ID_HEADER: &str = "request-id";

/// Returns the default request-id header name.
pub fn default_header() -> HeaderName {
    HeaderName::from_static(REQUEST_ID_HEADER)
}

/// Identifies one inbound request.
///
/// Incoming ids are accepted verbatim (they need not be UUIDs), so the id is
/// kept as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Generates a fresh UUID v7 id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reads the request id from `headers`, generating and inserting one if the
/// header is absent, empty or not printable ASCII.
///
/// Calling this again on the same header map returns the same id.
pub fn resolve_request_id(headers: &mut HeaderMap, header: &HeaderName) -> RequestId {
    if let Some(id) = headers
        .get(header)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
    {
        return RequestId::from(id);
    }

    let id = RequestId::generate();
    match HeaderValue::from_str(id.as_str()) {
        Ok(value) => {
            headers.insert(header.clone(), value);
        }
        Err(e) => tracing::warn!(error = %e, "generated request id is not a valid header value"),
    }
    id
}
