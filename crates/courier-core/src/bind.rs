//! Request binding.
//!
//! [`bind`] deserializes a request into a typed value, choosing the source by
//! method and content type:
//!
//! | Request | Source |
//! |---|---|
//! | `GET`/`HEAD`, or empty body | query string |
//! | `application/json`, `*/*+json`, or no content type | JSON body |
//! | `application/x-www-form-urlencoded` | query string and body |
//!
//! Anything else is rejected with [`BindError::UnsupportedMediaType`].

use http::{header, HeaderMap, Method};
use serde::de::DeserializeOwned;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Errors that occur while binding a request.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// The JSON body is malformed or does not match the target type.
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// The query string or form body does not match the target type.
    #[error("invalid form data: {0}")]
    Form(#[from] serde_urlencoded::de::Error),

    /// The request's media type cannot be bound.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
}

/// Binds a request into `T`.
///
/// # Errors
///
/// Returns a [`BindError`] when the payload is malformed, does not match `T`,
/// or has a media type that cannot be bound.
pub fn bind<T: DeserializeOwned>(
    method: &Method,
    headers: &HeaderMap,
    query: Option<&str>,
    body: &[u8],
) -> Result<T, BindError> {
    let query = query.unwrap_or_default();

    if *method == Method::GET || *method == Method::HEAD || body.is_empty() {
        return Ok(serde_urlencoded::from_str(query)?);
    }

    match media_type(headers).as_deref() {
        None | Some(JSON_CONTENT_TYPE) => Ok(serde_json::from_slice(body)?),
        Some(media) if media.ends_with("+json") => Ok(serde_json::from_slice(body)?),
        Some(FORM_CONTENT_TYPE) => {
            if query.is_empty() {
                return Ok(serde_urlencoded::from_bytes(body)?);
            }
            let mut merged = Vec::with_capacity(query.len() + 1 + body.len());
            merged.extend_from_slice(query.as_bytes());
            merged.push(b'&');
            merged.extend_from_slice(body);
            Ok(serde_urlencoded::from_bytes(&merged)?)
        }
        Some(other) => Err(BindError::UnsupportedMediaType(other.to_string())),
    }
}

/// Returns the lowercased media type without parameters.
fn media_type(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
    let media = value.split(';').next().unwrap_or_default().trim();
    if media.is_empty() {
        None
    } else {
        Some(media.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Search {
        q: String,
        #[serde(default)]
        page: u32,
    }

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn test_get_binds_query() {
        let search: Search =
            bind(&Method::GET, &HeaderMap::new(), Some("q=rust&page=2"), b"").unwrap();
        assert_eq!(search, Search { q: "rust".into(), page: 2 });
    }

    #[test]
    fn test_json_body() {
        let search: Search = bind(
            &Method::POST,
            &headers("application/json; charset=utf-8"),
            None,
            br#"{"q":"tokio"}"#,
        )
        .unwrap();
        assert_eq!(search.q, "tokio");
    }

    #[test]
    fn test_vendor_json_and_missing_content_type() {
        let search: Search = bind(
            &Method::PUT,
            &headers("application/vnd.api+json"),
            None,
            br#"{"q":"a"}"#,
        )
        .unwrap();
        assert_eq!(search.q, "a");

        let search: Search =
            bind(&Method::POST, &HeaderMap::new(), None, br#"{"q":"b"}"#).unwrap();
        assert_eq!(search.q, "b");
    }

    #[test]
    fn test_form_merges_query_and_body() {
        let search: Search = bind(
            &Method::POST,
            &headers("application/x-www-form-urlencoded"),
            Some("page=7"),
            b"q=hyper",
        )
        .unwrap();
        assert_eq!(search, Search { q: "hyper".into(), page: 7 });
    }

    #[test]
    fn test_empty_body_falls_back_to_query() {
        let search: Search =
            bind(&Method::POST, &headers("application/json"), Some("q=x"), b"").unwrap();
        assert_eq!(search.q, "x");
    }

    #[test]
    fn test_malformed_json() {
        let err = bind::<Search>(&Method::POST, &headers("application/json"), None, b"{")
            .unwrap_err();
        assert!(matches!(err, BindError::Json(_)));
    }

    #[test]
    fn test_type_mismatch() {
        let err = bind::<Search>(
            &Method::POST,
            &headers("application/json"),
            None,
            br#"{"q":1}"#,
        )
        .unwrap_err();
        assert!(matches!(err, BindError::Json(_)));

        let err = bind::<Search>(&Method::GET, &HeaderMap::new(), Some("q=a&page=x"), b"")
            .unwrap_err();
        assert!(matches!(err, BindError::Form(_)));
    }

    #[test]
    fn test_unsupported_media_type() {
        let err = bind::<Search>(&Method::POST, &headers("text/plain"), None, b"q")
            .unwrap_err();
        assert!(matches!(err, BindError::UnsupportedMediaType(ref m) if m == "text/plain"));
    }
}
