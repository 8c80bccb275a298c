//! Client-facing response envelopes.
//!
//! Every response body has the shape `{"code": string, "data": ...}`.
//! `code = "ok"` signals success; any other value is an error code and the
//! data is then always `{"msg": string}`.
//!
//! Error envelopes are produced by [`error_occurred`], which classifies an
//! error by its tag chain (see [`crate::tag`]).

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;

use crate::tag::originating_tagged;

/// Success.
pub const CODE_OK: &str = "ok";
/// The request could not be bound or verified.
pub const CODE_INVALID_ARGUMENTS: &str = "invalid-arguments";
/// Unclassified failure.
pub const CODE_UNKNOWN: &str = "unknown";
/// The payload had the wrong format.
pub const CODE_BAD_FORMAT: &str = "bad-format";
/// The caller is not authorized.
pub const CODE_UNAUTHORIZED: &str = "unauthorized";

/// The wire envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBody<T> {
    /// `"ok"` or an error code.
    pub code: String,
    /// Business payload on success, [`Message`] on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ResponseBody<T> {
    /// Returns true if the envelope signals success.
    pub fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }
}

/// The data of an error envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Client-safe description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub msg: String,
}

impl Message {
    /// Creates a message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

/// Builds a success envelope.
///
/// ```
/// let body = courier_core::response::ok(serde_json::json!({"x": 1}));
/// assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"code":"ok","data":{"x":1}}"#);
/// ```
pub fn ok<T>(data: T) -> ResponseBody<T> {
    ResponseBody {
        code: CODE_OK.to_string(),
        data: Some(data),
    }
}

/// Builds a success envelope without data.
pub fn ok_empty() -> ResponseBody<()> {
    ResponseBody {
        code: CODE_OK.to_string(),
        data: None,
    }
}

/// Builds an `invalid-arguments` error envelope.
pub fn invalid_arguments(
    err: &(dyn StdError + 'static),
    msg: Option<&str>,
) -> ResponseBody<Message> {
    error_occurred(err, CODE_INVALID_ARGUMENTS, msg)
}

/// Builds an `unknown` error envelope.
pub fn unknown_error(err: &(dyn StdError + 'static), msg: Option<&str>) -> ResponseBody<Message> {
    error_occurred(err, CODE_UNKNOWN, msg)
}

/// Builds an `unauthorized` error envelope.
pub fn unauthorized(err: &(dyn StdError + 'static), msg: Option<&str>) -> ResponseBody<Message> {
    error_occurred(err, CODE_UNAUTHORIZED, msg)
}

/// Builds a `bad-format` error envelope.
pub fn bad_format(err: &(dyn StdError + 'static), msg: Option<&str>) -> ResponseBody<Message> {
    error_occurred(err, CODE_BAD_FORMAT, msg)
}

/// Turns an error into a client-safe error envelope.
///
/// Only a tagged error may speak for itself: when the chain contains a tagged
/// error, the deepest one supplies the code (its first tag) and the message
/// (its inner error's text), and `msg` is ignored. An untagged error never
/// leaks its text; the code is `default_code` and the message is `msg`, or
/// the code itself when no message is given.
pub fn error_occurred(
    err: &(dyn StdError + 'static),
    default_code: &str,
    msg: Option<&str>,
) -> ResponseBody<Message> {
    let (code, msg) = match originating_tagged(err) {
        Some(tagged) => (
            tagged.code().unwrap_or(default_code).to_string(),
            tagged.inner().to_string(),
        ),
        None => (
            default_code.to_string(),
            msg.unwrap_or(default_code).to_string(),
        ),
    };

    ResponseBody {
        code,
        data: Some(Message::new(msg)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::{Message as Plain, TaggedError};

    fn assert_envelope(body: &ResponseBody<Message>, code: &str, msg: &str) {
        assert_eq!(body.code, code, "code mismatch");
        assert_eq!(body.data.as_ref().map(|m| m.msg.as_str()), Some(msg), "msg mismatch");
    }

    #[test]
    fn test_error_occurred() {
        let body = error_occurred(&Plain::new("hello world"), "default-code", None);
        assert_envelope(&body, "default-code", "default-code");

        let body = error_occurred(
            &TaggedError::new("hello world", ["has-code"]),
            "default-code",
            None,
        );
        assert_envelope(&body, "has-code", "hello world");

        let body = error_occurred(&Plain::new("hello world"), "default-code", Some("default msg"));
        assert_envelope(&body, "default-code", "default msg");
    }

    #[test]
    fn test_tag_wins_over_fallback_message() {
        let err = TaggedError::new("quota exceeded", ["quota"]);
        let body = error_occurred(&err, "unknown", Some("try again later"));
        assert_envelope(&body, "quota", "quota exceeded");
    }

    #[test]
    fn test_invalid_arguments_hides_untagged_text() {
        let body = invalid_arguments(&Plain::new("bad json"), None);
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"code":"invalid-arguments","data":{"msg":"invalid-arguments"}}"#);
    }

    #[test]
    fn test_helper_codes() {
        let err = Plain::new("x");
        assert_eq!(unknown_error(&err, None).code, CODE_UNKNOWN);
        assert_eq!(unauthorized(&err, None).code, CODE_UNAUTHORIZED);
        assert_eq!(bad_format(&err, None).code, CODE_BAD_FORMAT);
    }

    #[test]
    fn test_ok_serialization() {
        let body = ok(serde_json::json!({"x": 1}));
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"code":"ok","data":{"x":1}}"#);
        assert!(body.is_ok());

        assert_eq!(serde_json::to_string(&ok_empty()).unwrap(), r#"{"code":"ok"}"#);
    }

    #[test]
    fn test_envelope_roundtrip_from_wire() {
        let wire = r#"{"code":"unauthorized","data":{"msg":"login first"}}"#;
        let body: ResponseBody<Message> = serde_json::from_str(wire).unwrap();
        assert!(!body.is_ok());
        assert_eq!(body.data.unwrap().msg, "login first");
    }
}
