//! Bind, validate, call downstream.
//!
//! [`Forwarder::forward`] is the pipeline most handlers are built on. Each
//! stage is a gate: on failure it writes a client-safe response, logs the full
//! detail and returns the error; the handler only writes on success.
//!
//! | Stage | Status | Envelope |
//! |---|---|---|
//! | bind | 400 | `invalid-arguments`, "can't parse request: ..." |
//! | validate | 400 | `invalid-arguments`, fixed message |
//! | downstream, [`RemoteError`] in chain | its code | its status, generic message |
//! | downstream, anything else | 500 | `unknown` (or the error's tag), generic message |

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;

use http::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::actor::{Actor, ActorExt};
use crate::bind::BindError;
use crate::response::{
    error_occurred, invalid_arguments, unknown_error, Message as Envelope, ResponseBody,
    CODE_UNKNOWN,
};
use crate::tag::{BoxError, Message};
use crate::validate::{Rule, ValidationError};

/// Default message for downstream failures.
pub const DEFAULT_INTERNAL_MESSAGE: &str = "internal server error, please try again";
/// Default message for validation failures.
pub const DEFAULT_INVALID_MESSAGE: &str = "argument can't be verified";

/// Name of the forward outcome counter.
pub const FORWARD_TOTAL: &str = "courier_forward_total";

/// A classified downstream failure.
///
/// This is the error shape remote-call transports report: `code` is the HTTP
/// status to answer with, `status` the classification sent to the client and
/// `detail` the internal description, which is only logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    /// Identifies the failing service or operation.
    #[serde(default)]
    pub id: String,
    /// HTTP status code.
    #[serde(default)]
    pub code: i32,
    /// Internal detail. Never sent to clients.
    #[serde(default)]
    pub detail: String,
    /// Client-facing classification.
    #[serde(default)]
    pub status: String,
}

impl RemoteError {
    /// Creates a remote error with an explicit status text.
    pub fn new(
        id: impl Into<String>,
        detail: impl Into<String>,
        code: i32,
        status: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            code,
            detail: detail.into(),
            status: status.into(),
        }
    }

    /// Creates a remote error whose status is the reason phrase of `code`.
    pub fn with_code(id: impl Into<String>, code: StatusCode, detail: impl Into<String>) -> Self {
        Self::new(
            id,
            detail,
            i32::from(code.as_u16()),
            code.canonical_reason().unwrap_or_default(),
        )
    }

    /// 400 Bad Request.
    pub fn bad_request(id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::with_code(id, StatusCode::BAD_REQUEST, detail)
    }

    /// 401 Unauthorized.
    pub fn unauthorized(id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::with_code(id, StatusCode::UNAUTHORIZED, detail)
    }

    /// 403 Forbidden.
    pub fn forbidden(id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::with_code(id, StatusCode::FORBIDDEN, detail)
    }

    /// 404 Not Found.
    pub fn not_found(id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::with_code(id, StatusCode::NOT_FOUND, detail)
    }

    /// 405 Method Not Allowed.
    pub fn method_not_allowed(id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::with_code(id, StatusCode::METHOD_NOT_ALLOWED, detail)
    }

    /// 408 Request Timeout.
    pub fn timeout(id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::with_code(id, StatusCode::REQUEST_TIMEOUT, detail)
    }

    /// 409 Conflict.
    pub fn conflict(id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::with_code(id, StatusCode::CONFLICT, detail)
    }

    /// 500 Internal Server Error.
    pub fn internal(id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::with_code(id, StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    /// Decodes a JSON-encoded remote error.
    ///
    /// Text that is not a JSON remote error becomes the detail of an error
    /// with code 0.
    pub fn parse(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_else(|_| Self {
            detail: text.to_string(),
            ..Self::default()
        })
    }

    /// Returns the HTTP status to answer with, or 500 if `code` is not one.
    pub fn http_status(&self) -> StatusCode {
        u16::try_from(self.code)
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns the client-facing code, `unknown` when empty.
    pub fn client_code(&self) -> &str {
        if self.status.is_empty() {
            CODE_UNKNOWN
        } else {
            &self.status
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({}): {}", self.code, self.status, self.id, self.detail)
    }
}

impl StdError for RemoteError {}

/// Finds the first [`RemoteError`] along a source chain.
pub fn find_remote<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a RemoteError> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(remote) = e.downcast_ref::<RemoteError>() {
            return Some(remote);
        }
        current = e.source();
    }
    None
}

/// A failure of the downstream call.
#[derive(Debug, thiserror::Error)]
pub enum DownstreamError {
    /// The failure carried a [`RemoteError`].
    #[error("{0}")]
    Classified(RemoteError),

    /// Any other failure.
    #[error("{0}")]
    Unclassified(BoxError),
}

/// Errors returned by [`Forwarder::forward`]. The response has already been
/// written when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// The request could not be bound.
    #[error("can't parse request: {0}")]
    Bind(#[from] BindError),

    /// The bound request failed validation.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// The downstream call failed.
    #[error("forward: {0}")]
    Downstream(#[from] DownstreamError),
}

/// Client-facing messages used by the forwarder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardMessages {
    /// Sent for every downstream failure.
    pub internal: String,
    /// Sent for validation failures.
    pub invalid_arguments: String,
}

impl Default for ForwardMessages {
    fn default() -> Self {
        Self {
            internal: DEFAULT_INTERNAL_MESSAGE.to_string(),
            invalid_arguments: DEFAULT_INVALID_MESSAGE.to_string(),
        }
    }
}

/// Runs the bind, validate, call pipeline.
#[derive(Debug, Clone, Default)]
pub struct Forwarder {
    messages: ForwardMessages,
}

impl Forwarder {
    /// Creates a forwarder with custom messages.
    pub fn new(messages: ForwardMessages) -> Self {
        Self { messages }
    }

    /// Returns the configured messages.
    pub fn messages(&self) -> &ForwardMessages {
        &self.messages
    }

    /// Binds a `Req`, validates it against `rules` and passes it to `op`.
    ///
    /// On success the downstream result is returned and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns a [`ForwardError`] for the first failing stage, after writing
    /// the matching error response.
    pub async fn forward<Req, Res, F, Fut, E>(
        &self,
        actor: &mut dyn Actor,
        op: F,
        rules: &[Rule],
    ) -> Result<Res, ForwardError>
    where
        Req: DeserializeOwned + Any,
        F: FnOnce(Req) -> Fut,
        Fut: Future<Output = Result<Res, E>>,
        E: Into<BoxError>,
    {
        let req: Req = match actor.bind() {
            Ok(req) => req,
            Err(err) => {
                let msg = format!("can't parse request: {err}");
                respond(actor, StatusCode::BAD_REQUEST, &invalid_arguments(&err, Some(&msg)));
                actor.logger().trace(&msg);
                record("bind_error");
                return Err(err.into());
            }
        };

        if let Err(err) = actor.validate(&req, rules) {
            respond(
                actor,
                StatusCode::BAD_REQUEST,
                &invalid_arguments(&err, Some(&self.messages.invalid_arguments)),
            );
            actor.logger().trace(format_args!("invalid request: {err}"));
            record("validation_error");
            return Err(err.into());
        }

        match op(req).await {
            Ok(res) => {
                record("ok");
                Ok(res)
            }
            Err(err) => {
                let err: BoxError = err.into();
                actor.logger().error(format_args!("forward: {err}"));
                Err(self.downstream_failure(actor, err).into())
            }
        }
    }

    fn downstream_failure(&self, actor: &mut dyn Actor, err: BoxError) -> DownstreamError {
        if let Some(remote) = find_remote(&*err).cloned() {
            let body = error_occurred(
                &Message::new(remote.detail.clone()),
                remote.client_code(),
                Some(&self.messages.internal),
            );
            respond(actor, remote.http_status(), &body);
            record("remote_error");
            return DownstreamError::Classified(remote);
        }

        let body = unknown_error(&*err, Some(&self.messages.internal));
        respond(actor, StatusCode::INTERNAL_SERVER_ERROR, &body);
        record("unknown_error");
        DownstreamError::Unclassified(err)
    }
}

/// Forwards with the default messages. See [`Forwarder::forward`].
///
/// # Errors
///
/// Returns a [`ForwardError`] for the first failing stage.
pub async fn forward<Req, Res, F, Fut, E>(
    actor: &mut dyn Actor,
    op: F,
    rules: &[Rule],
) -> Result<Res, ForwardError>
where
    Req: DeserializeOwned + Any,
    F: FnOnce(Req) -> Fut,
    Fut: Future<Output = Result<Res, E>>,
    E: Into<BoxError>,
{
    Forwarder::default().forward(actor, op, rules).await
}

// Write failures are already logged by the actor.
fn respond(actor: &mut dyn Actor, status: StatusCode, body: &ResponseBody<Envelope>) {
    let _ = actor.write(status, body);
}

fn record(outcome: &'static str) {
    metrics::counter!(FORWARD_TOTAL, "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::TaggedError;

    #[derive(Debug, thiserror::Error)]
    #[error("calling users service")]
    struct CallFailed(#[source] RemoteError);

    #[test]
    fn test_reason_phrase_helpers() {
        let err = RemoteError::forbidden("users", "secret-internal-detail");
        assert_eq!(err.code, 403);
        assert_eq!(err.status, "Forbidden");
        assert_eq!(err.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(RemoteError::not_found("x", "y").status, "Not Found");
        assert_eq!(RemoteError::internal("x", "y").code, 500);
    }

    #[test]
    fn test_parse() {
        let err =
            RemoteError::parse(r#"{"id":"svc","code":409,"detail":"dup","status":"Conflict"}"#);
        assert_eq!(err, RemoteError::conflict("svc", "dup"));

        let err = RemoteError::parse("connection reset");
        assert_eq!(err.code, 0);
        assert_eq!(err.detail, "connection reset");
        assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.client_code(), CODE_UNKNOWN);
    }

    #[test]
    fn test_invalid_code_maps_to_500() {
        for code in [42, -1] {
            assert_eq!(
                RemoteError::new("", "", code, "x").http_status(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }

    #[test]
    fn test_find_remote_through_wrappers() {
        let err = CallFailed(RemoteError::timeout("users", "deadline"));
        assert_eq!(find_remote(&err).map(|r| r.code), Some(408));

        let boxed: BoxError = Box::new(TaggedError::wrap(err, ["retryable"]));
        assert_eq!(find_remote(&*boxed).map(|r| r.code), Some(408));

        assert!(find_remote(&Message::new("plain")).is_none());
    }

    #[test]
    fn test_default_messages() {
        let messages = Forwarder::default().messages().clone();
        assert_eq!(messages.internal, "internal server error, please try again");
        assert_eq!(messages.invalid_arguments, "argument can't be verified");
    }
}
