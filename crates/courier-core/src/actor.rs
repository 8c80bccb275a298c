//! The per-request actor contract.
//!
//! An [`Actor`] is what every handler receives: one per request, owning the
//! request, its id, its logger, its validator and its state bag. Adapters
//! implement the object-safe [`Actor`] trait; handlers mostly use the typed
//! helpers of [`ActorExt`].

use std::any::Any;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

use crate::bind::{self, BindError};
use crate::logger::Logger;
use crate::request_id::RequestId;
use crate::state::State;
use crate::validate::{Rule, ValidationError, Validator};

/// Content type of JSON responses.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Errors returned by response writes.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// A response was already written for this request.
    #[error("response already written")]
    AlreadyWritten,

    /// The body could not be serialized.
    #[error("failed to serialize response body: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A request-scoped facade over one inbound HTTP request.
#[async_trait]
pub trait Actor: Send {
    /// Returns the request id. Stable for the lifetime of the request.
    fn request_id(&self) -> &RequestId;

    /// Returns the request method.
    fn method(&self) -> &Method;

    /// Returns the request path.
    fn path(&self) -> &str;

    /// Returns the request headers, including a generated request id.
    fn headers(&self) -> &HeaderMap;

    /// Returns the raw query string, if any.
    fn raw_query(&self) -> Option<&str>;

    /// Returns the buffered request body.
    fn body(&self) -> &Bytes;

    /// Returns the path parameter `key`, or `""` when absent.
    fn param(&self, key: &str) -> &str;

    /// Returns the first query value for `key`, or `""` when absent.
    fn query(&self, key: &str) -> String {
        query_pairs(self.raw_query())
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
            .unwrap_or_default()
    }

    /// Returns every query value for `key`, in order.
    fn query_array(&self, key: &str) -> Vec<String> {
        query_pairs(self.raw_query())
            .into_iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v)
            .collect()
    }

    /// Returns the request's state bag.
    fn state(&self) -> &State;

    /// Returns the request's state bag for writing.
    fn state_mut(&mut self) -> &mut State;

    /// Returns the request's validator.
    fn validator(&self) -> &dyn Validator;

    /// Validates `data` against `rules`, logging a failure at error level.
    ///
    /// # Errors
    ///
    /// Returns the validator's [`ValidationError`].
    fn validate_any(&self, data: &dyn Any, rules: &[Rule]) -> Result<(), ValidationError> {
        self.validator().validate(data, rules).map_err(|err| {
            self.logger().error(format_args!("validate: {err}"));
            err
        })
    }

    /// Writes the response and aborts the chain.
    ///
    /// The request-id header is always set on the response.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::AlreadyWritten`] if a response was already
    /// written.
    fn write_body(
        &mut self,
        status: StatusCode,
        content_type: HeaderValue,
        body: Bytes,
    ) -> Result<(), WriteError>;

    /// Returns true once a response has been written.
    fn is_written(&self) -> bool;

    /// Stops the chain without writing a response.
    fn abort(&mut self);

    /// Runs the remaining handlers of the chain, in order, on this task.
    ///
    /// A no-op when no handler remains.
    async fn next(&mut self);

    /// Returns the request logger, prefixed with `METHOD PATH[request-id]: `.
    fn logger(&self) -> &Logger;
}

/// Typed helpers available on every actor.
pub trait ActorExt: Actor {
    /// Binds the request into `T`. See [`crate::bind::bind`].
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] on malformed or mismatched payloads.
    fn bind<T: DeserializeOwned>(&self) -> Result<T, BindError> {
        bind::bind(self.method(), self.headers(), self.raw_query(), self.body())
    }

    /// Validates `data` against `rules`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing the violated rules.
    fn validate<T: Any>(&self, data: &T, rules: &[Rule]) -> Result<(), ValidationError> {
        self.validate_any(data, rules)
    }

    /// Serializes `body` as JSON and writes it with `status`.
    ///
    /// # Errors
    ///
    /// Returns a [`WriteError`] if the body cannot be serialized or a
    /// response was already written.
    fn write<T: Serialize + ?Sized>(
        &mut self,
        status: StatusCode,
        body: &T,
    ) -> Result<(), WriteError> {
        let bytes = serde_json::to_vec(body).map_err(|err| {
            self.logger().error(format_args!("write: {err}"));
            WriteError::from(err)
        })?;
        self.write_body(
            status,
            HeaderValue::from_static(JSON_CONTENT_TYPE),
            Bytes::from(bytes),
        )
    }

    /// Stores a request-scoped value.
    fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.state_mut().insert(key, value);
    }

    /// Reads a request-scoped value.
    fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.state().get(key)
    }
}

impl<A: Actor + ?Sized> ActorExt for A {}

/// Logs and returns the error for a second write on the same request.
///
/// Adapters call this from [`Actor::write_body`].
pub fn already_written(logger: &Logger) -> WriteError {
    logger.error("write: response already written");
    WriteError::AlreadyWritten
}

fn query_pairs(raw: Option<&str>) -> Vec<(String, String)> {
    raw.and_then(|q| serde_urlencoded::from_str(q).ok())
        .unwrap_or_default()
}
