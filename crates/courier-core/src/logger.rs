//! Prefixed request loggers.
//!
//! A [`Logger`] is a cheap value that prepends a textual prefix to every
//! message and forwards it to `tracing`. Routers hand each request a logger
//! prefixed with `METHOD PATH[request-id]: `, so every line a handler writes
//! is attributable without passing context around.

use std::fmt::Display;
use std::sync::Arc;
use tracing::Level;

use crate::request_id::RequestId;

/// Tracing target for all courier log lines.
pub const LOG_TARGET: &str = "courier";

/// A logger that prefixes every message.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    prefix: Arc<str>,
    request_id: Option<RequestId>,
}

impl Logger {
    /// Creates a logger without a prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a logger whose prefix is this logger's prefix plus `segment`.
    pub fn prefix(&self, segment: impl Display) -> Self {
        Self {
            prefix: format!("{}{segment}", self.prefix).into(),
            request_id: self.request_id.clone(),
        }
    }

    /// Returns the per-request logger: prefixed with `METHOD PATH[id]: ` and
    /// recording the id as a structured field.
    pub fn for_request(&self, method: &http::Method, path: &str, request_id: &RequestId) -> Self {
        let method = method.as_str().to_uppercase();
        let mut logger = self.prefix(format_args!("{method} {path}[{request_id}]: "));
        logger.request_id = Some(request_id.clone());
        logger
    }

    /// Returns the accumulated prefix.
    pub fn prefix_str(&self) -> &str {
        &self.prefix
    }

    /// Returns the request id this logger is bound to, if any.
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Logs `message` at `level`.
    pub fn log(&self, level: Level, message: impl Display) {
        let request_id = self.request_id.as_ref().map(RequestId::as_str);
        let prefix = &*self.prefix;
        match level {
            Level::TRACE => tracing::trace!(target: LOG_TARGET, request_id, "{prefix}{message}"),
            Level::DEBUG => tracing::debug!(target: LOG_TARGET, request_id, "{prefix}{message}"),
            Level::INFO => tracing::info!(target: LOG_TARGET, request_id, "{prefix}{message}"),
            Level::WARN => tracing::warn!(target: LOG_TARGET, request_id, "{prefix}{message}"),
            Level::ERROR => tracing::error!(target: LOG_TARGET, request_id, "{prefix}{message}"),
        }
    }

    /// Logs at trace level.
    pub fn trace(&self, message: impl Display) {
        self.log(Level::TRACE, message);
    }

    /// Logs at debug level.
    pub fn debug(&self, message: impl Display) {
        self.log(Level::DEBUG, message);
    }

    /// Logs at info level.
    pub fn info(&self, message: impl Display) {
        self.log(Level::INFO, message);
    }

    /// Logs at warn level.
    pub fn warn(&self, message: impl Display) {
        self.log(Level::WARN, message);
    }

    /// Logs at error level.
    pub fn error(&self, message: impl Display) {
        self.log(Level::ERROR, message);
    }
}
