//! Handler chains.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::actor::Actor;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A unit of request processing.
///
/// Handlers are shared by every request that hits their route, and receive the
/// request's actor for the duration of one call.
pub type HandleFunc = Arc<dyn for<'a> Fn(&'a mut dyn Actor) -> BoxFuture<'a, ()> + Send + Sync>;

/// Wraps a closure as a [`HandleFunc`].
///
/// ```
/// use courier_core::{handler, ActorExt};
/// use http::StatusCode;
///
/// let hello = handler(|actor| {
///     Box::pin(async move {
///         let _ = actor.write(StatusCode::OK, &courier_core::response::ok("hello"));
///     })
/// });
/// # drop(hello);
/// ```
pub fn handler<F>(f: F) -> HandleFunc
where
    F: for<'a> Fn(&'a mut dyn Actor) -> BoxFuture<'a, ()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The composed handlers of one request and how far they have run.
#[derive(Clone)]
pub struct Chain {
    handlers: Arc<[HandleFunc]>,
    cursor: usize,
    aborted: bool,
}

impl Chain {
    /// Creates a chain positioned before its first handler.
    pub fn new(handlers: Arc<[HandleFunc]>) -> Self {
        Self {
            handlers,
            cursor: 0,
            aborted: false,
        }
    }

    /// Returns the next handler to run and moves past it.
    ///
    /// Returns `None` once the chain is exhausted or aborted.
    pub fn advance(&mut self) -> Option<HandleFunc> {
        if self.aborted {
            return None;
        }
        let handler = self.handlers.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(handler)
    }

    /// Stops the chain; no further handler will be returned.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    /// Returns true if the chain was aborted.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Returns the number of handlers not yet started.
    pub fn remaining(&self) -> usize {
        if self.aborted {
            0
        } else {
            self.handlers.len() - self.cursor
        }
    }

    /// Returns the total number of handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if the chain has no handlers.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("len", &self.handlers.len())
            .field("cursor", &self.cursor)
            .field("aborted", &self.aborted)
            .finish()
    }
}
