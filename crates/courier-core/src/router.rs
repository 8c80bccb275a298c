//! Router contract and group scopes.
//!
//! Registration is two-phase. [`Router::on`] stages a handler chain at a path
//! and returns an [`Entry`]; [`Entry::prepare`] makes it live for a set of
//! methods. Middleware and group prefixes live in [`Scope`]s linked to their
//! parent, and a route's full chain is resolved when it is prepared:
//!
//! ```text
//! root middleware -> group middleware -> ... -> route handlers
//! ```

use std::fmt;
use std::sync::Arc;

use http::Method;
use parking_lot::RwLock;

use crate::chain::HandleFunc;
use crate::factory::RequestFactory;
use crate::logger::Logger;
use crate::path;

/// Errors raised while registering routes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The route pattern is malformed.
    #[error("invalid route path '{path}': {reason}")]
    InvalidPath {
        /// The offending pattern.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The pattern already has a handler for this method.
    #[error("route conflict: {method} {path} is already registered")]
    Conflict {
        /// The pattern.
        path: String,
        /// The method, or `*` for any method.
        method: String,
    },

    /// The adapter cannot route this method.
    #[error("unsupported method: {method}")]
    UnsupportedMethod {
        /// The rejected method.
        method: String,
    },
}

/// Registers routes, middleware and groups.
pub trait Router: Sized {
    /// The staged registration returned by [`Router::on`].
    type Entry: Entry;

    /// Appends middleware run before every route of this router and its
    /// groups, in registration order.
    fn middleware<I>(&mut self, handlers: I)
    where
        I: IntoIterator<Item = HandleFunc>;

    /// Stages `handlers` at `path`. Nothing is reachable until the entry is
    /// prepared.
    fn on<I>(&self, path: &str, handlers: I) -> Self::Entry
    where
        I: IntoIterator<Item = HandleFunc>;

    /// Returns a child router whose routes live under `prefix`.
    fn group(&self, prefix: &str) -> Self;

    /// Returns this router's logger.
    fn logger(&self) -> &Logger;
}

/// A staged route.
#[must_use = "a route is not reachable until it is prepared"]
pub trait Entry {
    /// Makes the route live for `methods`, or for every method when empty.
    ///
    /// Consumes the entry, so a route is prepared at most once.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] if the pattern is invalid or a method is
    /// already registered for it.
    fn prepare(self, methods: &[Method]) -> Result<(), RouteError>;
}

/// One level of the router hierarchy.
pub struct Scope {
    prefix: String,
    logger: Logger,
    middleware: RwLock<Vec<HandleFunc>>,
    parent: Option<Arc<Scope>>,
    factory: RequestFactory,
}

impl Scope {
    /// Creates the root scope.
    pub fn root(factory: RequestFactory, logger: Logger) -> Arc<Self> {
        Arc::new(Self {
            prefix: String::new(),
            logger,
            middleware: RwLock::new(Vec::new()),
            parent: None,
            factory,
        })
    }

    /// Creates a child scope under `prefix`.
    pub fn child(self: &Arc<Self>, prefix: &str) -> Arc<Self> {
        Arc::new(Self {
            prefix: path::join(&self.prefix, prefix),
            logger: self.logger.prefix(format_args!("{prefix}: ")),
            middleware: RwLock::new(Vec::new()),
            parent: Some(Arc::clone(self)),
            factory: self.factory.clone(),
        })
    }

    /// Appends middleware to this scope.
    pub fn add_middleware<I>(&self, handlers: I)
    where
        I: IntoIterator<Item = HandleFunc>,
    {
        self.middleware.write().extend(handlers);
    }

    /// Returns the full path prefix of this scope.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the scope logger.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Returns the per-request factory.
    pub fn factory(&self) -> &RequestFactory {
        &self.factory
    }

    /// Returns the middleware of this scope and its ancestors, root first.
    pub fn middleware_chain(&self) -> Vec<HandleFunc> {
        let mut scopes = vec![self];
        let mut current = self.parent.as_deref();
        while let Some(scope) = current {
            scopes.push(scope);
            current = scope.parent.as_deref();
        }

        scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.middleware.read().clone())
            .collect()
    }

    /// Stages a route on this scope.
    pub fn stage<I>(self: &Arc<Self>, path: &str, handlers: I) -> Staged
    where
        I: IntoIterator<Item = HandleFunc>,
    {
        Staged {
            scope: Arc::clone(self),
            path: path.to_string(),
            handlers: handlers.into_iter().collect(),
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("prefix", &self.prefix)
            .field("middleware", &self.middleware.read().len())
            .field("has_parent", &self.parent.is_some())
            .finish_non_exhaustive()
    }
}

/// A route staged on a scope but not yet prepared.
pub struct Staged {
    scope: Arc<Scope>,
    path: String,
    handlers: Vec<HandleFunc>,
}

impl Staged {
    /// Resolves the full pattern and chain of the route.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPath`] for a malformed pattern.
    pub fn resolve(self, methods: &[Method]) -> Result<PreparedRoute, RouteError> {
        let pattern = path::join(self.scope.prefix(), &self.path);
        path::validate(&pattern)?;

        let mut chain = self.scope.middleware_chain();
        chain.extend(self.handlers);

        let route = PreparedRoute {
            pattern,
            methods: methods.to_vec(),
            handlers: chain.into(),
            scope: self.scope,
        };
        route.scope.logger().debug(format_args!(
            "route {} {} prepared with {} handlers",
            route.methods_label(),
            route.pattern,
            route.handlers.len()
        ));
        Ok(route)
    }
}

impl fmt::Debug for Staged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Staged")
            .field("prefix", &self.scope.prefix())
            .field("path", &self.path)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// A route ready to be installed in an adapter's route table.
#[derive(Clone)]
pub struct PreparedRoute {
    /// The full route pattern.
    pub pattern: String,
    /// Accepted methods; empty means every method.
    pub methods: Vec<Method>,
    /// The composed chain: middleware first, route handlers last.
    pub handlers: Arc<[HandleFunc]>,
    /// The scope the route was registered on.
    pub scope: Arc<Scope>,
}

impl PreparedRoute {
    /// Returns a human-readable method list, `*` for any method.
    pub fn methods_label(&self) -> String {
        if self.methods.is_empty() {
            "*".to_string()
        } else {
            self.methods
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(",")
        }
    }

    /// Returns the conflict error for `method` on this route.
    pub fn conflict(&self, method: Option<&Method>) -> RouteError {
        RouteError::Conflict {
            path: self.pattern.clone(),
            method: method.map_or_else(|| "*".to_string(), ToString::to_string),
        }
    }
}

impl fmt::Debug for PreparedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedRoute")
            .field("pattern", &self.pattern)
            .field("methods", &self.methods)
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::handler;

    fn noop() -> HandleFunc {
        handler(|_| Box::pin(async {}))
    }

    #[test]
    fn test_child_prefix_and_logger() {
        let root = Scope::root(RequestFactory::default(), Logger::new());
        let api = root.child("/api");
        let v1 = api.child("/v1");

        assert_eq!(v1.prefix(), "/api/v1");
        assert_eq!(v1.logger().prefix_str(), "/api: /v1: ");
    }

    #[test]
    fn test_chain_orders_ancestors_first() {
        let root = Scope::root(RequestFactory::default(), Logger::new());
        let a = noop();
        let b = noop();
        let c = noop();
        let route = noop();

        root.add_middleware([a.clone()]);
        let group = root.child("/g");
        group.add_middleware([c.clone()]);
        // Registered on the parent after the group exists; still applies.
        root.add_middleware([b.clone()]);

        let prepared = group.stage("/x", [route.clone()]).resolve(&[]).unwrap();
        assert_eq!(prepared.pattern, "/g/x");
        let expected = [a, b, c, route];
        assert_eq!(prepared.handlers.len(), expected.len());
        for (got, want) in prepared.handlers.iter().zip(expected.iter()) {
            assert!(Arc::ptr_eq(got, want));
        }
    }

    #[test]
    fn test_resolve_rejects_bad_pattern() {
        let root = Scope::root(RequestFactory::default(), Logger::new());
        let err = root.stage("/users/:id", [noop()]).resolve(&[]).unwrap_err();
        assert!(matches!(err, RouteError::InvalidPath { .. }));
    }

    #[test]
    fn test_methods_label() {
        let root = Scope::root(RequestFactory::default(), Logger::new());
        let any = root.stage("/a", [noop()]).resolve(&[]).unwrap();
        assert_eq!(any.methods_label(), "*");
        assert_eq!(
            any.conflict(None).to_string(),
            "route conflict: * /a is already registered"
        );

        let some = root
            .stage("/b", [noop()])
            .resolve(&[Method::GET, Method::POST])
            .unwrap();
        assert_eq!(some.methods_label(), "GET,POST");
    }
}
