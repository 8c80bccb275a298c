//! Route registration for the native adapter.

use std::sync::Arc;

use http::Method;
use parking_lot::RwLock;

use courier_core::router::Staged;
use courier_core::{
    Entry, HandleFunc, Logger, PreparedRoute, RequestFactory, RouteError, Router, Scope,
};
use courier_router::InsertError;

use crate::service::HttpService;

/// Prepared routes and the tree that indexes them.
#[derive(Debug, Clone, Default)]
pub(crate) struct RouteTable {
    pub(crate) tree: courier_router::Router<usize>,
    pub(crate) routes: Vec<PreparedRoute>,
}

impl RouteTable {
    /// Adds a prepared route. Nothing is installed if any method conflicts.
    fn install(&mut self, route: PreparedRoute) -> Result<(), RouteError> {
        let index = self.routes.len();
        let mut tree = self.tree.clone();

        let methods: Vec<Option<Method>> = if route.methods.is_empty() {
            vec![None]
        } else {
            route.methods.iter().cloned().map(Some).collect()
        };
        for method in methods {
            tree.insert(&route.pattern, method, index)
                .map_err(|err| route_error(&route, err))?;
        }

        self.tree = tree;
        self.routes.push(route);
        Ok(())
    }
}

fn route_error(route: &PreparedRoute, err: InsertError) -> RouteError {
    match err {
        InsertError::Conflict { method } => route.conflict(method.as_ref()),
        other => RouteError::InvalidPath {
            path: route.pattern.clone(),
            reason: other.to_string(),
        },
    }
}

/// A [`Router`] over `http`/`hyper` types.
///
/// Groups share the route table of the router they were created from.
///
/// # Example
///
/// ```
/// use courier_core::{handler, ActorExt, Entry, Router, response};
/// use courier_hyper::HttpRouter;
/// use http::{Method, StatusCode};
///
/// let router = HttpRouter::new();
/// let api = router.group("/api");
/// api.on("/ping", [handler(|actor| Box::pin(async move {
///     let _ = actor.write(StatusCode::OK, &response::ok("pong"));
/// }))])
/// .prepare(&[Method::GET])
/// .unwrap();
///
/// let service = router.into_service();
/// # drop(service);
/// ```
#[derive(Clone)]
pub struct HttpRouter {
    scope: Arc<Scope>,
    table: Arc<RwLock<RouteTable>>,
}

impl HttpRouter {
    /// Creates a router with a permissive validator and default options.
    pub fn new() -> Self {
        Self::with_factory(RequestFactory::default())
    }

    /// Creates a router with a custom per-request factory.
    pub fn with_factory(factory: RequestFactory) -> Self {
        Self::with_logger(factory, Logger::new())
    }

    /// Creates a router whose logger starts with `logger`'s prefix.
    pub fn with_logger(factory: RequestFactory, logger: Logger) -> Self {
        Self {
            scope: Scope::root(factory, logger),
            table: Arc::new(RwLock::new(RouteTable::default())),
        }
    }

    /// Returns the number of prepared routes.
    pub fn route_count(&self) -> usize {
        self.table.read().routes.len()
    }

    /// Freezes the current route table into a service.
    ///
    /// Routes prepared afterwards are not visible to the returned service.
    pub fn into_service(self) -> HttpService {
        let table = self.table.read().clone();
        HttpService::new(Arc::new(table), self.scope.factory().clone(), self.scope.logger().clone())
    }
}

impl Default for HttpRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl Router for HttpRouter {
    type Entry = HttpEntry;

    fn middleware<I>(&mut self, handlers: I)
    where
        I: IntoIterator<Item = HandleFunc>,
    {
        self.scope.add_middleware(handlers);
    }

    fn on<I>(&self, path: &str, handlers: I) -> HttpEntry
    where
        I: IntoIterator<Item = HandleFunc>,
    {
        HttpEntry {
            staged: self.scope.stage(path, handlers),
            table: Arc::clone(&self.table),
        }
    }

    fn group(&self, prefix: &str) -> Self {
        Self {
            scope: self.scope.child(prefix),
            table: Arc::clone(&self.table),
        }
    }

    fn logger(&self) -> &Logger {
        self.scope.logger()
    }
}

impl std::fmt::Debug for HttpRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRouter")
            .field("scope", &self.scope)
            .field("routes", &self.route_count())
            .finish()
    }
}

/// A route staged on an [`HttpRouter`].
#[must_use = "a route is not reachable until it is prepared"]
#[derive(Debug)]
pub struct HttpEntry {
    staged: Staged,
    table: Arc<RwLock<RouteTable>>,
}

impl Entry for HttpEntry {
    fn prepare(self, methods: &[Method]) -> Result<(), RouteError> {
        let route = self.staged.resolve(methods)?;
        self.table.write().install(route)
    }
}
