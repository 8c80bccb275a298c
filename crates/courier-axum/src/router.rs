//! Route registration on top of axum.

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::sync::Arc;

use axum::extract::{FromRequestParts, RawPathParams, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{MethodFilter, MethodRouter};
use http::{HeaderValue, Method, StatusCode};
use http_body_util::LengthLimitError;
use parking_lot::Mutex;

use courier_core::request_id::resolve_request_id;
use courier_core::router::Staged;
use courier_core::{
    Chain, Entry, HandleFunc, Logger, PreparedRoute, RequestFactory, RouteError, Router, Scope,
};
use courier_router::InsertError;

use crate::actor::{empty_response, AxumActor};

/// Routes registered so far, plus a shadow tree used to reject conflicts
/// before axum sees them.
#[derive(Default, Clone)]
struct Registry {
    shadow: courier_router::Router<()>,
    routes: BTreeMap<String, MethodRouter>,
    count: usize,
}

impl Registry {
    fn install(&mut self, route: PreparedRoute) -> Result<(), RouteError> {
        let filters = method_filters(&route)?;

        let mut shadow = self.shadow.clone();
        if route.methods.is_empty() {
            shadow
                .insert(&route.pattern, None, ())
                .map_err(|err| route_error(&route, err))?;
        } else {
            for method in &route.methods {
                shadow
                    .insert(&route.pattern, Some(method.clone()), ())
                    .map_err(|err| route_error(&route, err))?;
            }
        }

        let pattern = route.pattern.clone();
        let route = Arc::new(route);
        let handle = move |req: Request| {
            let route = Arc::clone(&route);
            async move { dispatch(&route, req).await }
        };

        let mut method_router = self
            .routes
            .remove(&pattern)
            .unwrap_or_else(MethodRouter::new);
        if filters.is_empty() {
            method_router = method_router.fallback(handle);
        } else {
            for filter in filters {
                method_router = method_router.on(filter, handle.clone());
            }
        }

        self.routes.insert(pattern, method_router);
        self.shadow = shadow;
        self.count += 1;
        Ok(())
    }
}

fn method_filters(route: &PreparedRoute) -> Result<Vec<MethodFilter>, RouteError> {
    route
        .methods
        .iter()
        .map(|method| {
            MethodFilter::try_from(method.clone()).map_err(|_| RouteError::UnsupportedMethod {
                method: method.to_string(),
            })
        })
        .collect()
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

async fn dispatch(route: &PreparedRoute, req: Request) -> Response {
    let (mut parts, body) = req.into_parts();
    let factory = route.scope.factory();
    let header = factory.options().request_id_header.clone();

    let path = parts.uri.path().to_string();
    let seed = factory.seed(route.scope.logger(), &parts.method, &path, &mut parts.headers);

    let params = match RawPathParams::from_request_parts(&mut parts, &()).await {
        Ok(raw) => raw
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        Err(rejection) => {
            seed.logger.warn(format_args!("invalid path parameter: {rejection}"));
            return empty_response(StatusCode::BAD_REQUEST, &header, &seed.request_id);
        }
    };

    let body = match axum::body::to_bytes(body, factory.options().max_body_bytes).await {
        Ok(body) => body,
        Err(err) => {
            seed.logger.warn(format_args!("failed to read request body: {err}"));
            let status = if exceeds_limit(err) {
                StatusCode::PAYLOAD_TOO_LARGE
            } else {
                StatusCode::BAD_REQUEST
            };
            return empty_response(status, &header, &seed.request_id);
        }
    };

    AxumActor::new(
        parts,
        body,
        params,
        Chain::new(Arc::clone(&route.handlers)),
        seed,
        header,
    )
    .run()
    .await
}

fn exceeds_limit(err: axum::Error) -> bool {
    let inner = err.into_inner();
    let mut current: Option<&(dyn StdError + 'static)> = Some(&*inner);
    while let Some(err) = current {
        if err.is::<LengthLimitError>() {
            return true;
        }
        current = err.source();
    }
    false
}

/// A [`Router`] that builds an [`axum::Router`].
///
/// Groups share the registry of the router they were created from.
///
/// # Example
///
/// ```
/// use courier_axum::AxumRouter;
/// use courier_core::{handler, response, ActorExt, Entry, Router};
/// use http::{Method, StatusCode};
///
/// let router = AxumRouter::new();
/// router
///     .on("/ping", [handler(|actor| Box::pin(async move {
///         let _ = actor.write(StatusCode::OK, &response::ok("pong"));
///     }))])
///     .prepare(&[Method::GET])
///     .unwrap();
///
/// let app: axum::Router = router.into_axum();
/// # drop(app);
/// ```
#[derive(Clone)]
pub struct AxumRouter {
    scope: Arc<Scope>,
    registry: Arc<Mutex<Registry>>,
}

impl AxumRouter {
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
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    /// Returns the number of prepared routes.
    pub fn route_count(&self) -> usize {
        self.registry.lock().count
    }

    /// Builds the axum router from the routes prepared so far.
    ///
    /// Unmatched paths answer `404` and unmatched methods `405`; every
    /// response, including those, carries the request-id header.
    pub fn into_axum(self) -> axum::Router {
        let registry = self.registry.lock().clone();
        let factory = self.scope.factory().clone();
        let logger = self.scope.logger().clone();

        let mut app = axum::Router::new();
        for (pattern, method_router) in registry.routes {
            app = app.route(&pattern, method_router);
        }

        let fallback_factory = factory.clone();
        let app = app.fallback(move |req: Request| {
            let factory = fallback_factory.clone();
            let logger = logger.clone();
            async move { not_found(&factory, &logger, req) }
        });

        let header = factory.options().request_id_header.clone();
        app.layer(middleware::from_fn(move |mut req: Request, next: Next| {
            let header = header.clone();
            async move {
                let request_id = resolve_request_id(req.headers_mut(), &header);
                let mut response = next.run(req).await;
                if !response.headers().contains_key(&header) {
                    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
                        response.headers_mut().insert(header, value);
                    }
                }
                response
            }
        }))
    }
}

fn not_found(factory: &RequestFactory, logger: &Logger, mut req: Request) -> Response {
    let request_id = factory.request_id(req.headers_mut());
    logger
        .for_request(req.method(), req.uri().path(), &request_id)
        .debug("no route");
    empty_response(
        StatusCode::NOT_FOUND,
        &factory.options().request_id_header,
        &request_id,
    )
}

impl Default for AxumRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl From<AxumRouter> for axum::Router {
    fn from(router: AxumRouter) -> Self {
        router.into_axum()
    }
}

impl Router for AxumRouter {
    type Entry = AxumEntry;

    fn middleware<I>(&mut self, handlers: I)
    where
        I: IntoIterator<Item = HandleFunc>,
    {
        self.scope.add_middleware(handlers);
    }

    fn on<I>(&self, path: &str, handlers: I) -> AxumEntry
    where
        I: IntoIterator<Item = HandleFunc>,
    {
        AxumEntry {
            staged: self.scope.stage(path, handlers),
            registry: Arc::clone(&self.registry),
        }
    }

    fn group(&self, prefix: &str) -> Self {
        Self {
            scope: self.scope.child(prefix),
            registry: Arc::clone(&self.registry),
        }
    }

    fn logger(&self) -> &Logger {
        self.scope.logger()
    }
}

impl std::fmt::Debug for AxumRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxumRouter")
            .field("scope", &self.scope)
            .field("routes", &self.route_count())
            .finish()
    }
}

/// A route staged on an [`AxumRouter`].
#[must_use = "a route is not reachable until it is prepared"]
pub struct AxumEntry {
    staged: Staged,
    registry: Arc<Mutex<Registry>>,
}

impl Entry for AxumEntry {
    fn prepare(self, methods: &[Method]) -> Result<(), RouteError> {
        let route = self.staged.resolve(methods)?;
        self.registry.lock().install(route)
    }
}

impl std::fmt::Debug for AxumEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxumEntry")
            .field("staged", &self.staged)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{handler, response, ActorExt, PermissiveValidator, RouterOptions};
    use http::header::ALLOW;
    use tower::ServiceExt;

    fn noop() -> HandleFunc {
        handler(|_| Box::pin(async {}))
    }

    fn echo() -> HandleFunc {
        handler(|actor| {
            Box::pin(async move {
                let id = actor.param("id").to_string();
                let _ = actor.write(StatusCode::OK, &response::ok(id));
            })
        })
    }

    async fn body_of(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn test_routes_through_axum() {
        let router = AxumRouter::new();
        router
            .group("/users")
            .on("/{id}", [echo()])
            .prepare(&[Method::GET])
            .unwrap();
        let app = router.into_axum();

        let response = app
            .oneshot(http::Request::get("/users/7").body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("request-id"));
        assert_eq!(body_of(response).await, br#"{"code":"ok","data":"7"}"#);
    }

    #[tokio::test]
    async fn test_unmatched_requests_carry_request_id() {
        let router = AxumRouter::new();
        router.on("/only-get", [noop()]).prepare(&[Method::GET]).unwrap();
        let app = router.into_axum();

        let response = app
            .clone()
            .oneshot(
                http::Request::get("/missing")
                    .header("request-id", "abc")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers().get("request-id").unwrap(), "abc");

        let response = app
            .oneshot(
                http::Request::delete("/only-get")
                    .header("request-id", "def")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.headers().contains_key(ALLOW));
        assert_eq!(response.headers().get("request-id").unwrap(), "def");
    }

    #[tokio::test]
    async fn test_any_method_route() {
        let router = AxumRouter::new();
        router.on("/any", [echo()]).prepare(&[]).unwrap();
        let app = router.into_axum();

        let response = app
            .oneshot(http::Request::patch("/any").body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_body_limit() {
        let factory = RequestFactory::new(
            PermissiveValidator,
            RouterOptions {
                max_body_bytes: 2,
                ..RouterOptions::default()
            },
        );
        let router = AxumRouter::with_factory(factory);
        router.on("/upload", [noop()]).prepare(&[Method::POST]).unwrap();

        let response = router
            .into_axum()
            .oneshot(
                http::Request::post("/upload")
                    .body(axum::body::Body::from("too big"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_conflicts_are_errors_not_panics() {
        let router = AxumRouter::new();
        router.on("/a/{id}", [noop()]).prepare(&[Method::GET]).unwrap();

        let err = router.on("/a/{id}", [noop()]).prepare(&[Method::GET]).unwrap_err();
        assert!(matches!(err, RouteError::Conflict { .. }));

        let err = router
            .on("/a/{name}", [noop()])
            .prepare(&[Method::POST])
            .unwrap_err();
        assert!(matches!(err, RouteError::InvalidPath { .. }));

        router.on("/a/{id}", [noop()]).prepare(&[Method::POST]).unwrap();
        assert_eq!(router.route_count(), 2);
    }

    #[tokio::test]
    async fn test_undecodable_param_is_bad_request() {
        let router = AxumRouter::new();
        router.on("/users/{id}", [echo()]).prepare(&[Method::GET]).unwrap();

        let response = router
            .into_axum()
            .oneshot(
                http::Request::get("/users/%FF")
                    .header("request-id", "bad-param")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers().get("request-id").unwrap(), "bad-param");
        assert!(body_of(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_wildcard_siblings_are_rejected_before_axum() {
        let router = AxumRouter::new();
        router.on("/a/{name}/b", [noop()]).prepare(&[Method::GET]).unwrap();

        let err = router.on("/a/{*rest}", [noop()]).prepare(&[Method::GET]).unwrap_err();
        assert!(matches!(err, RouteError::InvalidPath { .. }));
        assert_eq!(router.route_count(), 1);

        let response = router
            .into_axum()
            .oneshot(http::Request::get("/a/x/b").body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_unsupported_method() {
        let router = AxumRouter::new();
        let custom = Method::from_bytes(b"PURGE").unwrap();
        let err = router.on("/cache", [noop()]).prepare(&[custom]).unwrap_err();
        assert_eq!(
            err,
            RouteError::UnsupportedMethod {
                method: "PURGE".to_string()
            }
        );
        assert_eq!(router.route_count(), 0);
    }
}
