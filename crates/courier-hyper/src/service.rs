//! The hyper service.

use std::convert::Infallible;
use std::string::FromUtf8Error;
use std::sync::Arc;

use bytes::Bytes;
use http::header::ALLOW;
use http::{HeaderValue, Request, StatusCode};
use http_body::Body;
use http_body_util::{BodyExt, LengthLimitError, Limited};

use courier_core::{BoxError, BoxFuture, Chain, Logger, RequestFactory};
use courier_router::{Match, Params};

use crate::actor::{empty_response, HttpActor, HttpResponse};
use crate::router::RouteTable;

/// Serves prepared routes.
///
/// Cheap to clone; every clone shares the same frozen route table. Use it
/// directly with hyper's connection builders, or call
/// [`HttpService::dispatch`] from a custom server loop.
#[derive(Clone)]
pub struct HttpService {
    table: Arc<RouteTable>,
    factory: RequestFactory,
    logger: Logger,
}

impl HttpService {
    pub(crate) fn new(table: Arc<RouteTable>, factory: RequestFactory, logger: Logger) -> Self {
        Self {
            table,
            factory,
            logger,
        }
    }

    /// Routes one request and returns its response.
    pub async fn dispatch<B>(&self, req: Request<B>) -> HttpResponse
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let (mut parts, body) = req.into_parts();
        let header = &self.factory.options().request_id_header;

        let (route, params) = match self.table.tree.at(&parts.method, parts.uri.path()) {
            Match::Found { value, params } => (&self.table.routes[*value], params),
            Match::MethodNotAllowed { allowed } => {
                let request_id = self.factory.request_id(&mut parts.headers);
                self.logger
                    .for_request(&parts.method, parts.uri.path(), &request_id)
                    .debug("method not allowed");
                let mut response =
                    empty_response(StatusCode::METHOD_NOT_ALLOWED, header, &request_id);
                let allow = allowed
                    .iter()
                    .map(http::Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                if let Ok(value) = HeaderValue::from_str(&allow) {
                    response.headers_mut().insert(ALLOW, value);
                }
                return response;
            }
            Match::NotFound => {
                let request_id = self.factory.request_id(&mut parts.headers);
                self.logger
                    .for_request(&parts.method, parts.uri.path(), &request_id)
                    .debug("no route");
                return empty_response(StatusCode::NOT_FOUND, header, &request_id);
            }
        };

        let path = parts.uri.path().to_string();
        let seed = self
            .factory
            .seed(route.scope.logger(), &parts.method, &path, &mut parts.headers);

        let params = match decode_params(&params) {
            Ok(params) => params,
            Err(err) => {
                seed.logger.warn(format_args!("invalid path parameter: {err}"));
                return empty_response(StatusCode::BAD_REQUEST, header, &seed.request_id);
            }
        };

        let body = match Limited::new(body, self.factory.options().max_body_bytes)
            .collect()
            .await
        {
            Ok(collected) => collected.to_bytes(),
            Err(err) => {
                let status = if err.downcast_ref::<LengthLimitError>().is_some() {
                    StatusCode::PAYLOAD_TOO_LARGE
                } else {
                    StatusCode::BAD_REQUEST
                };
                seed.logger.warn(format_args!("failed to read request body: {err}"));
                return empty_response(status, header, &seed.request_id);
            }
        };

        let actor = HttpActor::new(
            parts,
            body,
            params,
            Chain::new(Arc::clone(&route.handlers)),
            seed,
            header.clone(),
        );
        actor.run().await
    }

    /// Routes a request whose body is already in memory.
    pub async fn dispatch_bytes(&self, req: Request<Bytes>) -> HttpResponse {
        self.dispatch(req.map(http_body_util::Full::new)).await
    }
}

/// Percent-decodes captured parameters.
fn decode_params(params: &Params) -> Result<Params, FromUtf8Error> {
    params
        .iter()
        .map(|(name, value)| {
            let value = urlencoding::decode(value)?;
            Ok::<_, FromUtf8Error>((name.to_string(), value.into_owned()))
        })
        .collect()
}

impl<B> hyper::service::Service<Request<B>> for HttpService
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Response = HttpResponse;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<HttpResponse, Infallible>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.dispatch(req).await) })
    }
}

impl std::fmt::Debug for HttpService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpService")
            .field("routes", &self.table.routes.len())
            .field("factory", &self.factory)
            .finish()
    }
}
