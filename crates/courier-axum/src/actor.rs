//! The axum actor.

use async_trait::async_trait;
use axum::body::Body;
use axum::response::Response;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::request::Parts;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};

use courier_core::actor::already_written;
use courier_core::{Actor, Chain, Logger, RequestId, RequestSeed, State, Validator, WriteError};

/// An [`Actor`] over a buffered axum request.
pub struct AxumActor {
    parts: Parts,
    body: Bytes,
    params: Vec<(String, String)>,
    chain: Chain,
    request_id: RequestId,
    request_id_header: HeaderName,
    logger: Logger,
    validator: Box<dyn Validator>,
    state: State,
    response: Option<Response>,
}

impl AxumActor {
    /// Creates an actor for one request.
    pub fn new(
        parts: Parts,
        body: Bytes,
        params: Vec<(String, String)>,
        chain: Chain,
        seed: RequestSeed,
        request_id_header: HeaderName,
    ) -> Self {
        Self {
            parts,
            body,
            params,
            chain,
            request_id: seed.request_id,
            request_id_header,
            logger: seed.logger,
            validator: seed.validator,
            state: State::new(),
            response: None,
        }
    }

    /// Runs the whole chain and returns the response.
    ///
    /// A chain that never writes yields `200` with an empty body.
    pub async fn run(mut self) -> Response {
        self.next().await;
        let response = self.response.take().unwrap_or_else(|| {
            empty_response(StatusCode::OK, &self.request_id_header, &self.request_id)
        });
        self.logger.debug(format_args!("completed with {}", response.status()));
        response
    }
}

#[async_trait]
impl Actor for AxumActor {
    fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    fn method(&self) -> &Method {
        &self.parts.method
    }

    fn path(&self) -> &str {
        self.parts.uri.path()
    }

    fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    fn raw_query(&self) -> Option<&str> {
        self.parts.uri.query()
    }

    fn body(&self) -> &Bytes {
        &self.body
    }

    fn param(&self, key: &str) -> &str {
        self.params
            .iter()
            .find(|(name, _)| name == key)
            .map_or("", |(_, value)| value.as_str())
    }

    fn state(&self) -> &State {
        &self.state
    }

    fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    fn validator(&self) -> &dyn Validator {
        self.validator.as_ref()
    }

    fn write_body(
        &mut self,
        status: StatusCode,
        content_type: HeaderValue,
        body: Bytes,
    ) -> Result<(), WriteError> {
        if self.response.is_some() {
            return Err(already_written(&self.logger));
        }

        let mut response = empty_response(status, &self.request_id_header, &self.request_id);
        response.headers_mut().insert(CONTENT_TYPE, content_type);
        *response.body_mut() = Body::from(body);

        self.response = Some(response);
        self.chain.abort();
        Ok(())
    }

    fn is_written(&self) -> bool {
        self.response.is_some()
    }

    fn abort(&mut self) {
        self.chain.abort();
    }

    async fn next(&mut self) {
        while let Some(handler) = self.chain.advance() {
            handler(&mut *self).await;
        }
    }

    fn logger(&self) -> &Logger {
        &self.logger
    }
}

/// Builds a body-less response carrying the request id.
pub(crate) fn empty_response(
    status: StatusCode,
    header: &HeaderName,
    request_id: &RequestId,
) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    match HeaderValue::from_str(request_id.as_str()) {
        Ok(value) => {
            response.headers_mut().insert(header.clone(), value);
        }
        Err(e) => tracing::warn!(error = %e, "request id is not a valid header value"),
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{handler, ActorExt, HandleFunc, RequestFactory};
    use http::Request;

    fn actor(uri: &str, handlers: Vec<HandleFunc>) -> AxumActor {
        let (mut parts, ()) = Request::get(uri)
            .header("request-id", "from-client")
            .body(())
            .unwrap()
            .into_parts();
        let factory = RequestFactory::default();
        let seed = factory.seed(&Logger::new(), &Method::GET, uri, &mut parts.headers);
        AxumActor::new(
            parts,
            Bytes::new(),
            vec![("slug".to_string(), "hello world".to_string())],
            Chain::new(handlers.into()),
            seed,
            factory.options().request_id_header.clone(),
        )
    }

    #[test]
    fn test_accessors() {
        let actor = actor("/posts/x?page=2", Vec::new());
        assert_eq!(actor.param("slug"), "hello world");
        assert_eq!(actor.param("other"), "");
        assert_eq!(actor.query("page"), "2");
        assert_eq!(actor.request_id().as_str(), "from-client");
    }

    #[tokio::test]
    async fn test_middleware_can_continue_then_write() {
        let mark = handler(|actor| {
            Box::pin(async move {
                actor.set("seen", true);
            })
        });
        let write = handler(|actor| {
            Box::pin(async move {
                let seen = actor.get::<bool>("seen").copied().unwrap_or(false);
                let _ = actor.write(StatusCode::OK, &seen);
            })
        });

        let response = actor("/", vec![mark, write]).run().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("request-id").unwrap(), "from-client");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"true");
    }
}
