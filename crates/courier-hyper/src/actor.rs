//! The native actor.

use async_trait::async_trait;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::request::Parts;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Response, StatusCode};
use http_body_util::Full;

use courier_core::actor::already_written;
use courier_core::{Actor, Chain, Logger, RequestId, RequestSeed, State, Validator, WriteError};
use courier_router::Params;

/// Response type produced by the native adapter.
pub type HttpResponse = Response<Full<Bytes>>;

/// An [`Actor`] over a buffered `http::Request`.
pub struct HttpActor {
    parts: Parts,
    body: Bytes,
    params: Params,
    chain: Chain,
    request_id: RequestId,
    request_id_header: HeaderName,
    logger: Logger,
    validator: Box<dyn Validator>,
    state: State,
    response: Option<HttpResponse>,
}

impl HttpActor {
    /// Creates an actor for one request.
    pub fn new(
        parts: Parts,
        body: Bytes,
        params: Params,
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
    pub async fn run(mut self) -> HttpResponse {
        self.next().await;
        let response = self.response.take().unwrap_or_else(|| {
            empty_response(StatusCode::OK, &self.request_id_header, &self.request_id)
        });
        self.logger.debug(format_args!("completed with {}", response.status()));
        response
    }
}

#[async_trait]
impl Actor for HttpActor {
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
        self.params.get(key).unwrap_or_default()
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
        *response.body_mut() = Full::new(body);

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
) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    match HeaderValue::from_str(request_id.as_str()) {
        Ok(value) => {
            response.headers_mut().insert(header.clone(), value);
        }
        Err(e) => tracing::warn!(error = %e, "request id is not a valid header value"),
    }
    response
}
