//! Per-request construction.
//!
//! Routers own a [`RequestFactory`] instead of reaching for globals: it knows
//! which header carries the request id and how to build each request's
//! validator, so tests can swap either for a fake.

use std::sync::Arc;

use http::{HeaderMap, HeaderName, Method};

use crate::logger::Logger;
use crate::request_id::{default_header, resolve_request_id, RequestId};
use crate::validate::{PermissiveValidator, Validator, ValidatorFactory};

/// Default request body limit: 1 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Router-wide options.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Header that carries the request id in both directions.
    pub request_id_header: HeaderName,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            request_id_header: default_header(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// The pieces every actor starts with.
pub struct RequestSeed {
    /// The request id, already present in the request headers.
    pub request_id: RequestId,
    /// Logger prefixed with `METHOD PATH[request-id]: `.
    pub logger: Logger,
    /// The request's validator.
    pub validator: Box<dyn Validator>,
}

impl std::fmt::Debug for RequestSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSeed")
            .field("request_id", &self.request_id)
            .field("logger", &self.logger)
            .finish_non_exhaustive()
    }
}

/// Builds the per-request pieces of an actor.
#[derive(Clone)]
pub struct RequestFactory {
    validators: Arc<dyn ValidatorFactory>,
    options: RouterOptions,
}

impl RequestFactory {
    /// Creates a factory.
    pub fn new(validators: impl ValidatorFactory + 'static, options: RouterOptions) -> Self {
        Self {
            validators: Arc::new(validators),
            options,
        }
    }

    /// Returns the router options.
    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    /// Resolves only the request id, for requests that never reach a handler.
    pub fn request_id(&self, headers: &mut HeaderMap) -> RequestId {
        resolve_request_id(headers, &self.options.request_id_header)
    }

    /// Resolves the request id and builds the request logger and validator.
    ///
    /// `base` is the logger of the scope the route was registered on.
    pub fn seed(
        &self,
        base: &Logger,
        method: &Method,
        path: &str,
        headers: &mut HeaderMap,
    ) -> RequestSeed {
        let request_id = self.request_id(headers);
        let logger = base.for_request(method, path, &request_id);
        let validator = self.validators.create(&logger);
        RequestSeed {
            request_id,
            logger,
            validator,
        }
    }
}

impl Default for RequestFactory {
    fn default() -> Self {
        Self::new(PermissiveValidator, RouterOptions::default())
    }
}

impl std::fmt::Debug for RequestFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestFactory")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_default_options() {
        let options = RouterOptions::default();
        assert_eq!(options.request_id_header.as_str(), "request-id");
        assert_eq!(options.max_body_bytes, 1024 * 1024);
    }

    #[test]
    fn test_seed_reuses_header_and_prefixes_logger() {
        let factory = RequestFactory::default();
        let mut headers = HeaderMap::new();
        headers.insert("request-id", HeaderValue::from_static("abc"));

        let base = Logger::new().prefix("/api: ");
        let seed = factory.seed(&base, &Method::GET, "/api/x", &mut headers);
        assert_eq!(seed.request_id.as_str(), "abc");
        assert_eq!(seed.logger.prefix_str(), "/api: GET /api/x[abc]: ");
    }

    #[test]
    fn test_seed_generates_id_into_headers() {
        let factory = RequestFactory::default();
        let mut headers = HeaderMap::new();
        let seed = factory.seed(&Logger::new(), &Method::POST, "/", &mut headers);
        assert_eq!(headers.get("request-id").unwrap(), seed.request_id.as_str());
    }

    #[test]
    fn test_validator_factory_sees_request_logger() {
        use std::sync::Mutex;

        let seen = Arc::new(Mutex::new(String::new()));
        let captured = seen.clone();
        let factory = RequestFactory::new(
            move |logger: &Logger| {
                *captured.lock().unwrap() = logger.prefix_str().to_string();
                Box::new(PermissiveValidator) as Box<dyn Validator>
            },
            RouterOptions::default(),
        );

        let mut headers = HeaderMap::new();
        headers.insert("request-id", HeaderValue::from_static("r"));
        let _seed = factory.seed(&Logger::new(), &Method::PUT, "/p", &mut headers);
        assert_eq!(&*seen.lock().unwrap(), "PUT /p[r]: ");
    }
}
