//! In-memory test client.

use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use tower::ServiceExt;

use courier_core::BoxFuture;
use courier_hyper::HttpService;

use crate::error::TestError;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;

/// Outcome of one in-memory dispatch.
pub type DispatchResult = Result<TestResponse, TestError>;

/// Something a [`TestClient`] can send requests to.
pub trait Dispatch: Send + Sync {
    /// Handles one request in memory.
    fn dispatch(&self, request: http::Request<Bytes>) -> BoxFuture<'_, DispatchResult>;
}

impl Dispatch for HttpService {
    fn dispatch(&self, request: http::Request<Bytes>) -> BoxFuture<'_, DispatchResult> {
        Box::pin(async move { TestResponse::from_http(self.dispatch_bytes(request).await).await })
    }
}

impl Dispatch for axum::Router {
    fn dispatch(&self, request: http::Request<Bytes>) -> BoxFuture<'_, DispatchResult> {
        let app = self.clone();
        Box::pin(async move {
            let response = match app.oneshot(request.map(axum::body::Body::from)).await {
                Ok(response) => response,
                Err(never) => match never {},
            };
            TestResponse::from_http(response).await
        })
    }
}

/// Sends requests to a router without a network.
///
/// ```ignore
/// let client = TestClient::new(router.into_service());
/// let response = client.get("/users/1").send().await?;
/// response.assert_status(StatusCode::OK);
/// ```
#[must_use]
#[derive(Clone)]
pub struct TestClient {
    target: Arc<dyn Dispatch>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Wraps a dispatch target.
    pub fn new(target: impl Dispatch + 'static) -> Self {
        Self {
            target: Arc::new(target),
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Starts a GET request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Starts a PUT request.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Starts a DELETE request.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        let mut builder = TestRequestBuilder::new(method, uri);
        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        TestClientRequest {
            client: self,
            builder,
        }
    }

    /// Sends a built request.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::BodyRead`] if the response body fails.
    pub async fn send(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        self.target.dispatch(request.into_http()).await
    }
}

impl From<HttpService> for TestClient {
    fn from(service: HttpService) -> Self {
        Self::new(service)
    }
}

impl From<axum::Router> for TestClient {
    fn from(app: axum::Router) -> Self {
        Self::new(app)
    }
}

impl std::fmt::Debug for TestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestClient")
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

/// A request being built against a [`TestClient`].
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl TestClientRequest<'_> {
    /// Sets a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets the `Content-Type` header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.builder = self.builder.content_type(content_type);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sets a form body.
    pub fn form<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.builder = self.builder.form(value);
        self
    }

    /// Builds and sends the request.
    ///
    /// # Errors
    ///
    /// Returns a [`TestError`] if the request cannot be built or the
    /// response body cannot be read.
    pub async fn send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        self.client.send(request).await
    }
}
