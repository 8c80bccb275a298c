//! # Courier Test
//!
//! In-memory testing for Courier routers. No sockets are opened: requests go
//! straight into an [`courier_hyper::HttpService`] or an `axum::Router`, so
//! the same test can run against both adapters.
//!
//! ```ignore
//! use courier_test::{TestClient, RecordingValidator};
//!
//! let client = TestClient::from(router.into_service());
//! client
//!     .post("/users")
//!     .json(&serde_json::json!({"name": "ada"}))
//!     .send()
//!     .await?
//!     .assert_status(StatusCode::OK);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod error;
mod fakes;
mod request;
mod response;

pub use client::{Dispatch, DispatchResult, TestClient, TestClientRequest};
pub use error::TestError;
pub use fakes::{RecordingValidator, RejectingValidator, ValidationCall};
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
