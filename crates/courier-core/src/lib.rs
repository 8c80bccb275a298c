//! # Courier Core
//!
//! Transport-independent contracts of the Courier request pipeline.
//!
//! This crate defines what a request handler sees and how failures reach the
//! client. It contains no HTTP server; adapter crates implement [`Actor`] and
//! [`Router`] on top of a concrete stack (`courier-hyper`, `courier-axum`).
//!
//! ## Components
//!
//! - [`tag`]: errors decorated with machine codes
//! - [`response`]: the `{code, data}` envelope and error classification
//! - [`request_id`]: `Request-Id` propagation
//! - [`actor`]: the per-request facade handlers receive
//! - [`router`]: route registration, middleware and groups
//! - [`forward`]: the bind, validate, call pipeline
//!
//! ## Example
//!
//! ```
//! use courier_core::{handler, forward::forward, ActorExt, response};
//! use http::StatusCode;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Greet {
//!     name: String,
//! }
//!
//! let greet = handler(|actor| {
//!     Box::pin(async move {
//!         let result = forward(actor, |req: Greet| async move {
//!             Ok::<_, std::io::Error>(format!("hello, {}", req.name))
//!         }, &[])
//!         .await;
//!         if let Ok(text) = result {
//!             let _ = actor.write(StatusCode::OK, &response::ok(text));
//!         }
//!     })
//! });
//! # drop(greet);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod actor;
pub mod bind;
pub mod chain;
pub mod factory;
pub mod forward;
pub mod logger;
pub mod path;
pub mod request_id;
pub mod response;
pub mod router;
pub mod state;
pub mod tag;
pub mod validate;

pub use actor::{Actor, ActorExt, WriteError, JSON_CONTENT_TYPE};
pub use bind::BindError;
pub use chain::{handler, BoxFuture, Chain, HandleFunc};
pub use factory::{RequestFactory, RequestSeed, RouterOptions};
pub use forward::{DownstreamError, ForwardError, ForwardMessages, Forwarder, RemoteError};
pub use logger::Logger;
pub use request_id::{RequestId, REQUEST_ID_HEADER};
pub use response::ResponseBody;
pub use router::{Entry, PreparedRoute, RouteError, Router, Scope};
pub use state::State;
pub use tag::{BoxError, Tag, TaggedError};
pub use validate::{PermissiveValidator, Rule, ValidationError, Validator, ValidatorFactory};
