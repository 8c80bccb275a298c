//! # Courier Hyper
//!
//! The native Courier adapter, built directly on `http` and `hyper` types.
//!
//! [`HttpRouter`] implements the [`courier_core::Router`] contract over a
//! radix tree; [`HttpRouter::into_service`] freezes the routes into an
//! [`HttpService`], which is a `hyper::service::Service` and can be handed to
//! any hyper connection builder.
//!
//! Per request the service:
//!
//! 1. matches the path and method (`404`/`405` when nothing fits)
//! 2. resolves the request id and builds the request logger and validator
//! 3. buffers the body up to `max_body_bytes` (`413` beyond it)
//! 4. runs the composed handler chain on an [`HttpActor`]

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod actor;
mod router;
mod service;

pub use actor::{HttpActor, HttpResponse};
pub use router::{HttpEntry, HttpRouter};
pub use service::HttpService;
