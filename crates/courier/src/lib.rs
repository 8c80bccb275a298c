//! # Courier
//!
//! **A framework-agnostic HTTP request pipeline.**
//!
//! Handlers are written once against the [`prelude::Actor`] contract and run
//! unchanged on either adapter:
//!
//! - **hyper**: [`hyper::HttpRouter`] serves through a plain `hyper` service
//! - **axum**: [`axum::AxumRouter`] mounts into an `axum::Router`
//!
//! A request flows through the same stages on both:
//!
//! ```text
//! Request → RequestId → Middleware (root first) → Handler
//!                                                   ↓
//!                           bind → validate → downstream call
//!                                                   ↓
//! Response ← {code, data} envelope ←────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! #[derive(serde::Deserialize)]
//! struct GetUser { id: u64 }
//!
//! let mut router = HttpRouter::new();
//! router
//!     .on("/users", [handler(|actor| Box::pin(async move {
//!         if let Ok(user) = forward(actor, |req: GetUser| users.get(req.id), &[]).await {
//!             let _ = actor.write(StatusCode::OK, &response::ok(user));
//!         }
//!     }))])
//!     .prepare(&[Method::GET])?;
//!
//! let service = router.into_service();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export the adapter-independent pipeline
pub use courier_core as core;

// Re-export the path tree
pub use courier_router as router;

// Re-export the hyper adapter
pub use courier_hyper as hyper;

// Re-export the axum adapter
pub use courier_axum as axum;

// Re-export configuration loading
pub use courier_config as config;

// Re-export logging and metrics setup
pub use courier_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    pub use courier_core::{
        forward::forward, handler, response, Actor, ActorExt, BoxError, Entry, ForwardError,
        Forwarder, HandleFunc, RemoteError, RequestFactory, RequestId, RouteError, Router,
        RouterOptions, Rule, Tag, TaggedError, Validator, ValidatorFactory,
    };

    // Re-export adapters
    pub use courier_axum::AxumRouter;
    pub use courier_hyper::{HttpRouter, HttpService};

    // Re-export configuration
    pub use courier_config::{ConfigLoader, CourierConfig};

    // Re-export telemetry setup
    pub use courier_telemetry::{init_telemetry, TelemetryConfig};
}
