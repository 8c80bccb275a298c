//! Typed configuration for Courier.
//!
//! - TOML and JSON files
//! - `COURIER__SECTION__KEY` environment overrides, optionally from `.env`
//! - unknown fields are rejected
//! - layered: defaults, then file, then environment
//!
//! # Configuration File Format
//!
//! ```toml
//! [router]
//! request_id_header = "request-id"
//! max_body_bytes = 1048576
//!
//! [forward]
//! internal_message = "internal server error, please try again"
//! invalid_arguments_message = "argument can't be verified"
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//!
//! [metrics]
//! enabled = true
//! ```
//!
//! The loaded [`CourierConfig`] converts into the pieces the rest of the
//! workspace takes: [`CourierConfig::router_options`],
//! [`CourierConfig::forward_messages`] and [`CourierConfig::telemetry_config`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::CourierConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{ForwardSection, LoggingSection, MetricsSection, RouterSection};
