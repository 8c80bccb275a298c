//! # Courier Axum
//!
//! Runs the Courier request pipeline inside an [`axum::Router`].
//!
//! [`AxumRouter`] implements the [`courier_core::Router`] contract. Prepared
//! routes are registered as axum method routes, so axum does the matching
//! while Courier owns the request id, the per-request logger and validator,
//! and the handler chain. Call [`AxumRouter::into_axum`] to get a plain
//! `axum::Router` that can be merged, layered and served like any other.
//!
//! Courier checks route shapes and method conflicts itself before handing a
//! route to axum, so a bad registration is reported by
//! [`courier_core::Entry::prepare`] instead of panicking inside axum.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod actor;
mod router;

pub use actor::AxumActor;
pub use router::{AxumEntry, AxumRouter};
