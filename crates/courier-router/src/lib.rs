//! Radix tree router for Courier.
//!
//! Maps path patterns and methods to values of any type. The native adapter
//! stores route indices in it; the tree itself knows nothing about handlers.
//!
//! # Pattern syntax
//!
//! - `/users` matches literally
//! - `/users/{id}` captures one segment as `id`
//! - `/files/{*path}` captures the rest of the path as `path`
//!
//! # Example
//!
//! ```rust
//! use courier_router::{Match, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.insert("/users", Some(Method::GET), "list").unwrap();
//! router.insert("/users/{id}", Some(Method::DELETE), "delete").unwrap();
//!
//! assert!(matches!(router.at(&Method::GET, "/users"), Match::Found { value: &"list", .. }));
//! ```
//!
//! # Architecture
//!
//! ```text
//!                    (root)
//!                      │
//!              ┌───────┴───────┐
//!              │               │
//!            "users"        "files"
//!              │               │
//!        ┌─────┴─────┐     "{*path}"
//!        │           │
//!     (leaf)       "{id}"
//!   [GET,POST]       │
//!                 (leaf)
//!              [GET,DELETE]
//! ```

mod method_router;
mod node;
mod params;
mod router;

use http::Method;

pub use method_router::MethodRouter;
pub use node::{Node, SegmentKind};
pub use params::Params;
pub use router::{Match, Router};

/// Errors raised while inserting a route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InsertError {
    /// The path already has a value for this method (`None`: any method).
    #[error(
        "a handler is already registered for {}",
        .method.as_ref().map_or("any method", Method::as_str)
    )]
    Conflict {
        /// The conflicting method.
        method: Option<Method>,
    },

    /// A catch-all segment is followed by more segments.
    #[error("a catch-all must be the last segment")]
    CatchAllNotLast,

    /// A parameter and a catch-all would share one position.
    #[error("{new} conflicts with wildcard {existing} at the same position")]
    WildcardConflict {
        /// The wildcard segment already in the tree.
        existing: String,
        /// The segment being inserted.
        new: String,
    },

    /// Two patterns name the parameter at the same position differently.
    #[error("parameter {new} conflicts with existing {existing}")]
    ParamName {
        /// The segment already in the tree.
        existing: String,
        /// The segment being inserted.
        new: String,
    },
}
