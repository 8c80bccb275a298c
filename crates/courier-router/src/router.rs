//! The route table.

use http::Method;

use crate::method_router::MethodRouter;
use crate::node::Node;
use crate::params::Params;
use crate::InsertError;

/// Outcome of looking up a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match<'a, T> {
    /// A value is registered for the path and method.
    Found {
        /// The registered value.
        value: &'a T,
        /// Captured path parameters.
        params: Params,
    },
    /// The path exists but not for this method.
    MethodNotAllowed {
        /// Methods registered for the path.
        allowed: Vec<Method>,
    },
    /// No pattern matches the path.
    NotFound,
}

/// A radix tree route table.
///
/// Lookups cost one step per path segment. When several patterns match, the
/// most specific wins: static segments, then parameters, then catch-alls.
///
/// # Example
///
/// ```rust
/// use courier_router::{Match, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router.insert("/users/{id}", Some(Method::GET), "get-user").unwrap();
/// router.insert("/files/{*path}", None, "files").unwrap();
///
/// match router.at(&Method::GET, "/users/7") {
///     Match::Found { value, params } => {
///         assert_eq!(*value, "get-user");
///         assert_eq!(params.get("id"), Some("7"));
///     }
///     other => panic!("unexpected {other:?}"),
/// }
/// assert!(matches!(router.at(&Method::POST, "/users/7"), Match::MethodNotAllowed { .. }));
/// assert!(matches!(router.at(&Method::GET, "/nope"), Match::NotFound));
/// ```
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    route_count: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Registers `value` at `path` for `method`, or for any method when
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns an [`InsertError`] when the slot is taken or the pattern
    /// clashes with an existing one.
    pub fn insert(
        &mut self,
        path: &str,
        method: Option<Method>,
        value: T,
    ) -> Result<(), InsertError> {
        self.root.insert(path, method, value)?;
        self.route_count += 1;
        Ok(())
    }

    /// Looks up `method` and `path`.
    #[must_use]
    pub fn at(&self, method: &Method, path: &str) -> Match<'_, T> {
        let Some((methods, params)) = self.root.match_path(path) else {
            return Match::NotFound;
        };
        match methods.get(method) {
            Some(value) => Match::Found { value, params },
            None => Match::MethodNotAllowed {
                allowed: methods.allowed_methods(),
            },
        }
    }

    /// Looks up `path` regardless of method.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Params)> {
        self.root.match_path(path)
    }

    /// Returns the number of registered (path, method) pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_found_and_params() {
        let mut router = Router::new();
        router
            .insert("/orgs/{org}/users/{user}", Some(Method::GET), 1)
            .unwrap();

        match router.at(&Method::GET, "/orgs/acme/users/9") {
            Match::Found { value, params } => {
                assert_eq!(*value, 1);
                assert_eq!(params.get("org"), Some("acme"));
                assert_eq!(params.get("user"), Some("9"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_method_not_allowed_lists_methods() {
        let mut router = Router::new();
        router.insert("/users", Some(Method::GET), 1).unwrap();
        router.insert("/users", Some(Method::POST), 2).unwrap();

        assert_eq!(
            router.at(&Method::DELETE, "/users"),
            Match::MethodNotAllowed {
                allowed: vec![Method::GET, Method::POST]
            }
        );
        assert_eq!(router.len(), 2);
    }

    #[test]
    fn test_any_method_route() {
        let mut router = Router::new();
        router.insert("/ping", None, "pong").unwrap();

        for method in [Method::GET, Method::POST, Method::OPTIONS] {
            assert!(matches!(router.at(&method, "/ping"), Match::Found { value: &"pong", .. }));
        }
    }

    #[test]
    fn test_duplicate_is_conflict() {
        let mut router = Router::new();
        router.insert("/a/{id}", Some(Method::GET), 1).unwrap();
        let err = router.insert("/a/{id}", Some(Method::GET), 2).unwrap_err();
        assert_eq!(
            err,
            InsertError::Conflict {
                method: Some(Method::GET)
            }
        );
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn test_trailing_slash_is_exact() {
        let mut router = Router::new();
        router.insert("/users/", Some(Method::GET), 1).unwrap();
        assert!(matches!(router.at(&Method::GET, "/users"), Match::Found { .. }));
        assert_eq!(router.at(&Method::GET, "/users/"), Match::NotFound);
    }

    #[test]
    fn test_not_found() {
        let router: Router<()> = Router::new();
        assert!(router.is_empty());
        assert_eq!(router.at(&Method::GET, "/"), Match::NotFound);
    }

    proptest! {
        #[test]
        fn prop_param_captures_any_segment(value in "[A-Za-z0-9_.~-]{1,24}") {
            let mut router = Router::new();
            router.insert("/items/{id}/detail", Some(Method::GET), ()).unwrap();
            let path = format!("/items/{value}/detail");
            match router.at(&Method::GET, &path) {
                Match::Found { params, .. } => {
                    prop_assert_eq!(params.get("id"), Some(value.as_str()));
                }
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }
    }
}
