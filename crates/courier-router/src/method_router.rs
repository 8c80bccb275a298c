//! Per-path method tables.

use http::Method;

use crate::InsertError;

/// Maps HTTP methods to values for a single path.
///
/// A path may also carry an "any method" value, used for every method that
/// has no value of its own.
///
/// # Example
///
/// ```rust
/// use courier_router::MethodRouter;
/// use http::Method;
///
/// let mut methods = MethodRouter::new();
/// methods.insert(Some(Method::GET), "list").unwrap();
/// methods.insert(Some(Method::POST), "create").unwrap();
///
/// assert_eq!(methods.get(&Method::GET), Some(&"list"));
/// assert_eq!(methods.get(&Method::DELETE), None);
/// assert!(methods.insert(Some(Method::GET), "again").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    methods: Vec<(Method, T)>,
    any: Option<T>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            methods: Vec::new(),
            any: None,
        }
    }
}

impl<T> MethodRouter<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value` for `method`, or for any method when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`InsertError::Conflict`] if the slot is already taken.
    pub fn insert(&mut self, method: Option<Method>, value: T) -> Result<(), InsertError> {
        match method {
            None if self.any.is_some() => Err(InsertError::Conflict { method: None }),
            None => {
                self.any = Some(value);
                Ok(())
            }
            Some(method) if self.methods.iter().any(|(m, _)| *m == method) => {
                Err(InsertError::Conflict {
                    method: Some(method),
                })
            }
            Some(method) => {
                self.methods.push((method, value));
                Ok(())
            }
        }
    }

    /// Returns the value for `method`, falling back to the any-method value.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&T> {
        self.methods
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, v)| v)
            .or(self.any.as_ref())
    }

    /// Returns true if a value exists for every method.
    #[must_use]
    pub fn accepts_any(&self) -> bool {
        self.any.is_some()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty() && self.any.is_none()
    }

    /// Returns the explicitly registered methods, in registration order.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.methods.iter().map(|(m, _)| m.clone()).collect()
    }

    /// Returns the `Allow` header value for this path.
    #[must_use]
    pub fn allow_header(&self) -> String {
        self.methods
            .iter()
            .map(|(m, _)| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut router = MethodRouter::new();
        router.insert(Some(Method::GET), 1).unwrap();
        router.insert(Some(Method::DELETE), 2).unwrap();

        assert_eq!(router.get(&Method::GET), Some(&1));
        assert_eq!(router.get(&Method::DELETE), Some(&2));
        assert_eq!(router.get(&Method::POST), None);
        assert!(!router.accepts_any());
    }

    #[test]
    fn test_any_method_fallback() {
        let mut router = MethodRouter::new();
        router.insert(None, "any").unwrap();
        router.insert(Some(Method::GET), "get").unwrap();

        assert_eq!(router.get(&Method::GET), Some(&"get"));
        assert_eq!(router.get(&Method::PATCH), Some(&"any"));
        assert!(router.accepts_any());
    }

    #[test]
    fn test_conflicts() {
        let mut router = MethodRouter::new();
        router.insert(Some(Method::GET), ()).unwrap();
        router.insert(None, ()).unwrap();

        assert_eq!(
            router.insert(Some(Method::GET), ()),
            Err(InsertError::Conflict {
                method: Some(Method::GET)
            })
        );
        assert_eq!(
            router.insert(None, ()),
            Err(InsertError::Conflict { method: None })
        );
    }

    #[test]
    fn test_allowed_methods() {
        let mut router = MethodRouter::new();
        assert!(router.is_empty());
        router.insert(Some(Method::GET), ()).unwrap();
        router.insert(Some(Method::POST), ()).unwrap();

        assert_eq!(router.allowed_methods(), vec![Method::GET, Method::POST]);
        assert_eq!(router.allow_header(), "GET, POST");
    }
}
