//! Request-scoped state.

use std::any::Any;
use std::collections::HashMap;

/// A string-keyed bag of values shared by the handlers of one request.
///
/// Last write wins. The bag lives exactly as long as the request, so it needs
/// no locking.
#[derive(Default)]
pub struct State {
    values: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl State {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    /// Returns the value under `key` if it exists and is a `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.downcast_ref()
    }

    /// Returns the raw value under `key`.
    pub fn get_any(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.values.get(key).map(AsRef::as_ref)
    }

    /// Removes and returns the value under `key` if it is a `T`.
    pub fn remove<T: Any>(&mut self, key: &str) -> Option<T> {
        let value = self.values.remove(key)?;
        value.downcast().ok().map(|b: Box<T>| *b)
    }

    /// Returns true if `key` is set.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut state = State::new();
        state.insert("user", "alice".to_string());
        state.insert("user", "bob".to_string());
        assert_eq!(state.get::<String>("user").map(String::as_str), Some("bob"));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_type_mismatch_is_none() {
        let mut state = State::new();
        state.insert("count", 3_u32);
        assert!(state.get::<String>("count").is_none());
        assert_eq!(state.get::<u32>("count"), Some(&3));
        assert!(state.get_any("count").is_some());
    }

    #[test]
    fn test_remove() {
        let mut state = State::new();
        state.insert("k", 1_i64);
        assert_eq!(state.remove::<i64>("k"), Some(1));
        assert!(!state.contains("k"));
        assert!(state.is_empty());
    }
}
