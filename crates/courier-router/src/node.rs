//! Radix tree nodes.

use http::Method;

use crate::method_router::MethodRouter;
use crate::params::Params;
use crate::InsertError;

/// Kind of a path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Literal segment (`users`).
    Static,
    /// Captures one segment (`{id}`).
    Param(String),
    /// Captures the rest of the path (`{*path}`).
    CatchAll(String),
}

/// A node in the radix tree.
///
/// Children are tried static first, then parameter, then catch-all. A node
/// holds a parameter child or a catch-all child, never both.
#[derive(Debug, Clone)]
pub struct Node<T> {
    segment: String,
    kind: SegmentKind,
    methods: Option<MethodRouter<T>>,
    static_children: Vec<Node<T>>,
    param_child: Option<Box<Node<T>>>,
    catch_all_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn new(segment: impl Into<String>, kind: SegmentKind) -> Self {
        Self {
            segment: segment.into(),
            kind,
            methods: None,
            static_children: Vec::new(),
            param_child: None,
            catch_all_child: None,
        }
    }

    /// Creates the root node.
    #[must_use]
    pub fn root() -> Self {
        Self::new("", SegmentKind::Static)
    }

    /// Returns the segment text of this node.
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// Returns the kind of this node.
    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    /// Registers `value` for `method` at `path`.
    ///
    /// # Errors
    ///
    /// Returns an [`InsertError`] if the slot is taken, a catch-all is not
    /// the last segment, a parameter is renamed at the same position, or a
    /// parameter and a catch-all would be siblings.
    pub fn insert(
        &mut self,
        path: &str,
        method: Option<Method>,
        value: T,
    ) -> Result<(), InsertError> {
        let segments = parse_path(path);
        self.insert_segments(&segments, method, value)
    }

    fn insert_segments(
        &mut self,
        segments: &[(&str, SegmentKind)],
        method: Option<Method>,
        value: T,
    ) -> Result<(), InsertError> {
        let Some(((segment, kind), remaining)) = segments.split_first() else {
            return self
                .methods
                .get_or_insert_with(MethodRouter::new)
                .insert(method, value);
        };

        match kind {
            SegmentKind::Static => {
                let index = match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment))
                {
                    Ok(index) => index,
                    Err(index) => {
                        self.static_children
                            .insert(index, Node::new(*segment, SegmentKind::Static));
                        index
                    }
                };
                self.static_children[index].insert_segments(remaining, method, value)
            }
            SegmentKind::Param(_) => {
                if let Some(catch_all) = &self.catch_all_child {
                    return Err(InsertError::WildcardConflict {
                        existing: catch_all.segment.clone(),
                        new: (*segment).to_string(),
                    });
                }
                let child = self
                    .param_child
                    .get_or_insert_with(|| Box::new(Node::new(*segment, kind.clone())));
                if child.kind != *kind {
                    return Err(InsertError::ParamName {
                        existing: child.segment.clone(),
                        new: (*segment).to_string(),
                    });
                }
                child.insert_segments(remaining, method, value)
            }
            SegmentKind::CatchAll(_) => {
                if !remaining.is_empty() {
                    return Err(InsertError::CatchAllNotLast);
                }
                if let Some(param) = &self.param_child {
                    return Err(InsertError::WildcardConflict {
                        existing: param.segment.clone(),
                        new: (*segment).to_string(),
                    });
                }
                let child = self
                    .catch_all_child
                    .get_or_insert_with(|| Box::new(Node::new(*segment, kind.clone())));
                if child.kind != *kind {
                    return Err(InsertError::ParamName {
                        existing: child.segment.clone(),
                        new: (*segment).to_string(),
                    });
                }
                child.insert_segments(&[], method, value)
            }
        }
    }

    /// Finds the method table for `path` and captures its parameters.
    ///
    /// Matching is exact: an empty segment (`/users/`, `/users//7`) matches
    /// neither a static nor a parameter segment, and a catch-all never
    /// captures an empty rest.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Params)> {
        let segments: Vec<&str> = match path {
            "" | "/" => Vec::new(),
            _ => path.strip_prefix('/').unwrap_or(path).split('/').collect(),
        };
        let mut params = Params::new();
        let methods = self.match_segments(&segments, &mut params)?;
        Some((methods, params))
    }

    fn match_segments<'a>(
        &'a self,
        segments: &[&str],
        params: &mut Params,
    ) -> Option<&'a MethodRouter<T>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.methods.as_ref().filter(|m| !m.is_empty());
        };

        if let Some(child) = self.find_static_child(segment) {
            if let Some(found) = child.match_segments(remaining, params) {
                return Some(found);
            }
        }

        if let Some(child) = self.param_child.as_ref().filter(|_| !segment.is_empty()) {
            if let SegmentKind::Param(name) = &child.kind {
                let mark = params.len();
                params.push(name.clone(), *segment);
                if let Some(found) = child.match_segments(remaining, params) {
                    return Some(found);
                }
                params.truncate(mark);
            }
        }

        if let Some(child) = &self.catch_all_child {
            let rest = segments.join("/");
            match &child.kind {
                SegmentKind::CatchAll(name) if !rest.is_empty() => {
                    let mark = params.len();
                    params.push(name.clone(), rest);
                    if let Some(found) = child.methods.as_ref() {
                        return Some(found);
                    }
                    params.truncate(mark);
                }
                _ => {}
            }
        }

        None
    }

    fn find_static_child(&self, segment: &str) -> Option<&Node<T>> {
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }
}

/// Splits a pattern into typed segments.
fn parse_path(path: &str) -> Vec<(&str, SegmentKind)> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(inner) => match inner.strip_prefix('*') {
                Some(name) => (s, SegmentKind::CatchAll(name.to_string())),
                None => (s, SegmentKind::Param(inner.to_string())),
            },
            None => (s, SegmentKind::Static),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(routes: &[(&str, &'static str)]) -> Node<&'static str> {
        let mut root = Node::root();
        for (path, value) in routes {
            root.insert(path, Some(Method::GET), *value).unwrap();
        }
        root
    }

    fn get<'a>(root: &'a Node<&'static str>, path: &str) -> Option<(&'a str, Params)> {
        let (methods, params) = root.match_path(path)?;
        methods.get(&Method::GET).map(|v| (*v, params))
    }

    #[test]
    fn test_parse_path() {
        let segments = parse_path("/files/{id}/{*rest}");
        assert_eq!(
            segments,
            vec![
                ("files", SegmentKind::Static),
                ("{id}", SegmentKind::Param("id".to_string())),
                ("{*rest}", SegmentKind::CatchAll("rest".to_string())),
            ]
        );
    }

    #[test]
    fn test_static_and_param() {
        let root = tree(&[("/users", "list"), ("/users/{id}", "get")]);

        assert_eq!(get(&root, "/users").map(|m| m.0), Some("list"));
        let (value, params) = get(&root, "/users/123").unwrap();
        assert_eq!(value, "get");
        assert_eq!(params.get("id"), Some("123"));
    }

    #[test]
    fn test_static_priority_over_param() {
        let root = tree(&[("/users/me", "me"), ("/users/{id}", "get")]);

        assert_eq!(get(&root, "/users/me").map(|m| m.0), Some("me"));
        assert_eq!(get(&root, "/users/42").map(|m| m.0), Some("get"));
    }

    #[test]
    fn test_catch_all() {
        let root = tree(&[("/files/{*path}", "file")]);

        let (value, params) = get(&root, "/files/images/logo.png").unwrap();
        assert_eq!(value, "file");
        assert_eq!(params.get("path"), Some("images/logo.png"));
        assert!(get(&root, "/files").is_none());
    }

    #[test]
    fn test_backtracking_drops_stale_params() {
        let root = tree(&[("/a/s/{y}/z", "static-branch"), ("/a/{x}/k/w", "param-branch")]);

        let (value, params) = get(&root, "/a/s/k/w").unwrap();
        assert_eq!(value, "param-branch");
        assert_eq!(params.get("y"), None);
        assert_eq!(params.get("x"), Some("s"));
    }

    #[test]
    fn test_static_and_catch_all_share_a_position() {
        let root = tree(&[("/files/readme", "readme"), ("/files/{*path}", "file")]);

        assert_eq!(get(&root, "/files/readme").map(|m| m.0), Some("readme"));
        let (value, params) = get(&root, "/files/readme/v2").unwrap();
        assert_eq!(value, "file");
        assert_eq!(params.get("path"), Some("readme/v2"));
    }

    #[test]
    fn test_param_and_catch_all_cannot_be_siblings() {
        let mut root = Node::root();
        root.insert("/a/{name}/b", Some(Method::GET), 1).unwrap();
        let err = root.insert("/a/{*rest}", Some(Method::GET), 2).unwrap_err();
        assert_eq!(
            err,
            InsertError::WildcardConflict {
                existing: "{name}".to_string(),
                new: "{*rest}".to_string(),
            }
        );

        let mut root = Node::root();
        root.insert("/a/{*rest}", None, 1).unwrap();
        let err = root.insert("/a/{name}", None, 2).unwrap_err();
        assert!(matches!(err, InsertError::WildcardConflict { .. }));
    }

    #[test]
    fn test_intermediate_node_is_not_a_route() {
        let root = tree(&[("/api/v1/users", "users")]);
        assert!(root.match_path("/api/v1").is_none());
        assert!(root.match_path("/api").is_none());
    }

    #[test]
    fn test_param_rename_is_rejected() {
        let mut root = Node::root();
        root.insert("/users/{id}", Some(Method::GET), 1).unwrap();
        let err = root.insert("/users/{user}/posts", Some(Method::GET), 2).unwrap_err();
        assert!(matches!(err, InsertError::ParamName { .. }));
    }

    #[test]
    fn test_catch_all_must_be_last() {
        let mut root = Node::root();
        let err = root.insert("/x/{*rest}/y", None, 1).unwrap_err();
        assert_eq!(err, InsertError::CatchAllNotLast);
    }

    #[test]
    fn test_empty_segments_do_not_match() {
        let root = tree(&[("/users", "list"), ("/users/{id}", "get"), ("/files/{*path}", "file")]);

        assert!(get(&root, "/users/").is_none());
        assert!(get(&root, "/users//7").is_none());
        assert!(get(&root, "/files/").is_none());
        let (_, params) = get(&root, "/files/a//b/").unwrap();
        assert_eq!(params.get("path"), Some("a//b/"));
    }

    #[test]
    fn test_root_path() {
        let root = tree(&[("/", "root")]);
        assert_eq!(get(&root, "/").map(|m| m.0), Some("root"));
    }
}
