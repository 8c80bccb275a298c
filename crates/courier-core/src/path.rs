//! Route pattern handling.
//!
//! Patterns start with `/`. A segment `{name}` captures one path segment and
//! `{*name}` captures the rest of the path; a catch-all must be the last
//! segment. Colon and star prefixes (`:id`, `*rest`) are rejected so that every
//! adapter sees one syntax.

use crate::router::RouteError;

/// Joins a group prefix and a route path.
///
/// Trailing slashes are dropped except on the root path.
pub fn join(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    let joined = format!("{prefix}/{path}");
    if joined.len() > 1 {
        joined.trim_end_matches('/').to_string()
    } else {
        joined
    }
}

/// Checks a full route pattern.
///
/// # Errors
///
/// Returns [`RouteError::InvalidPath`] describing the first problem found.
pub fn validate(pattern: &str) -> Result<(), RouteError> {
    let invalid = |reason: &str| RouteError::InvalidPath {
        path: pattern.to_string(),
        reason: reason.to_string(),
    };

    if !pattern.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }
    if pattern.contains("//") {
        return Err(invalid("empty segment"));
    }

    let segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let last = segments.len().saturating_sub(1);
    let mut names: Vec<&str> = Vec::new();

    for (i, segment) in segments.iter().enumerate() {
        if segment.starts_with(':') || segment.starts_with('*') {
            return Err(invalid("use {name} or {*name} for parameters"));
        }

        let Some(inner) = segment.strip_prefix('{') else {
            if segment.contains(['{', '}']) {
                return Err(invalid("a parameter must span a whole segment"));
            }
            continue;
        };
        let Some(inner) = inner.strip_suffix('}') else {
            return Err(invalid("unclosed '{'"));
        };

        let (name, catch_all) = match inner.strip_prefix('*') {
            Some(name) => (name, true),
            None => (inner, false),
        };
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid("parameter names are alphanumeric"));
        }
        if catch_all && i != last {
            return Err(invalid("a catch-all must be the last segment"));
        }
        if names.contains(&name) {
            return Err(invalid("duplicate parameter name"));
        }
        names.push(name);
    }

    Ok(())
}
