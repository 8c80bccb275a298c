//! Error tagging.
//!
//! A [`TaggedError`] decorates an error with an ordered list of machine codes
//! ("tags"). Tags are attached once, close to where a failure is classified,
//! and read back at the HTTP boundary by the response encoder.
//!
//! Chains are plain [`std::error::Error::source`] chains: a tagged error
//! reports its inner error as its source, so tagged and untagged errors can be
//! nested freely.
//!
//! # Example
//!
//! ```
//! use courier_core::tag::{originating_tagged, Tag, TaggedError};
//!
//! let err = TaggedError::new("user 42 is locked", ["account-locked"]);
//! let found = originating_tagged(&err).unwrap();
//! assert_eq!(found.code(), Some("account-locked"));
//! assert_eq!(found.inner().to_string(), "user 42 is locked");
//!
//! let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
//! let tagged = io.tag("storage");
//! assert_eq!(tagged.tags(), ["storage"]);
//! ```

use std::error::Error as StdError;
use std::fmt;

/// An opaque, thread-safe error.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A plain message error.
///
/// Used as the inner error of [`TaggedError::new`] and wherever a failure is
/// only a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message(String);

impl Message {
    /// Creates a message error.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Returns the message text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for Message {}

/// An error decorated with ordered tags.
///
/// `Display` prints the inner error unchanged; tags are metadata, not text.
#[derive(Debug)]
pub struct TaggedError {
    tags: Vec<String>,
    inner: BoxError,
}

impl TaggedError {
    /// Creates a tagged error over a plain message.
    pub fn new<I, S>(message: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::wrap(Message::new(message), tags)
    }

    /// Tags an existing error.
    pub fn wrap<E, I, S>(inner: E, tags: I) -> Self
    where
        E: Into<BoxError>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            inner: inner.into(),
        }
    }

    /// Returns the tags in the order they were attached.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns the first tag, which is the authoritative classification.
    pub fn code(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }

    /// Returns the wrapped error.
    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    /// Consumes the tagged error and returns the wrapped error.
    pub fn into_inner(self) -> BoxError {
        self.inner
    }
}

impl fmt::Display for TaggedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for TaggedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.inner.as_ref())
    }
}

/// Extension trait for attaching tags.
pub trait Tag {
    /// The tagged form of `Self`.
    type Output;

    /// Attaches a single tag.
    fn tag(self, tag: impl Into<String>) -> Self::Output;
}

impl<E> Tag for E
where
    E: StdError + Send + Sync + 'static,
{
    type Output = TaggedError;

    fn tag(self, tag: impl Into<String>) -> TaggedError {
        TaggedError::wrap(self, [tag.into()])
    }
}

/// Tags the error side of a result.
pub trait TagResult<T> {
    /// Attaches a single tag to the error, if any.
    fn tag_err(self, tag: impl Into<String>) -> Result<T, TaggedError>;
}

impl<T, E> TagResult<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    fn tag_err(self, tag: impl Into<String>) -> Result<T, TaggedError> {
        self.map_err(|e| TaggedError::wrap(e, [tag.into()]))
    }
}

/// Walks the source chain and returns the deepest error carrying a tag.
///
/// Returns `None` when no error in the chain is tagged.
pub fn originating_tagged<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a TaggedError> {
    let mut found = None;
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(tagged) = e.downcast_ref::<TaggedError>() {
            if !tagged.tags.is_empty() {
                found = Some(tagged);
            }
        }
        current = e.source();
    }
    found
}
