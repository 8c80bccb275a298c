//! The validation seam.
//!
//! Courier does not interpret validation rules. A [`Rule`] is an opaque handle
//! that travels from the handler to whatever [`Validator`] the router was
//! configured with; only the validator knows how to read it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::logger::Logger;

/// An opaque validation rule.
#[derive(Clone)]
pub struct Rule(Arc<dyn Any + Send + Sync>);

impl Rule {
    /// Wraps a validator-specific rule value.
    pub fn new<R: Any + Send + Sync>(rule: R) -> Self {
        Self(Arc::new(rule))
    }

    /// Returns the rule as `R` if that is what it holds.
    pub fn downcast_ref<R: Any>(&self) -> Option<&R> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Rule").finish_non_exhaustive()
    }
}

/// Returned when data violates one or more rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", violations.join("; "))]
pub struct ValidationError {
    /// One entry per violated rule.
    pub violations: Vec<String>,
}

impl ValidationError {
    /// Creates an error from a list of violations.
    pub fn new<I, S>(violations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            violations: violations.into_iter().map(Into::into).collect(),
        }
    }
}

/// Checks request data against rules.
pub trait Validator: Send + Sync {
    /// Validates `data` against `rules`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every violated rule.
    fn validate(&self, data: &dyn Any, rules: &[Rule]) -> Result<(), ValidationError>;
}

/// Builds one validator per request.
pub trait ValidatorFactory: Send + Sync {
    /// Creates the validator for a request whose logger is `logger`.
    fn create(&self, logger: &Logger) -> Box<dyn Validator>;
}

impl<F> ValidatorFactory for F
where
    F: Fn(&Logger) -> Box<dyn Validator> + Send + Sync,
{
    fn create(&self, logger: &Logger) -> Box<dyn Validator> {
        self(logger)
    }
}

/// A validator that accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveValidator;

impl Validator for PermissiveValidator {
    fn validate(&self, _data: &dyn Any, _rules: &[Rule]) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl ValidatorFactory for PermissiveValidator {
    fn create(&self, _logger: &Logger) -> Box<dyn Validator> {
        Box::new(Self)
    }
}
