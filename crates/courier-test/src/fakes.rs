//! Fake validators.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;

use courier_core::{Logger, Rule, ValidationError, Validator, ValidatorFactory};

/// Rejects every value with fixed violations.
#[derive(Debug, Clone)]
pub struct RejectingValidator {
    violations: Vec<String>,
}

impl RejectingValidator {
    /// Creates a validator failing with `violations`.
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

impl Validator for RejectingValidator {
    fn validate(&self, _data: &dyn Any, _rules: &[Rule]) -> Result<(), ValidationError> {
        Err(ValidationError::new(self.violations.clone()))
    }
}

impl ValidatorFactory for RejectingValidator {
    fn create(&self, _logger: &Logger) -> Box<dyn Validator> {
        Box::new(self.clone())
    }
}

/// One recorded validation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationCall {
    /// The request id from the logger the validator was built with.
    pub request_id: Option<String>,
    /// Number of rules passed.
    pub rules: usize,
}

/// Accepts everything and records each call.
///
/// Clones share the same record, so keep one clone in the test and hand
/// another to the router.
#[derive(Debug, Clone, Default)]
pub struct RecordingValidator {
    calls: Arc<Mutex<Vec<ValidationCall>>>,
    request_id: Option<String>,
}

impl RecordingValidator {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the calls made so far.
    pub fn calls(&self) -> Vec<ValidationCall> {
        self.calls.lock().clone()
    }
}

impl Validator for RecordingValidator {
    fn validate(&self, _data: &dyn Any, rules: &[Rule]) -> Result<(), ValidationError> {
        self.calls.lock().push(ValidationCall {
            request_id: self.request_id.clone(),
            rules: rules.len(),
        });
        Ok(())
    }
}

impl ValidatorFactory for RecordingValidator {
    fn create(&self, logger: &Logger) -> Box<dyn Validator> {
        Box::new(Self {
            calls: Arc::clone(&self.calls),
            request_id: logger.request_id().map(|id| id.as_str().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::RequestId;

    #[test]
    fn test_rejecting() {
        let validator = RejectingValidator::new(["name is required"]);
        let err = validator.validate(&(), &[]).unwrap_err();
        assert_eq!(err.violations, ["name is required"]);
    }

    #[test]
    fn test_recording_shares_calls_across_requests() {
        let recorder = RecordingValidator::new();
        let logger = Logger::new().for_request(&http::Method::GET, "/", &RequestId::from("r-1"));

        let per_request = recorder.create(&logger);
        per_request.validate(&1_u8, &[Rule::new(1), Rule::new(2)]).unwrap();

        assert_eq!(
            recorder.calls(),
            [ValidationCall {
                request_id: Some("r-1".to_string()),
                rules: 2
            }]
        );
    }
}
