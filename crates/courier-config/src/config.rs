//! The root configuration type.

use http::HeaderName;
use serde::{Deserialize, Serialize};

use courier_core::{ForwardMessages, RouterOptions};
use courier_telemetry::{LogConfig, LogFormat, TelemetryConfig};

use crate::{ConfigError, ForwardSection, LoggingSection, MetricsSection, RouterSection};

/// Complete Courier configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and the
/// environment.
///
/// ```
/// use courier_config::CourierConfig;
///
/// let config = CourierConfig::default();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.router_options().unwrap().max_body_bytes, 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct CourierConfig {
    /// Router options.
    #[serde(default)]
    pub router: RouterSection,

    /// Forwarder messages.
    #[serde(default)]
    pub forward: ForwardSection,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingSection,

    /// Metrics.
    #[serde(default)]
    pub metrics: MetricsSection,
}

impl CourierConfig {
    /// Debug-level pretty logging.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LoggingSection {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                file_line_info: true,
                ..LoggingSection::default()
            },
            ..Self::default()
        }
    }

    /// Validates cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.request_id_header()?;

        if self.router.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "router.max_body_bytes",
                "must be greater than zero",
            ));
        }

        if self.forward.internal_message.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "forward.internal_message",
                "must not be empty",
            ));
        }

        if self.forward.invalid_arguments_message.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "forward.invalid_arguments_message",
                "must not be empty",
            ));
        }

        if self.logging.enabled {
            courier_telemetry::logging::create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// Builds the router options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the header name is invalid.
    pub fn router_options(&self) -> Result<RouterOptions, ConfigError> {
        Ok(RouterOptions {
            request_id_header: self.request_id_header()?,
            max_body_bytes: self.router.max_body_bytes,
        })
    }

    /// Builds the forwarder messages.
    pub fn forward_messages(&self) -> ForwardMessages {
        ForwardMessages {
            internal: self.forward.internal_message.clone(),
            invalid_arguments: self.forward.invalid_arguments_message.clone(),
        }
    }

    /// Builds the logging settings.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.logging.enabled,
            level: self.logging.level.clone(),
            format: self.logging.format,
            file_line_info: self.logging.file_line_info,
            ..LogConfig::default()
        }
    }

    /// Builds the telemetry settings.
    pub fn telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig {
            logging: self.log_config(),
            metrics_enabled: self.metrics.enabled,
        }
    }

    fn request_id_header(&self) -> Result<HeaderName, ConfigError> {
        HeaderName::from_bytes(self.router.request_id_header.as_bytes()).map_err(|e| {
            ConfigError::invalid_value(
                "router.request_id_header",
                format!("'{}': {e}", self.router.request_id_header),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = CourierConfig::default();
        config.validate().unwrap();
        assert_eq!(config.forward_messages(), ForwardMessages::default());
        assert_eq!(
            config.router_options().unwrap().request_id_header.as_str(),
            "request-id"
        );
    }

    #[test]
    fn test_header_is_normalized() {
        let mut config = CourierConfig::default();
        config.router.request_id_header = "X-Request-ID".to_string();
        assert_eq!(
            config.router_options().unwrap().request_id_header.as_str(),
            "x-request-id"
        );
    }

    #[test]
    fn test_validation_failures() {
        let mut config = CourierConfig::default();
        config.router.request_id_header = "bad header".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "router.request_id_header"
        ));

        let mut config = CourierConfig::default();
        config.router.max_body_bytes = 0;
        assert!(config.validate().is_err());

        let mut config = CourierConfig::default();
        config.forward.internal_message = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = CourierConfig::default();
        config.logging.level = "courier=loud".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "logging.level"
        ));
    }

    #[test]
    fn test_development_preset() {
        let config = CourierConfig::development();
        let log = config.log_config();
        assert_eq!(log.level, "debug");
        assert_eq!(log.format, LogFormat::Pretty);
        assert!(config.telemetry_config().metrics_enabled);
    }
}
