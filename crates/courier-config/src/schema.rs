//! Configuration sections.

use serde::{Deserialize, Serialize};

use courier_core::factory::DEFAULT_MAX_BODY_BYTES;
use courier_core::forward::{DEFAULT_INTERNAL_MESSAGE, DEFAULT_INVALID_MESSAGE};
use courier_core::REQUEST_ID_HEADER;
use courier_telemetry::LogFormat;

/// Router section.
///
/// ```
/// use courier_config::RouterSection;
///
/// let section = RouterSection::default();
/// assert_eq!(section.request_id_header, "request-id");
/// assert_eq!(section.max_body_bytes, 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RouterSection {
    /// Header carrying the request id.
    #[serde(default = "default_request_id_header")]
    pub request_id_header: String,

    /// Largest accepted request body, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for RouterSection {
    fn default() -> Self {
        Self {
            request_id_header: default_request_id_header(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_request_id_header() -> String {
    REQUEST_ID_HEADER.to_string()
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Forward section: the client-facing messages of the forwarder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ForwardSection {
    /// Sent in place of any downstream failure detail.
    #[serde(default = "default_internal_message")]
    pub internal_message: String,

    /// Sent when a request fails validation.
    #[serde(default = "default_invalid_message")]
    pub invalid_arguments_message: String,
}

impl Default for ForwardSection {
    fn default() -> Self {
        Self {
            internal_message: default_internal_message(),
            invalid_arguments_message: default_invalid_message(),
        }
    }
}

fn default_internal_message() -> String {
    DEFAULT_INTERNAL_MESSAGE.to_string()
}

fn default_invalid_message() -> String {
    DEFAULT_INVALID_MESSAGE.to_string()
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Whether to install a subscriber.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// `EnvFilter` directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `json` or `pretty`.
    #[serde(default)]
    pub format: LogFormat,

    /// Include file and line in log lines.
    #[serde(default)]
    pub file_line_info: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::Json,
            file_line_info: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Whether to install the Prometheus recorder.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self { enabled: true }
    }
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_fill_defaults() {
        let section: LoggingSection = toml::from_str(r#"level = "debug""#).unwrap();
        assert_eq!(section.level, "debug");
        assert!(section.enabled);
        assert_eq!(section.format, LogFormat::Json);
    }

    #[test]
    fn test_sections_reject_unknown_fields() {
        let err = toml::from_str::<RouterSection>("max_body = 3").unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }
}
