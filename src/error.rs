//! Error types for cloudsweep
//!
//! Two error types: `SweepError` (main error enum) and `ConfigError`
//! (configuration-specific, converted via `#[from]`).
//!
//! ## Propagation policy
//!
//! Only two classes abort a scan:
//! - `ProviderConnection`: no credentials/session, nothing can be enumerated.
//! - `CostConfig`: the price table is incomplete for a kind we claim to
//!   support. Caught at table-load time, never per finding.
//!
//! Everything else degrades: a `ProviderApi` failure is recovered by the
//! classifier that issued the call (that kind contributes nothing and is
//! reported as a warning), and `MetricUnavailable` means "assume in-use"
//! wherever conservative bias applies.
//!
//! Library code uses `crate::error::Result<T>`; the CLI converts to
//! `anyhow::Result` at the boundary to preserve error chains.

use crate::finding::ResourceKind;
use thiserror::Error;

/// Main error type for cloudsweep
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Cannot establish a session/credentials. Fatal: aborts the whole scan.
    #[error("Provider connection failed: {message}")]
    ProviderConnection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A single provider API call failed (permission denied, throttled,
    /// not found). Recovered locally by the classifier that issued it.
    #[error("Provider API error during {operation}: {message}")]
    ProviderApi {
        operation: String,
        message: String,
        kind: Option<ResourceKind>,
    },

    /// A utilization metric could not be read. Never a hard failure:
    /// dependent classifiers treat the resource as in-use.
    #[error("Metric unavailable for {resource_id}: {metric}")]
    MetricUnavailable { metric: String, resource_id: String },

    /// Price table is incomplete. Fatal at load time.
    #[error("Cost model configuration error: {kind} - {message}")]
    CostConfig { kind: ResourceKind, message: String },

    /// The overall scan deadline expired before this kind finished.
    #[error("Scan timed out after {timeout_secs}s while scanning {kind}")]
    ScanTimeout { kind: ResourceKind, timeout_secs: u64 },

    #[error("Validation error: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SweepError {
    pub fn connection(message: impl Into<String>) -> Self {
        SweepError::ProviderConnection {
            message: message.into(),
            source: None,
        }
    }

    pub fn api(operation: impl Into<String>, message: impl Into<String>) -> Self {
        SweepError::ProviderApi {
            operation: operation.into(),
            message: message.into(),
            kind: None,
        }
    }

    pub fn api_for_kind(
        kind: ResourceKind,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        SweepError::ProviderApi {
            operation: operation.into(),
            message: message.into(),
            kind: Some(kind),
        }
    }

    /// True for the classes that must abort the process: connection and
    /// cost-model configuration failures only.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SweepError::ProviderConnection { .. } | SweepError::CostConfig { .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SweepError>;

/// Trait for determining if an error is retryable
///
/// Used by the `RetryPolicy` in `src/retry.rs`. Throttled or transient
/// provider calls are worth retrying; validation and configuration
/// failures are not.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for SweepError {
    fn is_retryable(&self) -> bool {
        matches!(self, SweepError::ProviderApi { .. } | SweepError::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classes() {
        assert!(SweepError::connection("no credentials").is_fatal());
        assert!(SweepError::CostConfig {
            kind: ResourceKind::EbsVolume,
            message: "no default price".into(),
        }
        .is_fatal());
        assert!(!SweepError::api("DescribeVolumes", "throttled").is_fatal());
        assert!(!SweepError::MetricUnavailable {
            metric: "DatabaseConnections".into(),
            resource_id: "db-1".into(),
        }
        .is_fatal());
    }

    #[test]
    fn retryable_classes() {
        assert!(SweepError::api("DescribeVolumes", "throttled").is_retryable());
        assert!(!SweepError::connection("no credentials").is_retryable());
        assert!(!SweepError::Validation {
            field: "region".into(),
            reason: "empty".into(),
        }
        .is_retryable());
    }
}
