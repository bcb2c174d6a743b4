//! Resource provider abstraction
//!
//! A `ResourceProvider` is the external collaborator that enumerates raw
//! resources and answers utilization-metric queries. The AWS
//! implementation lives in `providers::aws`; tests and offline runs use
//! `providers::fixture`.
//!
//! Providers do the cross-resource joins up front (snapshot-to-AMI
//! references, route-table usage, healthy-target counts) and record the
//! results as descriptor attributes, so the classifiers stay pure
//! functions over one descriptor plus an optional metric series.

use crate::error::Result;
use crate::finding::{Age, ResourceKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One raw resource as enumerated by a provider, before classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub id: String,
    pub kind: ResourceKind,
    pub region: String,
    /// Provider lifecycle state ("available", "stopped", "paused", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Age at scan time; providers compute this from the creation
    /// timestamp so classification stays clock-free.
    #[serde(default = "Age::unknown")]
    pub age_days: Age,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Kind-specific attributes, including the joins the provider
    /// resolved (e.g. `referenced_by_image`, `healthy_target_count`).
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl ResourceDescriptor {
    pub fn new(kind: ResourceKind, id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            region: region.into(),
            state: None,
            age_days: Age::Unknown,
            tags: BTreeMap::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_age(mut self, age: Age) -> Self {
        self.age_days = age;
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn attr_f64(&self, name: &str) -> Option<f64> {
        self.attributes.get(name).and_then(|v| v.as_f64())
    }

    pub fn attr_u64(&self, name: &str) -> Option<u64> {
        self.attributes.get(name).and_then(|v| v.as_u64())
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(|v| v.as_str())
    }

    pub fn attr_bool(&self, name: &str) -> Option<bool> {
        self.attributes.get(name).and_then(|v| v.as_bool())
    }

    pub fn state_is(&self, expected: &str) -> bool {
        self.state.as_deref() == Some(expected)
    }
}

/// Statistic requested for a metric series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricStat {
    Sum,
    Maximum,
    Average,
}

/// A daily time-series query over a lookback window.
#[derive(Debug, Clone)]
pub struct MetricQuery {
    pub namespace: String,
    pub metric: String,
    /// Dimension name/value identifying the resource.
    pub dimension: (String, String),
    pub lookback_days: u32,
    pub stat: MetricStat,
}

/// Daily datapoints, oldest first. May legitimately be empty: an
/// unmonitored resource has no datapoints, which classifiers treat as
/// unknown, not idle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricSeries {
    pub datapoints: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    pub account_id: String,
    pub user_arn: String,
}

/// External inventory source: paginated listings per kind plus
/// per-resource utilization series.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Identify the account; failure here is fatal to the whole scan.
    async fn account_info(&self) -> Result<AccountInfo>;

    fn region(&self) -> &str;

    /// Kinds this provider can enumerate, in scan order.
    fn supported_kinds(&self) -> Vec<ResourceKind>;

    async fn list(&self, kind: ResourceKind) -> Result<Vec<ResourceDescriptor>>;

    async fn metric_series(&self, query: &MetricQuery) -> Result<MetricSeries>;
}

impl Age {
    fn unknown() -> Self {
        Age::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_builder_and_accessors() {
        let d = ResourceDescriptor::new(ResourceKind::EbsVolume, "vol-1", "eu-west-2")
            .with_state("available")
            .with_age(Age::Days(12))
            .with_tag("Team", "data")
            .with_attr("size_gb", 100)
            .with_attr("volume_type", "gp2");
        assert!(d.state_is("available"));
        assert_eq!(d.attr_f64("size_gb"), Some(100.0));
        assert_eq!(d.attr_str("volume_type"), Some("gp2"));
        assert_eq!(d.attr_u64("missing"), None);
    }

    #[test]
    fn descriptor_deserializes_with_defaults() {
        let d: ResourceDescriptor = serde_json::from_str(
            r#"{"id": "eipalloc-1", "kind": "ELASTIC_IP", "region": "us-east-1"}"#,
        )
        .unwrap();
        assert_eq!(d.kind, ResourceKind::ElasticIp);
        assert_eq!(d.age_days, Age::Unknown);
        assert!(d.tags.is_empty());
    }
}
