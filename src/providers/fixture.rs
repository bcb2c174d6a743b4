//! Fixture-backed provider
//!
//! Serves descriptors and metric series from a JSON document instead of a
//! live account. Used by the test suite and by `scan --fixture <file>`
//! for offline runs; it also covers the kinds the AWS provider does not
//! enumerate.
//!
//! Fixture format:
//! ```json
//! {
//!   "account": { "account_id": "123456789012", "user_arn": "arn:..." },
//!   "region": "us-east-1",
//!   "resources": [ { "id": "...", "kind": "EBS_VOLUME", ... } ],
//!   "metrics": { "db-1": [0.0, 0.0] },
//!   "failed_kinds": ["NAT_GATEWAY"]
//! }
//! ```
//! `metrics` is keyed by resource id; a missing key behaves like an
//! unavailable metric. `failed_kinds` simulates per-kind API failures.

use crate::error::{Result, SweepError};
use crate::finding::ResourceKind;
use crate::provider::{
    AccountInfo, MetricQuery, MetricSeries, ResourceDescriptor, ResourceProvider,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanFixture {
    pub account: AccountInfo,
    pub region: String,
    #[serde(default)]
    pub resources: Vec<ResourceDescriptor>,
    #[serde(default)]
    pub metrics: BTreeMap<String, Vec<f64>>,
    #[serde(default)]
    pub failed_kinds: Vec<ResourceKind>,
}

pub struct FixtureProvider {
    fixture: ScanFixture,
}

impl FixtureProvider {
    pub fn new(fixture: ScanFixture) -> Self {
        Self { fixture }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let fixture: ScanFixture = serde_json::from_str(json)?;
        Ok(Self::new(fixture))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

#[async_trait]
impl ResourceProvider for FixtureProvider {
    async fn account_info(&self) -> Result<AccountInfo> {
        Ok(self.fixture.account.clone())
    }

    fn region(&self) -> &str {
        &self.fixture.region
    }

    fn supported_kinds(&self) -> Vec<ResourceKind> {
        // every kind: the fixture decides what exists, and failed kinds
        // must still be scanned to produce their warning
        ResourceKind::ALL.to_vec()
    }

    async fn list(&self, kind: ResourceKind) -> Result<Vec<ResourceDescriptor>> {
        if self.fixture.failed_kinds.contains(&kind) {
            return Err(SweepError::api_for_kind(
                kind,
                "List",
                "simulated API failure",
            ));
        }
        Ok(self
            .fixture
            .resources
            .iter()
            .filter(|r| r.kind == kind)
            .cloned()
            .collect())
    }

    async fn metric_series(&self, query: &MetricQuery) -> Result<MetricSeries> {
        match self.fixture.metrics.get(&query.dimension.1) {
            Some(points) => Ok(MetricSeries {
                datapoints: points.clone(),
            }),
            None => Err(SweepError::MetricUnavailable {
                metric: format!("{}/{}", query.namespace, query.metric),
                resource_id: query.dimension.1.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MetricStat;

    const FIXTURE: &str = r#"{
        "account": { "account_id": "123456789012", "user_arn": "arn:aws:iam::123456789012:user/ci" },
        "region": "us-east-1",
        "resources": [
            { "id": "vol-1", "kind": "EBS_VOLUME", "region": "us-east-1",
              "state": "available", "age_days": 40,
              "attributes": { "size_gb": 100, "volume_type": "gp2" } },
            { "id": "db-1", "kind": "RDS_INSTANCE", "region": "us-east-1",
              "state": "available", "age_days": 90,
              "attributes": { "instance_class": "db.t3.micro", "engine": "postgres" } }
        ],
        "metrics": { "db-1": [0.0, 0.0, 0.0] },
        "failed_kinds": ["NAT_GATEWAY"]
    }"#;

    #[tokio::test]
    async fn serves_resources_by_kind() {
        let provider = FixtureProvider::from_json_str(FIXTURE).unwrap();
        let volumes = provider.list(ResourceKind::EbsVolume).await.unwrap();
        assert_eq!(volumes.len(), 1);
        assert_eq!(volumes[0].id, "vol-1");
        assert!(provider
            .list(ResourceKind::ElasticIp)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn failed_kinds_error() {
        let provider = FixtureProvider::from_json_str(FIXTURE).unwrap();
        let err = provider.list(ResourceKind::NatGateway).await.unwrap_err();
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn metric_lookup_by_resource_id() {
        let provider = FixtureProvider::from_json_str(FIXTURE).unwrap();
        let query = MetricQuery {
            namespace: "AWS/RDS".into(),
            metric: "DatabaseConnections".into(),
            dimension: ("DBInstanceIdentifier".into(), "db-1".into()),
            lookback_days: 30,
            stat: MetricStat::Maximum,
        };
        let series = provider.metric_series(&query).await.unwrap();
        assert_eq!(series.datapoints, vec![0.0, 0.0, 0.0]);

        let missing = MetricQuery {
            dimension: ("DBInstanceIdentifier".into(), "db-2".into()),
            ..query
        };
        assert!(provider.metric_series(&missing).await.is_err());
    }
}
