//! Finding schema shared by the classifiers, cost model, and aggregator
//!
//! A `WasteFinding` is one flagged candidate-waste resource. Findings are
//! created by exactly one classifier invocation per scan, are immutable
//! once created except for the cost fields attached by the cost model, and
//! are never persisted beyond one report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Closed enumeration of resource kinds.
///
/// Declaration order is the fixed scan order: classifiers are grouped in
/// this order in the report, so re-running against unchanged provider
/// state yields byte-identical content modulo timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    EbsVolume,
    EbsSnapshot,
    ElasticIp,
    LoadBalancer,
    NatGateway,
    StoppedInstance,
    TargetGroup,
    NetworkInterface,
    Ami,
    RdsInstance,
    CloudfrontDistribution,
    LambdaFunction,
    S3Bucket,
    EcsService,
    RedshiftCluster,
    ElasticsearchDomain,
    ApiGateway,
    CloudwatchLogGroup,
}

impl ResourceKind {
    /// All kinds, in scan order.
    pub const ALL: [ResourceKind; 18] = [
        ResourceKind::EbsVolume,
        ResourceKind::EbsSnapshot,
        ResourceKind::ElasticIp,
        ResourceKind::LoadBalancer,
        ResourceKind::NatGateway,
        ResourceKind::StoppedInstance,
        ResourceKind::TargetGroup,
        ResourceKind::NetworkInterface,
        ResourceKind::Ami,
        ResourceKind::RdsInstance,
        ResourceKind::CloudfrontDistribution,
        ResourceKind::LambdaFunction,
        ResourceKind::S3Bucket,
        ResourceKind::EcsService,
        ResourceKind::RedshiftCluster,
        ResourceKind::ElasticsearchDomain,
        ResourceKind::ApiGateway,
        ResourceKind::CloudwatchLogGroup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::EbsVolume => "EBS_VOLUME",
            ResourceKind::EbsSnapshot => "EBS_SNAPSHOT",
            ResourceKind::ElasticIp => "ELASTIC_IP",
            ResourceKind::LoadBalancer => "LOAD_BALANCER",
            ResourceKind::NatGateway => "NAT_GATEWAY",
            ResourceKind::StoppedInstance => "STOPPED_INSTANCE",
            ResourceKind::TargetGroup => "TARGET_GROUP",
            ResourceKind::NetworkInterface => "NETWORK_INTERFACE",
            ResourceKind::Ami => "AMI",
            ResourceKind::RdsInstance => "RDS_INSTANCE",
            ResourceKind::CloudfrontDistribution => "CLOUDFRONT_DISTRIBUTION",
            ResourceKind::LambdaFunction => "LAMBDA_FUNCTION",
            ResourceKind::S3Bucket => "S3_BUCKET",
            ResourceKind::EcsService => "ECS_SERVICE",
            ResourceKind::RedshiftCluster => "REDSHIFT_CLUSTER",
            ResourceKind::ElasticsearchDomain => "ELASTICSEARCH_DOMAIN",
            ResourceKind::ApiGateway => "API_GATEWAY",
            ResourceKind::CloudwatchLogGroup => "CLOUDWATCH_LOG_GROUP",
        }
    }

    /// Human label used for console progress lines.
    pub fn describe(&self) -> &'static str {
        match self {
            ResourceKind::EbsVolume => "unattached EBS volumes",
            ResourceKind::EbsSnapshot => "orphaned EBS snapshots",
            ResourceKind::ElasticIp => "unassociated Elastic IPs",
            ResourceKind::LoadBalancer => "unused load balancers",
            ResourceKind::NatGateway => "unused NAT gateways",
            ResourceKind::StoppedInstance => "long-stopped EC2 instances",
            ResourceKind::TargetGroup => "orphaned target groups",
            ResourceKind::NetworkInterface => "unattached network interfaces",
            ResourceKind::Ami => "old unused AMIs",
            ResourceKind::RdsInstance => "stopped/unused RDS instances",
            ResourceKind::CloudfrontDistribution => "unused CloudFront distributions",
            ResourceKind::LambdaFunction => "unused/over-provisioned Lambda functions",
            ResourceKind::S3Bucket => "empty/unused S3 buckets",
            ResourceKind::EcsService => "unused ECS services",
            ResourceKind::RedshiftCluster => "paused/unused Redshift clusters",
            ResourceKind::ElasticsearchDomain => "unused Elasticsearch domains",
            ResourceKind::ApiGateway => "unused API Gateway APIs",
            ResourceKind::CloudwatchLogGroup => "unbounded CloudWatch log groups",
        }
    }

    /// Region-less services report the literal "global" region.
    pub fn is_global(&self) -> bool {
        matches!(self, ResourceKind::CloudfrontDistribution)
    }

    /// Attribute names the pricing function for this kind reads. A missing
    /// attribute does not fail a scan: the cost model substitutes the
    /// policy-defined default instead.
    pub fn pricing_attributes(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::EbsVolume => &["size_gb", "volume_type"],
            ResourceKind::EbsSnapshot => &["size_gb"],
            ResourceKind::ElasticIp => &[],
            ResourceKind::LoadBalancer => &[],
            ResourceKind::NatGateway => &[],
            ResourceKind::StoppedInstance => &["storage_gb"],
            ResourceKind::TargetGroup => &[],
            ResourceKind::NetworkInterface => &[],
            ResourceKind::Ami => &["storage_gb"],
            ResourceKind::RdsInstance => &["instance_class"],
            ResourceKind::CloudfrontDistribution => &["price_class"],
            ResourceKind::LambdaFunction => &[],
            ResourceKind::S3Bucket => &["storage_gb"],
            ResourceKind::EcsService => &["running_count", "launch_type"],
            ResourceKind::RedshiftCluster => &["node_type", "node_count"],
            ResourceKind::ElasticsearchDomain => &["instance_type", "instance_count"],
            ResourceKind::ApiGateway => &["stage_count"],
            ResourceKind::CloudwatchLogGroup => &["stored_gb"],
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown resource kind: {s:?}"))
    }
}

// Serialized as the stable SCREAMING_SNAKE_CASE name so the kind works as
// a map key in both the JSON report and the TOML price table.
impl Serialize for ResourceKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResourceKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// How certain the classifier is that the resource is truly waste.
///
/// High means a real usage signal was observed (or the signal is
/// structural, like a detached volume); Medium and Low reflect heuristics
/// and conservative defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Resource age in days, or unknown when the provider does not expose a
/// reliable creation time. Serializes as a number or the literal
/// `"unknown"` so reports stay diffable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Age {
    Days(u32),
    Unknown,
}

impl Age {
    pub fn days(&self) -> Option<u32> {
        match self {
            Age::Days(d) => Some(*d),
            Age::Unknown => None,
        }
    }
}

impl Serialize for Age {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Age::Days(d) => serializer.serialize_u32(*d),
            Age::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for Age {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Days(u32),
            Label(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Days(d) => Ok(Age::Days(d)),
            Repr::Label(s) if s == "unknown" => Ok(Age::Unknown),
            Repr::Label(s) => Err(serde::de::Error::custom(format!(
                "invalid age value: {s:?}"
            ))),
        }
    }
}

/// One flagged candidate-waste resource.
///
/// `resource_id` + `kind` + `region` is unique within a single scan's
/// output; the aggregator enforces this. Cost fields are `None` until the
/// cost model annotates the finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteFinding {
    pub resource_id: String,
    pub kind: ResourceKind,
    pub region: String,
    pub age_days: Age,
    /// Kind-specific attributes (size, instance class, node count, tags...).
    /// BTreeMap keeps report output deterministic.
    pub attributes: BTreeMap<String, serde_json::Value>,
    pub confidence: Confidence,
    /// One-line justification. The cost model embeds the computed monthly
    /// cost here so the report is self-explaining.
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_cost: Option<f64>,
    /// Unit price the cost model used, for auditability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_note: Option<String>,
}

impl WasteFinding {
    pub fn new(
        kind: ResourceKind,
        resource_id: impl Into<String>,
        region: impl Into<String>,
        age_days: Age,
        confidence: Confidence,
        reason: impl Into<String>,
    ) -> crate::error::Result<Self> {
        let finding = Self {
            resource_id: resource_id.into(),
            kind,
            region: region.into(),
            age_days,
            attributes: BTreeMap::new(),
            confidence,
            reason: reason.into(),
            monthly_cost: None,
            annual_cost: None,
            unit_price: None,
            pricing_note: None,
        };
        finding.validate()?;
        Ok(finding)
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.resource_id.is_empty() {
            return Err(crate::error::SweepError::Validation {
                field: "resource_id".into(),
                reason: format!("empty id for kind {}", self.kind),
            });
        }
        if self.region.is_empty() {
            return Err(crate::error::SweepError::Validation {
                field: "region".into(),
                reason: format!("empty region for {}", self.resource_id),
            });
        }
        Ok(())
    }

    /// Uniqueness key within one scan's output.
    pub fn dedup_key(&self) -> (ResourceKind, &str, &str) {
        (self.kind, self.resource_id.as_str(), self.region.as_str())
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

    /// Pricing attributes the classifier did not supply. The cost model
    /// substitutes defaults for these; listing them helps tests catch
    /// classifier regressions early.
    pub fn missing_pricing_attributes(&self) -> Vec<&'static str> {
        self.kind
            .pricing_attributes()
            .iter()
            .filter(|name| !self.attributes.contains_key(**name))
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_to_stable_names() {
        let json = serde_json::to_string(&ResourceKind::EbsVolume).unwrap();
        assert_eq!(json, "\"EBS_VOLUME\"");
        let json = serde_json::to_string(&ResourceKind::CloudwatchLogGroup).unwrap();
        assert_eq!(json, "\"CLOUDWATCH_LOG_GROUP\"");
        let back: ResourceKind = serde_json::from_str("\"AMI\"").unwrap();
        assert_eq!(back, ResourceKind::Ami);
    }

    #[test]
    fn scan_order_matches_declaration_order() {
        let mut sorted = ResourceKind::ALL;
        sorted.sort();
        assert_eq!(sorted, ResourceKind::ALL);
    }

    #[test]
    fn age_serialization_round_trips() {
        assert_eq!(serde_json::to_string(&Age::Days(40)).unwrap(), "40");
        assert_eq!(serde_json::to_string(&Age::Unknown).unwrap(), "\"unknown\"");
        let age: Age = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(age, Age::Unknown);
        let age: Age = serde_json::from_str("7").unwrap();
        assert_eq!(age, Age::Days(7));
    }

    #[test]
    fn finding_rejects_empty_id() {
        let result = WasteFinding::new(
            ResourceKind::ElasticIp,
            "",
            "us-east-1",
            Age::Unknown,
            Confidence::High,
            "unassociated",
        );
        assert!(result.is_err());
    }

    #[test]
    fn missing_pricing_attributes_reported() {
        let finding = WasteFinding::new(
            ResourceKind::EbsVolume,
            "vol-1",
            "us-east-1",
            Age::Days(10),
            Confidence::High,
            "detached",
        )
        .unwrap()
        .with_attr("size_gb", 100);
        assert_eq!(finding.missing_pricing_attributes(), vec!["volume_type"]);
    }
}
