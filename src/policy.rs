//! Per-kind waste policies
//!
//! Every classifier applies the same three checks: a minimum-age gate, a
//! protective-tag veto, and (for metric-backed kinds) an idle signal over
//! a lookback window. The thresholds live here in one static table so the
//! classifiers stay table-driven instead of each re-implementing the
//! pattern.

use crate::finding::{Age, Confidence, ResourceKind};
use std::collections::BTreeMap;

/// Tag keys whose presence vetoes flagging regardless of other signals.
/// Matched case-insensitively on the key.
pub const PROTECTIVE_TAG_KEYS: [&str; 3] = ["donotdelete", "keep", "production"];

/// Policy row for one resource kind.
#[derive(Debug, Clone, Copy)]
pub struct KindPolicy {
    pub kind: ResourceKind,
    /// Resources younger than this are never flagged. Zero means no gate.
    pub min_age_days: u32,
    /// Whether the protective-tag veto applies to this kind.
    pub protective_tags: bool,
    /// Utilization metric consulted, if any, and its lookback in days.
    pub metric: Option<MetricPolicy>,
}

#[derive(Debug, Clone, Copy)]
pub struct MetricPolicy {
    pub name: &'static str,
    pub namespace: &'static str,
    pub lookback_days: u32,
}

const POLICIES: [KindPolicy; 18] = [
    KindPolicy {
        kind: ResourceKind::EbsVolume,
        min_age_days: 7,
        protective_tags: true,
        metric: None,
    },
    KindPolicy {
        kind: ResourceKind::EbsSnapshot,
        min_age_days: 7,
        protective_tags: true,
        metric: None,
    },
    KindPolicy {
        kind: ResourceKind::ElasticIp,
        min_age_days: 0,
        protective_tags: true,
        metric: None,
    },
    KindPolicy {
        kind: ResourceKind::LoadBalancer,
        min_age_days: 7,
        protective_tags: true,
        metric: None,
    },
    KindPolicy {
        kind: ResourceKind::NatGateway,
        min_age_days: 30,
        protective_tags: true,
        metric: None,
    },
    KindPolicy {
        kind: ResourceKind::StoppedInstance,
        min_age_days: 30,
        protective_tags: true,
        metric: None,
    },
    // target groups expose no creation time, so no age gate
    KindPolicy {
        kind: ResourceKind::TargetGroup,
        min_age_days: 0,
        protective_tags: true,
        metric: None,
    },
    // ENIs expose no creation time, so no age gate
    KindPolicy {
        kind: ResourceKind::NetworkInterface,
        min_age_days: 0,
        protective_tags: true,
        metric: None,
    },
    KindPolicy {
        kind: ResourceKind::Ami,
        min_age_days: 180,
        protective_tags: true,
        metric: None,
    },
    KindPolicy {
        kind: ResourceKind::RdsInstance,
        min_age_days: 30,
        protective_tags: false,
        metric: Some(MetricPolicy {
            name: "DatabaseConnections",
            namespace: "AWS/RDS",
            lookback_days: 30,
        }),
    },
    KindPolicy {
        kind: ResourceKind::CloudfrontDistribution,
        min_age_days: 30,
        protective_tags: false,
        metric: Some(MetricPolicy {
            name: "Requests",
            namespace: "AWS/CloudFront",
            lookback_days: 30,
        }),
    },
    KindPolicy {
        kind: ResourceKind::LambdaFunction,
        min_age_days: 30,
        protective_tags: false,
        metric: Some(MetricPolicy {
            name: "Invocations",
            namespace: "AWS/Lambda",
            lookback_days: 30,
        }),
    },
    KindPolicy {
        kind: ResourceKind::S3Bucket,
        min_age_days: 30,
        protective_tags: false,
        metric: Some(MetricPolicy {
            name: "AllRequests",
            namespace: "AWS/S3",
            lookback_days: 90,
        }),
    },
    KindPolicy {
        kind: ResourceKind::EcsService,
        min_age_days: 30,
        protective_tags: false,
        metric: Some(MetricPolicy {
            name: "CPUUtilization",
            namespace: "AWS/ECS",
            lookback_days: 30,
        }),
    },
    KindPolicy {
        kind: ResourceKind::RedshiftCluster,
        min_age_days: 30,
        protective_tags: false,
        metric: Some(MetricPolicy {
            name: "DatabaseConnections",
            namespace: "AWS/Redshift",
            lookback_days: 30,
        }),
    },
    KindPolicy {
        kind: ResourceKind::ElasticsearchDomain,
        min_age_days: 30,
        protective_tags: false,
        metric: Some(MetricPolicy {
            name: "SearchRate",
            namespace: "AWS/ES",
            lookback_days: 30,
        }),
    },
    KindPolicy {
        kind: ResourceKind::ApiGateway,
        min_age_days: 30,
        protective_tags: false,
        metric: Some(MetricPolicy {
            name: "Count",
            namespace: "AWS/ApiGateway",
            lookback_days: 30,
        }),
    },
    KindPolicy {
        kind: ResourceKind::CloudwatchLogGroup,
        min_age_days: 30,
        protective_tags: false,
        metric: Some(MetricPolicy {
            name: "IncomingBytes",
            namespace: "AWS/Logs",
            lookback_days: 90,
        }),
    },
];

pub fn policy_for(kind: ResourceKind) -> &'static KindPolicy {
    // POLICIES is declared in kind order, same index as ResourceKind::ALL
    &POLICIES[kind as usize]
}

/// Age gate. Unknown ages only pass a zero gate: if we cannot tell how old
/// a resource is, we do not claim it has been idle long enough.
pub fn passes_age_gate(age: Age, policy: &KindPolicy) -> bool {
    match age {
        Age::Days(d) => d >= policy.min_age_days,
        Age::Unknown => policy.min_age_days == 0,
    }
}

/// Protective-tag veto: any tag key in the protective set, matched
/// case-insensitively, blocks the finding.
pub fn has_protective_tag(tags: &BTreeMap<String, String>) -> bool {
    tags.keys()
        .any(|k| PROTECTIVE_TAG_KEYS.contains(&k.to_ascii_lowercase().as_str()))
}

/// Minimum estimated monthly cost for a heuristic finding to be worth
/// reporting. Applies to Medium-confidence findings only: a structural
/// signal (detached, stopped, empty, orphaned) always flags, but a
/// usage heuristic on a resource costing pennies is noise. Zero means
/// no floor.
pub fn reporting_cost_floor(kind: ResourceKind, confidence: Confidence) -> f64 {
    if confidence != Confidence::Medium {
        return 0.0;
    }
    match kind {
        ResourceKind::LambdaFunction | ResourceKind::S3Bucket => 1.00,
        ResourceKind::EcsService => 10.00,
        ResourceKind::RedshiftCluster => 100.00,
        _ => 0.0,
    }
}

/// What a utilization series tells us about a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleSignal {
    /// Error-free series observed, all datapoints zero.
    Idle,
    /// Non-zero activity observed.
    Active,
    /// No series, or a series with no datapoints. Conservative bias:
    /// treated as active by every classifier.
    Unknown,
}

/// Uniform interpretation of a daily metric series. `None` means the
/// query failed or was unavailable; an empty series is equally unknown
/// (a resource with no datapoints may simply be unmonitored).
pub fn idle_signal(datapoints: Option<&[f64]>) -> IdleSignal {
    match datapoints {
        None => IdleSignal::Unknown,
        Some(points) if points.is_empty() => IdleSignal::Unknown,
        Some(points) => {
            if points.iter().all(|p| *p == 0.0) {
                IdleSignal::Idle
            } else {
                IdleSignal::Active
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_table_covers_every_kind_in_order() {
        for (i, kind) in ResourceKind::ALL.into_iter().enumerate() {
            assert_eq!(POLICIES[i].kind, kind);
            assert_eq!(policy_for(kind).kind, kind);
        }
    }

    #[test]
    fn age_gate() {
        let p = policy_for(ResourceKind::StoppedInstance);
        assert!(passes_age_gate(Age::Days(30), p));
        assert!(!passes_age_gate(Age::Days(29), p));
        assert!(!passes_age_gate(Age::Unknown, p));

        let eip = policy_for(ResourceKind::ElasticIp);
        assert!(passes_age_gate(Age::Unknown, eip));
        assert!(passes_age_gate(Age::Days(0), eip));
    }

    #[test]
    fn protective_tags_are_case_insensitive_on_key() {
        let mut tags = BTreeMap::new();
        tags.insert("Team".to_string(), "data".to_string());
        assert!(!has_protective_tag(&tags));
        tags.insert("DoNotDelete".to_string(), "true".to_string());
        assert!(has_protective_tag(&tags));

        let mut prod = BTreeMap::new();
        prod.insert("PRODUCTION".to_string(), String::new());
        assert!(has_protective_tag(&prod));
    }

    #[test]
    fn cost_floors_gate_heuristic_findings_only() {
        assert_eq!(
            reporting_cost_floor(ResourceKind::EcsService, Confidence::Medium),
            10.00
        );
        assert_eq!(
            reporting_cost_floor(ResourceKind::RedshiftCluster, Confidence::Medium),
            100.00
        );
        // structural findings of the same kind never hit a floor
        assert_eq!(
            reporting_cost_floor(ResourceKind::EcsService, Confidence::High),
            0.0
        );
        assert_eq!(
            reporting_cost_floor(ResourceKind::EbsVolume, Confidence::Medium),
            0.0
        );
    }

    #[test]
    fn idle_signal_is_conservative() {
        assert_eq!(idle_signal(None), IdleSignal::Unknown);
        assert_eq!(idle_signal(Some(&[])), IdleSignal::Unknown);
        assert_eq!(idle_signal(Some(&[0.0, 0.0, 0.0])), IdleSignal::Idle);
        assert_eq!(idle_signal(Some(&[0.0, 2.0])), IdleSignal::Active);
    }
}
