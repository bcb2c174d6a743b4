//! Scan orchestration
//!
//! One concurrent task per supported kind: list descriptors (retrying
//! transient API failures), fetch the utilization series where the kind's
//! policy calls for one, classify, and price. Results are joined in
//! declared kind order, so concurrency never changes report content.
//!
//! Each kind runs under the overall scan deadline; a kind that exceeds it
//! becomes a warning and the partial report is still produced. Only
//! account identification can abort the scan.

use crate::aggregate::{aggregate, Aggregated, KindOutcome};
use crate::classify::classify;
use crate::error::{Result, SweepError};
use crate::finding::{ResourceKind, WasteFinding};
use crate::policy::{policy_for, reporting_cost_floor};
use crate::pricing::CostModel;
use crate::provider::{AccountInfo, MetricQuery, MetricStat, ResourceDescriptor, ResourceProvider};
use crate::retry::{ExponentialBackoffPolicy, RetryPolicy};
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct ScanOutput {
    pub account: AccountInfo,
    pub region: String,
    pub aggregated: Aggregated,
}

/// Run a full scan against one provider.
pub async fn run_scan(
    provider: &dyn ResourceProvider,
    model: &CostModel,
    timeout: Duration,
) -> Result<ScanOutput> {
    // connection/credential failure is the one fatal provider error
    let account = provider.account_info().await?;
    info!(account_id = %account.account_id, region = provider.region(), "starting scan");

    let kinds = provider.supported_kinds();
    let tasks = kinds.iter().map(|kind| {
        let kind = *kind;
        async move {
            let result = match tokio::time::timeout(timeout, scan_kind(provider, model, kind)).await
            {
                Ok(result) => result,
                Err(_) => Err(SweepError::ScanTimeout {
                    kind,
                    timeout_secs: timeout.as_secs(),
                }),
            };
            KindOutcome { kind, result }
        }
    });

    let outcomes = futures::future::join_all(tasks).await;
    let aggregated = aggregate(outcomes);
    info!(
        findings = aggregated.findings.len(),
        warnings = aggregated.warnings.len(),
        monthly = aggregated.summary.total_monthly_savings,
        "scan complete"
    );

    Ok(ScanOutput {
        account,
        region: provider.region().to_string(),
        aggregated,
    })
}

async fn scan_kind(
    provider: &dyn ResourceProvider,
    model: &CostModel,
    kind: ResourceKind,
) -> Result<Vec<WasteFinding>> {
    debug!(%kind, "scanning {}", kind.describe());
    let retry = ExponentialBackoffPolicy::for_cloud_api();
    let descriptors = retry.execute_with_retry(|| provider.list(kind)).await?;

    let mut findings = Vec::new();
    for descriptor in descriptors {
        let datapoints = fetch_datapoints(provider, &descriptor).await;
        match classify(&descriptor, datapoints.as_deref()) {
            Ok(Some(finding)) => {
                let finding = model.annotate(finding)?;
                let floor = reporting_cost_floor(finding.kind, finding.confidence);
                if floor > 0.0 && finding.monthly_cost.unwrap_or(0.0) <= floor {
                    debug!(%kind, id = %finding.resource_id,
                        "estimated cost under the reporting floor, skipping");
                    continue;
                }
                findings.push(finding);
            }
            Ok(None) => {}
            Err(e) => {
                // a malformed descriptor skips one resource, not the kind
                warn!(%kind, id = %descriptor.id, error = %e, "skipping resource");
            }
        }
    }
    Ok(findings)
}

/// Fetch the policy's utilization series for one resource. `None` when the
/// kind is structural, the resource state makes metrics moot (stopped,
/// paused), or the query fails; classifiers treat all three as unknown.
async fn fetch_datapoints(
    provider: &dyn ResourceProvider,
    descriptor: &ResourceDescriptor,
) -> Option<Vec<f64>> {
    let metric = policy_for(descriptor.kind).metric?;
    if descriptor.state_is("stopped") || descriptor.state_is("paused") {
        return None;
    }
    if descriptor.kind == ResourceKind::S3Bucket && descriptor.attr_u64("object_count") == Some(0) {
        return None;
    }

    let query = MetricQuery {
        namespace: metric.namespace.to_string(),
        metric: metric.name.to_string(),
        dimension: (
            metric_dimension_name(descriptor.kind).to_string(),
            descriptor.id.clone(),
        ),
        lookback_days: metric.lookback_days,
        stat: metric_stat(descriptor.kind),
    };
    match provider.metric_series(&query).await {
        Ok(series) => Some(series.datapoints),
        Err(e) => {
            debug!(kind = %descriptor.kind, id = %descriptor.id, error = %e,
                "metric unavailable, assuming active");
            None
        }
    }
}

fn metric_dimension_name(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::RdsInstance => "DBInstanceIdentifier",
        ResourceKind::CloudfrontDistribution => "DistributionId",
        ResourceKind::LambdaFunction => "FunctionName",
        ResourceKind::S3Bucket => "BucketName",
        ResourceKind::EcsService => "ServiceName",
        ResourceKind::RedshiftCluster => "ClusterIdentifier",
        ResourceKind::ElasticsearchDomain => "DomainName",
        ResourceKind::ApiGateway => "ApiName",
        ResourceKind::CloudwatchLogGroup => "LogGroupName",
        _ => "ResourceId",
    }
}

fn metric_stat(kind: ResourceKind) -> MetricStat {
    match kind {
        // connection counts peak-detect; request/invocation counts sum;
        // CPU averages
        ResourceKind::RdsInstance | ResourceKind::RedshiftCluster => MetricStat::Maximum,
        ResourceKind::EcsService => MetricStat::Average,
        _ => MetricStat::Sum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PriceTable;
    use crate::providers::FixtureProvider;

    fn model() -> CostModel {
        CostModel::new(PriceTable::builtin()).unwrap()
    }

    const FIXTURE: &str = r#"{
        "account": { "account_id": "123456789012", "user_arn": "arn:aws:iam::123456789012:user/ci" },
        "region": "us-east-1",
        "resources": [
            { "id": "vol-1", "kind": "EBS_VOLUME", "region": "us-east-1",
              "state": "available", "age_days": 40,
              "attributes": { "size_gb": 100, "volume_type": "gp2" } },
            { "id": "eipalloc-1", "kind": "ELASTIC_IP", "region": "us-east-1",
              "attributes": { "associated": false } }
        ]
    }"#;

    #[tokio::test]
    async fn end_to_end_savings_scenario() {
        let provider = FixtureProvider::from_json_str(FIXTURE).unwrap();
        let output = run_scan(&provider, &model(), Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(output.aggregated.summary.total_monthly_savings, 13.60);
        assert_eq!(output.aggregated.findings.len(), 2);
        assert_eq!(output.aggregated.summary.breakdown.len(), 2);
        assert_eq!(output.account.account_id, "123456789012");
    }

    #[tokio::test]
    async fn failed_kind_becomes_warning_not_abort() {
        let fixture = r#"{
            "account": { "account_id": "1", "user_arn": "arn" },
            "region": "us-east-1",
            "resources": [
                { "id": "eipalloc-1", "kind": "ELASTIC_IP", "region": "us-east-1",
                  "attributes": { "associated": false } }
            ],
            "failed_kinds": ["NAT_GATEWAY"]
        }"#;
        let provider = FixtureProvider::from_json_str(fixture).unwrap();
        let output = run_scan(&provider, &model(), Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(output.aggregated.findings.len(), 1);
        assert!(output
            .aggregated
            .warnings
            .iter()
            .any(|w| w.kind == Some(ResourceKind::NatGateway)));
    }

    #[tokio::test]
    async fn heuristic_findings_respect_cost_floors() {
        // each pair: one resource whose estimated cost clears the kind's
        // reporting floor and one that does not
        let fixture = r#"{
            "account": { "account_id": "1", "user_arn": "arn" },
            "region": "us-east-1",
            "resources": [
                { "id": "fn-small", "kind": "LAMBDA_FUNCTION", "region": "us-east-1",
                  "age_days": 60,
                  "attributes": { "max_memory_used_pct": 30.0, "monthly_gb_seconds": 60000.0 } },
                { "id": "fn-big", "kind": "LAMBDA_FUNCTION", "region": "us-east-1",
                  "age_days": 60,
                  "attributes": { "max_memory_used_pct": 30.0, "monthly_gb_seconds": 600000.0 } },
                { "id": "bucket-small", "kind": "S3_BUCKET", "region": "us-east-1",
                  "age_days": 120, "attributes": { "storage_gb": 10.0 } },
                { "id": "bucket-big", "kind": "S3_BUCKET", "region": "us-east-1",
                  "age_days": 120, "attributes": { "storage_gb": 100.0 } },
                { "id": "cluster/svc-ec2", "kind": "ECS_SERVICE", "region": "us-east-1",
                  "age_days": 90,
                  "attributes": { "running_count": 1, "desired_count": 1, "launch_type": "EC2" } },
                { "id": "cluster/svc-fargate", "kind": "ECS_SERVICE", "region": "us-east-1",
                  "age_days": 90,
                  "attributes": { "running_count": 1, "desired_count": 1, "launch_type": "FARGATE" } },
                { "id": "wh-one", "kind": "REDSHIFT_CLUSTER", "region": "us-east-1",
                  "age_days": 200,
                  "attributes": { "node_type": "dc2.large", "node_count": 1, "avg_cpu_pct": 8.0 } },
                { "id": "wh-two", "kind": "REDSHIFT_CLUSTER", "region": "us-east-1",
                  "age_days": 200,
                  "attributes": { "node_type": "dc2.large", "node_count": 2, "avg_cpu_pct": 8.0 } }
            ],
            "metrics": {
                "fn-small": [5.0, 3.0], "fn-big": [5.0, 3.0],
                "bucket-small": [0.0, 0.0], "bucket-big": [0.0, 0.0],
                "cluster/svc-ec2": [4.0, 6.0], "cluster/svc-fargate": [4.0, 6.0],
                "wh-one": [3.0, 2.0], "wh-two": [3.0, 2.0]
            }
        }"#;
        let provider = FixtureProvider::from_json_str(fixture).unwrap();
        let output = run_scan(&provider, &model(), Duration::from_secs(30))
            .await
            .unwrap();
        let ids: Vec<&str> = output
            .aggregated
            .findings
            .iter()
            .map(|f| f.resource_id.as_str())
            .collect();
        // savings 0.50 vs 5.00; storage 0.33 vs 2.40; service 5.00 vs
        // 25.00; cluster 90.00 vs 180.00
        assert_eq!(
            ids,
            vec!["fn-big", "bucket-big", "cluster/svc-fargate", "wh-two"]
        );
    }

    #[tokio::test]
    async fn metric_backed_kind_flags_on_zero_series() {
        let fixture = r#"{
            "account": { "account_id": "1", "user_arn": "arn" },
            "region": "us-east-1",
            "resources": [
                { "id": "db-idle", "kind": "RDS_INSTANCE", "region": "us-east-1",
                  "state": "available", "age_days": 90,
                  "attributes": { "instance_class": "db.t3.micro", "engine": "postgres" } },
                { "id": "db-busy", "kind": "RDS_INSTANCE", "region": "us-east-1",
                  "state": "available", "age_days": 90,
                  "attributes": { "instance_class": "db.t3.micro", "engine": "postgres" } },
                { "id": "db-unknown", "kind": "RDS_INSTANCE", "region": "us-east-1",
                  "state": "available", "age_days": 90,
                  "attributes": { "instance_class": "db.t3.micro", "engine": "postgres" } }
            ],
            "metrics": { "db-idle": [0.0, 0.0], "db-busy": [0.0, 4.0] }
        }"#;
        let provider = FixtureProvider::from_json_str(fixture).unwrap();
        let output = run_scan(&provider, &model(), Duration::from_secs(30))
            .await
            .unwrap();
        // only the error-free zero series is flagged; no datapoints means
        // assume active
        assert_eq!(output.aggregated.findings.len(), 1);
        assert_eq!(output.aggregated.findings[0].resource_id, "db-idle");
        assert_eq!(output.aggregated.findings[0].monthly_cost, Some(18.50));
    }
}
