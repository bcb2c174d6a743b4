//! Full pipeline against the fixture provider: provider → classifiers →
//! cost model → aggregator → report.

use cloudsweep::finding::ResourceKind;
use cloudsweep::pricing::{CostModel, PriceTable};
use cloudsweep::providers::FixtureProvider;
use cloudsweep::report::ScanReport;
use cloudsweep::scan::run_scan;
use std::time::Duration;

fn model() -> CostModel {
    CostModel::new(PriceTable::builtin()).unwrap()
}

async fn scan(fixture: &str) -> cloudsweep::scan::ScanOutput {
    let provider = FixtureProvider::from_json_str(fixture).unwrap();
    run_scan(&provider, &model(), Duration::from_secs(30))
        .await
        .unwrap()
}

/// Covers the kinds the AWS provider does not enumerate.
const GLOBAL_KINDS_FIXTURE: &str = r#"{
    "account": { "account_id": "123456789012", "user_arn": "arn:aws:iam::123456789012:user/ci" },
    "region": "us-east-1",
    "resources": [
        { "id": "E2EXAMPLE", "kind": "CLOUDFRONT_DISTRIBUTION", "region": "global",
          "age_days": 120,
          "attributes": { "enabled": true, "price_class": "PriceClass_100" } },
        { "id": "search-logs", "kind": "ELASTICSEARCH_DOMAIN", "region": "us-east-1",
          "age_days": 200,
          "attributes": { "instance_type": "t3.medium.search", "instance_count": 1,
                          "storage_gb": 50, "storage_type": "gp3" } },
        { "id": "orders-api", "kind": "API_GATEWAY", "region": "us-east-1",
          "age_days": 90, "attributes": { "stage_count": 2 } },
        { "id": "/aws/lambda/old", "kind": "CLOUDWATCH_LOG_GROUP", "region": "us-east-1",
          "age_days": 400, "attributes": { "stored_gb": 8.0 } }
    ],
    "metrics": {
        "E2EXAMPLE": [0.0, 0.0, 0.0],
        "search-logs": [0.0, 0.0],
        "orders-api": [0.0, 0.0, 0.0]
    }
}"#;

#[tokio::test]
async fn fixture_only_kinds_flow_end_to_end() {
    let output = scan(GLOBAL_KINDS_FIXTURE).await;
    let kinds: Vec<ResourceKind> = output.aggregated.findings.iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ResourceKind::CloudfrontDistribution,
            ResourceKind::ElasticsearchDomain,
            ResourceKind::ApiGateway,
            ResourceKind::CloudwatchLogGroup,
        ]
    );

    let cf = &output.aggregated.findings[0];
    assert_eq!(cf.region, "global");
    // 0.60 class price + 2.00 residual
    assert_eq!(cf.monthly_cost, Some(2.60));

    let es = &output.aggregated.findings[1];
    // 50.00 instance + 50 GB × 0.092
    assert_eq!(es.monthly_cost, Some(54.60));

    let api = &output.aggregated.findings[2];
    assert_eq!(api.monthly_cost, Some(4.00));

    let logs = &output.aggregated.findings[3];
    assert_eq!(logs.monthly_cost, Some(4.00));
}

#[tokio::test]
async fn protective_tags_and_age_gates_suppress_findings() {
    let fixture = r#"{
        "account": { "account_id": "1", "user_arn": "arn" },
        "region": "us-east-1",
        "resources": [
            { "id": "vol-protected", "kind": "EBS_VOLUME", "region": "us-east-1",
              "state": "available", "age_days": 90,
              "tags": { "Production": "true" },
              "attributes": { "size_gb": 100, "volume_type": "gp2" } },
            { "id": "vol-young", "kind": "EBS_VOLUME", "region": "us-east-1",
              "state": "available", "age_days": 2,
              "attributes": { "size_gb": 100, "volume_type": "gp2" } },
            { "id": "vol-waste", "kind": "EBS_VOLUME", "region": "us-east-1",
              "state": "available", "age_days": 90,
              "attributes": { "size_gb": 100, "volume_type": "gp2" } }
        ]
    }"#;
    let output = scan(fixture).await;
    assert_eq!(output.aggregated.findings.len(), 1);
    assert_eq!(output.aggregated.findings[0].resource_id, "vol-waste");
}

#[tokio::test]
async fn reason_lines_embed_monthly_cost() {
    let fixture = r#"{
        "account": { "account_id": "1", "user_arn": "arn" },
        "region": "us-east-1",
        "resources": [
            { "id": "eipalloc-1", "kind": "ELASTIC_IP", "region": "us-east-1",
              "attributes": { "associated": false } },
            { "id": "tg-orphan", "kind": "TARGET_GROUP", "region": "us-east-1",
              "attributes": { "load_balancer_count": 0 } }
        ]
    }"#;
    let output = scan(fixture).await;
    let eip = output
        .aggregated
        .findings
        .iter()
        .find(|f| f.kind == ResourceKind::ElasticIp)
        .unwrap();
    assert!(eip.reason.contains("$3.60/month"), "{}", eip.reason);

    let tg = output
        .aggregated
        .findings
        .iter()
        .find(|f| f.kind == ResourceKind::TargetGroup)
        .unwrap();
    assert_eq!(tg.monthly_cost, Some(0.0));
    assert!(tg.reason.contains("no direct cost"), "{}", tg.reason);
    assert!(tg.pricing_note.is_some());
}

#[tokio::test]
async fn rerunning_scan_yields_identical_report_content() {
    let a = scan(GLOBAL_KINDS_FIXTURE).await;
    let b = scan(GLOBAL_KINDS_FIXTURE).await;

    let ts: chrono::DateTime<chrono::Utc> = "2026-08-26T00:00:00Z".parse().unwrap();
    let report_a = ScanReport::new(a.account, a.region, a.aggregated, "builtin-2024.06", ts);
    let report_b = ScanReport::new(b.account, b.region, b.aggregated, "builtin-2024.06", ts);
    assert_eq!(
        report_a.to_json_pretty().unwrap(),
        report_b.to_json_pretty().unwrap()
    );
}

#[tokio::test]
async fn report_artifact_round_trips_from_disk() {
    let output = scan(GLOBAL_KINDS_FIXTURE).await;
    let report = ScanReport::new(
        output.account,
        output.region,
        output.aggregated,
        "builtin-2024.06",
        chrono::Utc::now(),
    );

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("report.json");
    report.save(&path).unwrap();

    let loaded: ScanReport =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(loaded.savings_summary, report.savings_summary);
    assert_eq!(loaded.waste_items.len(), report.waste_items.len());
    assert_eq!(loaded.price_table_version, "builtin-2024.06");
}
