//! Aggregator contract: partial-failure tolerance, uniqueness, totals.

use cloudsweep::aggregate::{aggregate, summarize, KindOutcome};
use cloudsweep::error::SweepError;
use cloudsweep::finding::{Age, Confidence, ResourceKind, WasteFinding};
use cloudsweep::pricing::{CostModel, PriceTable};

fn model() -> CostModel {
    CostModel::new(PriceTable::builtin()).unwrap()
}

fn priced(kind: ResourceKind, id: &str, attrs: &[(&str, f64)]) -> WasteFinding {
    let mut f = WasteFinding::new(kind, id, "us-east-1", Age::Days(60), Confidence::High, "test")
        .unwrap();
    for (name, value) in attrs {
        f = f.with_attr(name, *value);
    }
    model().annotate(f).unwrap()
}

#[test]
fn end_to_end_savings_scenario() {
    // one 100 GB gp2 volume + one Elastic IP = 10.00 + 3.60
    let volume = model()
        .annotate(
            WasteFinding::new(
                ResourceKind::EbsVolume,
                "vol-1",
                "us-east-1",
                Age::Days(40),
                Confidence::High,
                "detached",
            )
            .unwrap()
            .with_attr("size_gb", 100)
            .with_attr("volume_type", "gp2"),
        )
        .unwrap();
    let eip = priced(ResourceKind::ElasticIp, "eipalloc-1", &[]);

    let agg = aggregate(vec![
        KindOutcome::ok(ResourceKind::EbsVolume, vec![volume]),
        KindOutcome::ok(ResourceKind::ElasticIp, vec![eip]),
    ]);

    assert_eq!(agg.summary.total_monthly_savings, 13.60);
    assert_eq!(agg.summary.total_annual_savings, 163.20);
    assert_eq!(agg.summary.breakdown.len(), 2);
    assert_eq!(agg.summary.breakdown[&ResourceKind::EbsVolume].count, 1);
    assert_eq!(
        agg.summary.breakdown[&ResourceKind::EbsVolume].monthly_cost,
        10.00
    );
    assert_eq!(agg.summary.breakdown[&ResourceKind::ElasticIp].count, 1);
}

#[test]
fn one_failed_kind_does_not_affect_others() {
    let ok = priced(ResourceKind::ElasticIp, "eipalloc-1", &[]);
    let with_failure = aggregate(vec![
        KindOutcome::ok(ResourceKind::ElasticIp, vec![ok.clone()]),
        KindOutcome::err(
            ResourceKind::RdsInstance,
            SweepError::api_for_kind(ResourceKind::RdsInstance, "DescribeDBInstances", "denied"),
        ),
    ]);
    let without_failure = aggregate(vec![KindOutcome::ok(ResourceKind::ElasticIp, vec![ok])]);

    assert_eq!(
        with_failure.summary.total_monthly_savings,
        without_failure.summary.total_monthly_savings
    );
    assert_eq!(with_failure.findings.len(), without_failure.findings.len());
    assert_eq!(with_failure.warnings.len(), 1);
}

#[test]
fn all_kinds_failed_yields_empty_summary_not_panic() {
    let outcomes: Vec<KindOutcome> = ResourceKind::ALL
        .into_iter()
        .map(|kind| {
            KindOutcome::err(
                kind,
                SweepError::api_for_kind(kind, "List", "denied"),
            )
        })
        .collect();
    let agg = aggregate(outcomes);
    assert!(agg.findings.is_empty());
    assert_eq!(agg.summary.total_monthly_savings, 0.0);
    assert_eq!(agg.warnings.len(), ResourceKind::ALL.len());
}

#[test]
fn breakdown_counts_match_findings() {
    let agg = aggregate(vec![
        KindOutcome::ok(
            ResourceKind::EbsSnapshot,
            vec![
                priced(ResourceKind::EbsSnapshot, "snap-1", &[("size_gb", 10.0)]),
                priced(ResourceKind::EbsSnapshot, "snap-2", &[("size_gb", 20.0)]),
            ],
        ),
        KindOutcome::ok(
            ResourceKind::TargetGroup,
            vec![priced(ResourceKind::TargetGroup, "tg-1", &[])],
        ),
    ]);
    for (kind, slice) in &agg.summary.breakdown {
        let count = agg.findings.iter().filter(|f| f.kind == *kind).count();
        assert_eq!(slice.count, count);
    }
    // zero-cost kind present with exact zero
    assert_eq!(
        agg.summary.breakdown[&ResourceKind::TargetGroup].monthly_cost,
        0.0
    );
}

#[test]
fn summarize_is_idempotent() {
    let findings = vec![
        priced(ResourceKind::ElasticIp, "eip-1", &[]),
        priced(ResourceKind::NatGateway, "nat-1", &[]),
        priced(ResourceKind::EbsSnapshot, "snap-1", &[("size_gb", 100.0)]),
    ];
    let a = summarize(&findings);
    let b = summarize(&findings);
    assert_eq!(a, b);
    assert_eq!(a.total_annual_savings, cloudsweep::pricing::round_currency(a.total_monthly_savings * 12.0));
}
