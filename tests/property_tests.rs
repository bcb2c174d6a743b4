//! Property-based tests for the cost model and aggregator.

use cloudsweep::aggregate::{aggregate, KindOutcome};
use cloudsweep::finding::{Age, Confidence, ResourceKind, WasteFinding};
use cloudsweep::pricing::{round_currency, CostModel, PriceTable};
use proptest::prelude::*;

fn model() -> CostModel {
    CostModel::new(PriceTable::builtin()).unwrap()
}

fn volume_finding(size_gb: u32, volume_type: &str) -> WasteFinding {
    WasteFinding::new(
        ResourceKind::EbsVolume,
        "vol-prop",
        "us-east-1",
        Age::Days(30),
        Confidence::High,
        "detached",
    )
    .unwrap()
    .with_attr("size_gb", size_gb)
    .with_attr("volume_type", volume_type)
}

proptest! {
    #[test]
    fn costs_never_negative_and_annual_consistent(
        size_gb in 0u32..100_000u32,
        volume_type in "[a-z]{2,4}[0-9]?"
    ) {
        let est = model().estimate(&volume_finding(size_gb, &volume_type)).unwrap();
        prop_assert!(est.monthly_cost >= 0.0);
        prop_assert_eq!(est.annual_cost, round_currency(est.monthly_cost * 12.0));
    }

    #[test]
    fn capacity_pricing_scales_linearly(size_gb in 1u32..10_000u32) {
        let m = model();
        let single = m.estimate(&volume_finding(size_gb, "gp2")).unwrap();
        let double = m.estimate(&volume_finding(size_gb * 2, "gp2")).unwrap();
        // both are exact multiples of the 0.10 unit price, so doubling is exact
        prop_assert_eq!(double.monthly_cost, round_currency(single.monthly_cost * 2.0));
    }

    #[test]
    fn unknown_volume_types_price_as_gp2(size_gb in 1u32..10_000u32, suffix in "[x-z]{3}") {
        let m = model();
        let exotic = m.estimate(&volume_finding(size_gb, &suffix)).unwrap();
        let gp2 = m.estimate(&volume_finding(size_gb, "gp2")).unwrap();
        prop_assert_eq!(exotic.monthly_cost, gp2.monthly_cost);
    }

    #[test]
    fn round_currency_is_idempotent_and_close(value in 0.0f64..1_000_000.0f64) {
        let rounded = round_currency(value);
        prop_assert_eq!(round_currency(rounded), rounded);
        prop_assert!((rounded - value).abs() <= 0.005 + 1e-9);
    }

    #[test]
    fn breakdown_always_sums_to_total(costs in prop::collection::vec(0.0f64..10_000.0f64, 0..40)) {
        let findings: Vec<WasteFinding> = costs
            .iter()
            .enumerate()
            .map(|(i, cost)| {
                let kind = ResourceKind::ALL[i % ResourceKind::ALL.len()];
                let mut f = WasteFinding::new(
                    kind,
                    format!("res-{i}"),
                    "us-east-1",
                    Age::Days(60),
                    Confidence::High,
                    "test",
                )
                .unwrap();
                f.monthly_cost = Some(round_currency(*cost));
                f
            })
            .collect();

        let mut by_kind: std::collections::BTreeMap<ResourceKind, Vec<WasteFinding>> =
            std::collections::BTreeMap::new();
        for f in findings {
            by_kind.entry(f.kind).or_default().push(f);
        }
        let outcomes: Vec<KindOutcome> = by_kind
            .into_iter()
            .map(|(kind, fs)| KindOutcome::ok(kind, fs))
            .collect();

        let agg = aggregate(outcomes);
        let breakdown_sum: f64 = agg.summary.breakdown.values().map(|b| b.monthly_cost).sum();
        prop_assert!((breakdown_sum - agg.summary.total_monthly_savings).abs() < 0.01);

        for (kind, slice) in &agg.summary.breakdown {
            let count = agg.findings.iter().filter(|f| f.kind == *kind).count();
            prop_assert_eq!(slice.count, count);
        }
    }

    #[test]
    fn aggregation_commutes_over_input_order(seed in 0u64..1_000u64) {
        let make_outcomes = |reverse: bool| {
            let mut outcomes = vec![
                KindOutcome::ok(ResourceKind::EbsVolume, vec![{
                    let mut f = volume_finding((seed % 500) as u32 + 1, "gp2");
                    f.monthly_cost = Some(round_currency(seed as f64 * 0.07));
                    f
                }]),
                KindOutcome::ok(ResourceKind::ElasticIp, vec![{
                    let mut f = WasteFinding::new(
                        ResourceKind::ElasticIp,
                        "eip-prop",
                        "us-east-1",
                        Age::Unknown,
                        Confidence::High,
                        "unassociated",
                    )
                    .unwrap();
                    f.monthly_cost = Some(3.60);
                    f
                }]),
            ];
            if reverse {
                outcomes.reverse();
            }
            outcomes
        };

        let forward = aggregate(make_outcomes(false));
        let reversed = aggregate(make_outcomes(true));
        prop_assert_eq!(forward.summary, reversed.summary);
        let ids: Vec<String> = forward.findings.iter().map(|f| f.resource_id.clone()).collect();
        let ids_rev: Vec<String> = reversed.findings.iter().map(|f| f.resource_id.clone()).collect();
        prop_assert_eq!(ids, ids_rev);
    }
}
