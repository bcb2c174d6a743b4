//! Aggregation of per-kind classifier outcomes
//!
//! The aggregator is the single merge point of the pipeline. It accepts
//! one `Result` per kind so a single failed service (missing IAM
//! permission, throttling) shrinks the report instead of blanking it,
//! enforces the (kind, id, region) uniqueness invariant, and computes the
//! savings totals once, after all per-finding costs are final:
//! collect-then-reduce, never a running total.
//!
//! The aggregator trusts classifiers on cross-kind exclusions (an AMI's
//! snapshots never also appear under EBS_SNAPSHOT); it performs no
//! deduplication heuristic of its own beyond the uniqueness invariant.

use crate::error::SweepError;
use crate::finding::{ResourceKind, WasteFinding};
use crate::pricing::round_currency;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// What one classifier run produced for its kind.
#[derive(Debug)]
pub struct KindOutcome {
    pub kind: ResourceKind,
    pub result: std::result::Result<Vec<WasteFinding>, SweepError>,
}

impl KindOutcome {
    pub fn ok(kind: ResourceKind, findings: Vec<WasteFinding>) -> Self {
        Self {
            kind,
            result: Ok(findings),
        }
    }

    pub fn err(kind: ResourceKind, error: SweepError) -> Self {
        Self {
            kind,
            result: Err(error),
        }
    }
}

/// Per-kind slice of the savings summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindBreakdown {
    pub count: usize,
    pub monthly_cost: f64,
}

/// Totals over one scan. Recomputed fresh every run, never incrementally
/// updated. `total_annual_savings` is derived from the monthly total, not
/// re-summed independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsSummary {
    pub total_monthly_savings: f64,
    pub total_annual_savings: f64,
    pub breakdown: BTreeMap<ResourceKind, KindBreakdown>,
}

/// A non-fatal problem recorded alongside the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ResourceKind>,
    pub message: String,
}

/// Aggregation output: ordered findings, summary, and warnings from
/// failed kinds or dropped duplicates.
#[derive(Debug)]
pub struct Aggregated {
    pub findings: Vec<WasteFinding>,
    pub summary: SavingsSummary,
    pub warnings: Vec<ScanWarning>,
}

/// Merge per-kind outcomes. Outcomes may arrive in any order (classifiers
/// commute); output is grouped in declared kind order, findings within a
/// kind in the order their classifier returned them.
pub fn aggregate(mut outcomes: Vec<KindOutcome>) -> Aggregated {
    outcomes.sort_by_key(|o| o.kind as usize);

    let mut findings: Vec<WasteFinding> = Vec::new();
    let mut warnings: Vec<ScanWarning> = Vec::new();
    let mut seen: HashSet<(ResourceKind, String, String)> = HashSet::new();

    for outcome in outcomes {
        match outcome.result {
            Ok(kind_findings) => {
                for finding in kind_findings {
                    if finding.kind != outcome.kind {
                        warn!(
                            expected = %outcome.kind,
                            got = %finding.kind,
                            resource_id = %finding.resource_id,
                            "classifier emitted a finding for the wrong kind, dropping"
                        );
                        warnings.push(ScanWarning {
                            kind: Some(outcome.kind),
                            message: format!(
                                "dropped finding {} with mismatched kind {}",
                                finding.resource_id, finding.kind
                            ),
                        });
                        continue;
                    }
                    let key = (
                        finding.kind,
                        finding.resource_id.clone(),
                        finding.region.clone(),
                    );
                    if !seen.insert(key) {
                        // a duplicate is a classifier defect; it must not
                        // blank an otherwise-good report
                        warn!(
                            kind = %finding.kind,
                            resource_id = %finding.resource_id,
                            "duplicate finding dropped, first occurrence kept"
                        );
                        warnings.push(ScanWarning {
                            kind: Some(finding.kind),
                            message: format!(
                                "duplicate finding for {} in {} dropped",
                                finding.resource_id, finding.region
                            ),
                        });
                        continue;
                    }
                    findings.push(finding);
                }
            }
            Err(error) => {
                warn!(kind = %outcome.kind, %error, "kind failed, continuing without it");
                warnings.push(ScanWarning {
                    kind: Some(outcome.kind),
                    message: format!("{} scan failed: {error}", outcome.kind),
                });
            }
        }
    }

    let summary = summarize(&findings);
    Aggregated {
        findings,
        summary,
        warnings,
    }
}

/// Compute the savings summary over finalized findings. Pure; called once
/// per aggregation and directly by tests.
pub fn summarize(findings: &[WasteFinding]) -> SavingsSummary {
    let mut breakdown: BTreeMap<ResourceKind, KindBreakdown> = BTreeMap::new();
    for finding in findings {
        let entry = breakdown.entry(finding.kind).or_insert(KindBreakdown {
            count: 0,
            monthly_cost: 0.0,
        });
        entry.count += 1;
        entry.monthly_cost += finding.monthly_cost.unwrap_or(0.0);
    }
    for entry in breakdown.values_mut() {
        entry.monthly_cost = round_currency(entry.monthly_cost);
    }

    let total: f64 = findings.iter().filter_map(|f| f.monthly_cost).sum();
    let total_monthly_savings = round_currency(total);
    let total_annual_savings = round_currency(total_monthly_savings * 12.0);

    SavingsSummary {
        total_monthly_savings,
        total_annual_savings,
        breakdown,
    }
}
