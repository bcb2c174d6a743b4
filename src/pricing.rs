//! Cost model: maps a waste finding to a recurring monthly cost estimate
//!
//! Pricing is query-free: every number comes from an immutable `PriceTable`
//! constructed once at startup (built-in defaults, optionally overridden
//! from a TOML file) and injected into the `CostModel`. Same finding + same
//! table version always produces the same cost, so two reports can be
//! diffed meaningfully.
//!
//! Three pricing shapes cover every kind, plus an explicit zero-cost case:
//! - Capacity: unit price × quantity (GB, stages, ...)
//! - FlatRecurring: hourly rate × 720 (the fixed 24 × 30 accounting month)
//! - ClassIndexed: class key → monthly price, with a mandatory fallback
//!
//! Rounding happens once, at the final monthly figure, using
//! round-half-to-even; the annual figure is derived from the rounded
//! monthly so `annual == round(monthly × 12, 2)` always holds.

use crate::error::{Result, SweepError};
use crate::finding::{ResourceKind, WasteFinding};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed accounting month: 24 hours × 30 days. Used everywhere; never
/// substitute calendar-accurate days-in-month.
pub const HOURS_PER_MONTH: f64 = 720.0;

/// Round to the currency minor unit (2 dp) with half-to-even ties.
pub fn round_currency(value: f64) -> f64 {
    let scaled = value * 100.0;
    let floor = scaled.floor();
    let diff = scaled - floor;
    let rounded = if (diff - 0.5).abs() < 1e-9 {
        if (floor as i64) % 2 == 0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        scaled.round()
    };
    rounded / 100.0
}

/// Pricing entry for one resource kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum KindPricing {
    /// `rate × quantity` per month. `rates` holds variant-specific unit
    /// prices (e.g. EBS volume types); unknown variants fall back to
    /// `default_rate`, never to an error.
    Capacity {
        #[serde(default)]
        rates: BTreeMap<String, f64>,
        default_rate: Option<f64>,
        #[serde(default)]
        base_monthly: f64,
        #[serde(default)]
        floor_monthly: f64,
    },
    /// `hourly_rate × 720`.
    FlatRecurring { hourly_rate: Option<f64> },
    /// `classes[class] × count`, falling back to `default_monthly` for
    /// unknown classes. `multipliers` scales by a secondary key (RDS
    /// engine). `storage_rates` adds a capacity component for kinds that
    /// bill instance + storage together.
    ClassIndexed {
        #[serde(default)]
        classes: BTreeMap<String, f64>,
        default_monthly: Option<f64>,
        #[serde(default)]
        multipliers: BTreeMap<String, f64>,
        #[serde(default)]
        storage_rates: BTreeMap<String, f64>,
        #[serde(default)]
        default_storage_rate: f64,
        #[serde(default)]
        base_monthly: f64,
        #[serde(default)]
        floor_monthly: f64,
    },
    /// Kinds with no direct recurring charge still appear in the report
    /// with an explanatory note instead of being silently omitted.
    ZeroCost { note: String },
}

/// Versioned, read-only price table. Loaded once per process; never
/// mutated at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTable {
    pub version: String,
    pub kinds: BTreeMap<ResourceKind, KindPricing>,
}

impl PriceTable {
    /// Built-in default prices (approximate us-east-1 on-demand rates).
    pub fn builtin() -> Self {
        let mut kinds = BTreeMap::new();

        kinds.insert(
            ResourceKind::EbsVolume,
            KindPricing::Capacity {
                rates: BTreeMap::from([
                    ("gp2".to_string(), 0.10),
                    ("gp3".to_string(), 0.08),
                    ("io1".to_string(), 0.125),
                    ("io2".to_string(), 0.125),
                    ("st1".to_string(), 0.045),
                    ("sc1".to_string(), 0.025),
                ]),
                // unknown volume types price as gp2
                default_rate: Some(0.10),
                base_monthly: 0.0,
                floor_monthly: 0.0,
            },
        );
        kinds.insert(
            ResourceKind::EbsSnapshot,
            KindPricing::Capacity {
                rates: BTreeMap::new(),
                default_rate: Some(0.05),
                base_monthly: 0.0,
                floor_monthly: 0.0,
            },
        );
        kinds.insert(
            ResourceKind::ElasticIp,
            KindPricing::FlatRecurring {
                hourly_rate: Some(0.005),
            },
        );
        kinds.insert(
            ResourceKind::LoadBalancer,
            KindPricing::FlatRecurring {
                hourly_rate: Some(0.0225),
            },
        );
        kinds.insert(
            ResourceKind::NatGateway,
            KindPricing::FlatRecurring {
                hourly_rate: Some(0.045),
            },
        );
        // stopped instances still pay for attached EBS volumes (gp3 rate)
        kinds.insert(
            ResourceKind::StoppedInstance,
            KindPricing::Capacity {
                rates: BTreeMap::new(),
                default_rate: Some(0.08),
                base_monthly: 0.0,
                floor_monthly: 0.0,
            },
        );
        kinds.insert(
            ResourceKind::TargetGroup,
            KindPricing::ZeroCost {
                note: "No direct cost - operational cleanup for account hygiene".to_string(),
            },
        );
        kinds.insert(
            ResourceKind::NetworkInterface,
            KindPricing::FlatRecurring {
                hourly_rate: Some(0.005),
            },
        );
        // AMIs bill through their underlying snapshots
        kinds.insert(
            ResourceKind::Ami,
            KindPricing::Capacity {
                rates: BTreeMap::new(),
                default_rate: Some(0.05),
                base_monthly: 0.0,
                floor_monthly: 0.0,
            },
        );
        kinds.insert(
            ResourceKind::RdsInstance,
            KindPricing::ClassIndexed {
                classes: BTreeMap::from([
                    ("db.t3.micro".to_string(), 18.50),
                    ("db.t3.small".to_string(), 37.00),
                    ("db.t3.medium".to_string(), 74.00),
                    ("db.t3.large".to_string(), 148.00),
                    ("db.t3.xlarge".to_string(), 296.00),
                    ("db.t3.2xlarge".to_string(), 592.00),
                    ("db.m5.large".to_string(), 185.00),
                    ("db.m5.xlarge".to_string(), 370.00),
                    ("db.m5.2xlarge".to_string(), 740.00),
                    ("db.m5.4xlarge".to_string(), 1480.00),
                    ("db.r5.large".to_string(), 230.00),
                    ("db.r5.xlarge".to_string(), 460.00),
                    ("db.r5.2xlarge".to_string(), 920.00),
                ]),
                default_monthly: Some(100.00),
                multipliers: BTreeMap::from([
                    ("mysql".to_string(), 1.0),
                    ("postgres".to_string(), 1.0),
                    ("mariadb".to_string(), 1.0),
                    ("oracle-ee".to_string(), 2.5),
                    ("oracle-se2".to_string(), 1.8),
                    ("sqlserver-ee".to_string(), 3.0),
                    ("sqlserver-se".to_string(), 2.0),
                    ("sqlserver-ex".to_string(), 1.0),
                    ("sqlserver-web".to_string(), 1.2),
                ]),
                storage_rates: BTreeMap::from([
                    ("gp2".to_string(), 0.115),
                    ("gp3".to_string(), 0.092),
                    ("io1".to_string(), 0.138),
                    ("io2".to_string(), 0.138),
                    ("magnetic".to_string(), 0.115),
                ]),
                default_storage_rate: 0.115,
                base_monthly: 0.0,
                floor_monthly: 0.0,
            },
        );
        kinds.insert(
            ResourceKind::CloudfrontDistribution,
            KindPricing::ClassIndexed {
                classes: BTreeMap::from([
                    // base 0.60 scaled by price-class coverage
                    ("PriceClass_100".to_string(), 0.60),
                    ("PriceClass_200".to_string(), 0.72),
                    ("PriceClass_All".to_string(), 0.90),
                ]),
                default_monthly: Some(0.90),
                multipliers: BTreeMap::new(),
                storage_rates: BTreeMap::new(),
                default_storage_rate: 0.0,
                // residual traffic on an idle distribution
                base_monthly: 2.00,
                floor_monthly: 0.0,
            },
        );
        kinds.insert(
            ResourceKind::LambdaFunction,
            KindPricing::ClassIndexed {
                classes: BTreeMap::new(),
                // small base cost carried by an unused function
                default_monthly: Some(0.50),
                multipliers: BTreeMap::new(),
                storage_rates: BTreeMap::new(),
                default_storage_rate: 0.0,
                base_monthly: 0.0,
                floor_monthly: 0.10,
            },
        );
        kinds.insert(
            ResourceKind::S3Bucket,
            KindPricing::Capacity {
                rates: BTreeMap::new(),
                default_rate: Some(0.023),
                base_monthly: 0.10,
                floor_monthly: 0.10,
            },
        );
        kinds.insert(
            ResourceKind::EcsService,
            KindPricing::ClassIndexed {
                classes: BTreeMap::from([
                    // Fargate priced per task, EC2 launch type per service
                    ("FARGATE".to_string(), 25.00),
                    ("EC2".to_string(), 5.00),
                ]),
                default_monthly: Some(5.00),
                multipliers: BTreeMap::new(),
                storage_rates: BTreeMap::new(),
                default_storage_rate: 0.0,
                base_monthly: 0.0,
                floor_monthly: 1.00,
            },
        );
        kinds.insert(
            ResourceKind::RedshiftCluster,
            KindPricing::ClassIndexed {
                classes: BTreeMap::from([
                    ("dc2.large".to_string(), 180.00),
                    ("dc2.8xlarge".to_string(), 4800.00),
                    ("ds2.xlarge".to_string(), 850.00),
                    ("ds2.8xlarge".to_string(), 6800.00),
                    ("ra3.xlplus".to_string(), 3250.00),
                    ("ra3.4xlarge".to_string(), 13000.00),
                    ("ra3.16xlarge".to_string(), 52000.00),
                ]),
                default_monthly: Some(500.00),
                multipliers: BTreeMap::new(),
                storage_rates: BTreeMap::new(),
                default_storage_rate: 0.024,
                base_monthly: 0.0,
                floor_monthly: 0.0,
            },
        );
        kinds.insert(
            ResourceKind::ElasticsearchDomain,
            KindPricing::ClassIndexed {
                classes: BTreeMap::from([
                    ("t3.small.elasticsearch".to_string(), 25.00),
                    ("t3.medium.elasticsearch".to_string(), 50.00),
                    ("m5.large.elasticsearch".to_string(), 120.00),
                    ("m5.xlarge.elasticsearch".to_string(), 240.00),
                    ("m5.2xlarge.elasticsearch".to_string(), 480.00),
                    ("r5.large.elasticsearch".to_string(), 150.00),
                    ("r5.xlarge.elasticsearch".to_string(), 300.00),
                    ("r5.2xlarge.elasticsearch".to_string(), 600.00),
                    ("t3.small.search".to_string(), 25.00),
                    ("t3.medium.search".to_string(), 50.00),
                    ("m5.large.search".to_string(), 120.00),
                    ("m5.xlarge.search".to_string(), 240.00),
                    ("m5.2xlarge.search".to_string(), 480.00),
                    ("r5.large.search".to_string(), 150.00),
                    ("r5.xlarge.search".to_string(), 300.00),
                    ("r5.2xlarge.search".to_string(), 600.00),
                ]),
                default_monthly: Some(50.00),
                multipliers: BTreeMap::new(),
                storage_rates: BTreeMap::from([
                    ("gp2".to_string(), 0.115),
                    ("gp3".to_string(), 0.092),
                ]),
                default_storage_rate: 0.115,
                base_monthly: 0.0,
                floor_monthly: 10.00,
            },
        );
        kinds.insert(
            ResourceKind::ApiGateway,
            KindPricing::Capacity {
                rates: BTreeMap::new(),
                // per stage per month
                default_rate: Some(1.00),
                base_monthly: 2.00,
                floor_monthly: 0.0,
            },
        );
        kinds.insert(
            ResourceKind::CloudwatchLogGroup,
            KindPricing::Capacity {
                rates: BTreeMap::new(),
                default_rate: Some(0.50),
                base_monthly: 0.0,
                floor_monthly: 0.10,
            },
        );

        Self {
            version: "builtin-2024.06".to_string(),
            kinds,
        }
    }

    /// Parse a full table from TOML (the override file replaces the
    /// built-in table wholesale; partial overrides would make the version
    /// string meaningless).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: PriceTable = toml::from_str(content).map_err(|e| {
            SweepError::Config(crate::error::ConfigError::ParseError(format!(
                "price table: {e}"
            )))
        })?;
        Ok(table)
    }

    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn entry(&self, kind: ResourceKind) -> Result<&KindPricing> {
        self.kinds.get(&kind).ok_or_else(|| SweepError::CostConfig {
            kind,
            message: "no pricing entry".to_string(),
        })
    }

    /// Startup validation: every supported kind must have an entry with a
    /// usable default. The system refuses to start on an incomplete table;
    /// per-finding pricing never fails on this.
    pub fn validate(&self) -> Result<()> {
        for kind in ResourceKind::ALL {
            let entry = self.entry(kind)?;
            match entry {
                KindPricing::Capacity {
                    rates,
                    default_rate,
                    base_monthly,
                    floor_monthly,
                } => {
                    let rate = default_rate.ok_or_else(|| SweepError::CostConfig {
                        kind,
                        message: "capacity pricing has no default rate".to_string(),
                    })?;
                    for v in rates.values().chain([&rate, base_monthly, floor_monthly]) {
                        check_price(kind, *v)?;
                    }
                }
                KindPricing::FlatRecurring { hourly_rate } => {
                    let rate = hourly_rate.ok_or_else(|| SweepError::CostConfig {
                        kind,
                        message: "flat recurring pricing has no hourly rate".to_string(),
                    })?;
                    check_price(kind, rate)?;
                }
                KindPricing::ClassIndexed {
                    classes,
                    default_monthly,
                    multipliers,
                    storage_rates,
                    default_storage_rate,
                    base_monthly,
                    floor_monthly,
                } => {
                    let default = default_monthly.ok_or_else(|| SweepError::CostConfig {
                        kind,
                        message: "class-indexed pricing has no default price".to_string(),
                    })?;
                    for v in classes
                        .values()
                        .chain(multipliers.values())
                        .chain(storage_rates.values())
                        .chain([&default, default_storage_rate, base_monthly, floor_monthly])
                    {
                        check_price(kind, *v)?;
                    }
                }
                KindPricing::ZeroCost { .. } => {}
            }
        }
        Ok(())
    }
}

fn check_price(kind: ResourceKind, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SweepError::CostConfig {
            kind,
            message: format!("invalid price value {value}"),
        });
    }
    Ok(())
}

/// Result of pricing one finding.
#[derive(Debug, Clone, PartialEq)]
pub struct CostEstimate {
    pub monthly_cost: f64,
    pub annual_cost: f64,
    /// The unit price consulted (per GB-month, per hour, or per
    /// class-month), for auditability.
    pub unit_price: Option<f64>,
    pub note: Option<String>,
}

impl CostEstimate {
    fn from_monthly(raw_monthly: f64, unit_price: Option<f64>, note: Option<String>) -> Self {
        let monthly_cost = round_currency(raw_monthly.max(0.0));
        let annual_cost = round_currency(monthly_cost * 12.0);
        Self {
            monthly_cost,
            annual_cost,
            unit_price,
            note,
        }
    }
}

/// Pure, deterministic cost estimator over an injected, validated table.
#[derive(Debug, Clone)]
pub struct CostModel {
    table: PriceTable,
}

impl CostModel {
    /// Validates the table; an incomplete table is rejected here, at
    /// startup, never at per-finding time.
    pub fn new(table: PriceTable) -> Result<Self> {
        table.validate()?;
        Ok(Self { table })
    }

    pub fn table_version(&self) -> &str {
        &self.table.version
    }

    /// Estimate the monthly cost of one finding. Missing attributes fall
    /// back to policy defaults (unknown EBS volume type prices as gp2,
    /// unknown quantities as zero) rather than failing the scan.
    pub fn estimate(&self, finding: &WasteFinding) -> Result<CostEstimate> {
        let entry = self.table.entry(finding.kind)?;
        let estimate = match entry {
            KindPricing::ZeroCost { note } => CostEstimate {
                monthly_cost: 0.0,
                annual_cost: 0.0,
                unit_price: None,
                note: Some(note.clone()),
            },
            KindPricing::FlatRecurring { hourly_rate } => {
                let rate = hourly_rate.unwrap_or(0.0);
                CostEstimate::from_monthly(rate * HOURS_PER_MONTH, Some(rate), None)
            }
            KindPricing::Capacity {
                rates,
                default_rate,
                base_monthly,
                floor_monthly,
            } => {
                let default = default_rate.unwrap_or(0.0);
                let (quantity, variant) = capacity_quantity(finding);
                let rate = variant
                    .and_then(|v| rates.get(v).copied())
                    .unwrap_or(default);
                let raw = (rate * quantity + base_monthly).max(*floor_monthly);
                let note = if quantity == 0.0 {
                    Some("quantity unknown, priced at zero usage".to_string())
                } else {
                    None
                };
                CostEstimate::from_monthly(raw, Some(rate), note)
            }
            KindPricing::ClassIndexed {
                classes,
                default_monthly,
                multipliers,
                storage_rates,
                default_storage_rate,
                base_monthly,
                floor_monthly,
            } => self.estimate_class_indexed(
                finding,
                classes,
                default_monthly.unwrap_or(0.0),
                multipliers,
                storage_rates,
                *default_storage_rate,
                *base_monthly,
                *floor_monthly,
            ),
        };
        Ok(estimate)
    }

    #[allow(clippy::too_many_arguments)]
    fn estimate_class_indexed(
        &self,
        finding: &WasteFinding,
        classes: &BTreeMap<String, f64>,
        default_monthly: f64,
        multipliers: &BTreeMap<String, f64>,
        storage_rates: &BTreeMap<String, f64>,
        default_storage_rate: f64,
        base_monthly: f64,
        floor_monthly: f64,
    ) -> CostEstimate {
        match finding.kind {
            ResourceKind::RdsInstance => {
                // Stopped instances bill storage only; running-but-idle
                // instances bill the full class price scaled by engine.
                if finding.attr_str("status") == Some("stopped") {
                    let storage_gb = finding.attr_f64("storage_gb").unwrap_or(0.0);
                    let rate = finding
                        .attr_str("storage_type")
                        .and_then(|t| storage_rates.get(t).copied())
                        .unwrap_or(default_storage_rate);
                    CostEstimate::from_monthly(
                        storage_gb * rate,
                        Some(rate),
                        Some("storage cost while stopped".to_string()),
                    )
                } else {
                    let class_price = finding
                        .attr_str("instance_class")
                        .and_then(|c| classes.get(c).copied())
                        .unwrap_or(default_monthly);
                    let multiplier = finding
                        .attr_str("engine")
                        .and_then(|e| multipliers.get(e).copied())
                        .unwrap_or(1.0);
                    CostEstimate::from_monthly(
                        class_price * multiplier,
                        Some(class_price),
                        None,
                    )
                }
            }
            ResourceKind::LambdaFunction => {
                // Over-provisioned functions carry the classifier's savings
                // delta; unused functions carry the flat base cost.
                if let Some(savings) = finding.attr_f64("estimated_monthly_savings") {
                    CostEstimate::from_monthly(
                        savings.max(floor_monthly),
                        None,
                        Some("savings from right-sizing memory".to_string()),
                    )
                } else {
                    CostEstimate::from_monthly(
                        default_monthly.max(floor_monthly),
                        Some(default_monthly),
                        None,
                    )
                }
            }
            ResourceKind::EcsService => {
                let launch_type = finding.attr_str("launch_type").unwrap_or("EC2");
                let class_price = classes.get(launch_type).copied().unwrap_or(default_monthly);
                let raw = if launch_type == "FARGATE" {
                    let tasks = finding.attr_f64("running_count").unwrap_or(0.0);
                    class_price * tasks
                } else {
                    class_price
                };
                CostEstimate::from_monthly(raw.max(floor_monthly), Some(class_price), None)
            }
            ResourceKind::RedshiftCluster => {
                let nodes = finding.attr_f64("node_count").unwrap_or(1.0).max(1.0);
                let node_type = finding.attr_str("node_type").unwrap_or("");
                if finding.attr_str("status") == Some("paused") {
                    // paused clusters bill managed storage only
                    let storage_gb = redshift_storage_estimate_gb(node_type) * nodes;
                    let raw = (storage_gb * default_storage_rate).max(10.0);
                    CostEstimate::from_monthly(
                        raw,
                        Some(default_storage_rate),
                        Some("storage cost while paused".to_string()),
                    )
                } else {
                    let class_price = classes.get(node_type).copied().unwrap_or(default_monthly);
                    let fraction = finding.attr_f64("savings_fraction").unwrap_or(1.0);
                    let raw = (class_price * nodes * fraction).max(50.0);
                    let note = if fraction < 1.0 {
                        Some("estimated savings from downsizing".to_string())
                    } else {
                        None
                    };
                    CostEstimate::from_monthly(raw, Some(class_price), note)
                }
            }
            ResourceKind::ElasticsearchDomain => {
                let count = finding.attr_f64("instance_count").unwrap_or(1.0).max(1.0);
                let class_price = finding
                    .attr_str("instance_type")
                    .and_then(|t| classes.get(t).copied())
                    .unwrap_or(default_monthly);
                let storage_gb = finding.attr_f64("storage_gb").unwrap_or(0.0);
                let storage_rate = finding
                    .attr_str("storage_type")
                    .and_then(|t| storage_rates.get(t).copied())
                    .unwrap_or(default_storage_rate);
                let raw = (class_price * count + storage_gb * storage_rate + base_monthly)
                    .max(floor_monthly);
                CostEstimate::from_monthly(raw, Some(class_price), None)
            }
            _ => {
                // plain class lookup for anything else (CloudFront price
                // class, future class-indexed kinds)
                let class_price = finding
                    .attr_str("price_class")
                    .or_else(|| finding.attr_str("instance_class"))
                    .and_then(|c| classes.get(c).copied())
                    .unwrap_or(default_monthly);
                CostEstimate::from_monthly(
                    (class_price + base_monthly).max(floor_monthly),
                    Some(class_price),
                    None,
                )
            }
        }
    }

    /// Attach cost fields to a finding and embed the monthly figure in the
    /// reason line. The finding is otherwise unchanged.
    pub fn annotate(&self, mut finding: WasteFinding) -> Result<WasteFinding> {
        let estimate = self.estimate(&finding)?;
        finding.reason = if estimate.monthly_cost == 0.0 {
            format!("{} (no direct cost)", finding.reason)
        } else {
            format!("{} (${:.2}/month)", finding.reason, estimate.monthly_cost)
        };
        finding.monthly_cost = Some(estimate.monthly_cost);
        finding.annual_cost = Some(estimate.annual_cost);
        finding.unit_price = estimate.unit_price;
        finding.pricing_note = estimate.note;
        Ok(finding)
    }
}

/// The quantity attribute and optional variant key a capacity-shaped kind
/// is priced on.
fn capacity_quantity(finding: &WasteFinding) -> (f64, Option<&str>) {
    match finding.kind {
        ResourceKind::EbsVolume => (
            finding.attr_f64("size_gb").unwrap_or(0.0),
            finding.attr_str("volume_type"),
        ),
        ResourceKind::EbsSnapshot => (finding.attr_f64("size_gb").unwrap_or(0.0), None),
        ResourceKind::StoppedInstance | ResourceKind::Ami => {
            (finding.attr_f64("storage_gb").unwrap_or(0.0), None)
        }
        ResourceKind::S3Bucket => (finding.attr_f64("storage_gb").unwrap_or(0.0), None),
        ResourceKind::ApiGateway => (finding.attr_f64("stage_count").unwrap_or(0.0), None),
        ResourceKind::CloudwatchLogGroup => (finding.attr_f64("stored_gb").unwrap_or(0.0), None),
        _ => (0.0, None),
    }
}

/// Storage footprint estimate per Redshift node, by node family.
fn redshift_storage_estimate_gb(node_type: &str) -> f64 {
    if node_type.starts_with("dc2") {
        if node_type.ends_with("large") && !node_type.contains("8xlarge") {
            160.0
        } else {
            2560.0
        }
    } else if node_type.starts_with("ds2") {
        if node_type.contains("8xlarge") {
            16000.0
        } else {
            2000.0
        }
    } else {
        1000.0
    }
}
