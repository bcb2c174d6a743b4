//! Waste classifiers, one per resource kind
//!
//! A classifier is a pure function: (descriptor, optional metric series)
//! → zero-or-one finding. All provider I/O happens before this layer; the
//! scan pipeline fetches descriptors and series, then calls `classify`.
//!
//! Double-count exclusions happen here, at the source:
//! - snapshots referenced by an AMI are skipped; the AMI classifier
//!   prices its own snapshot storage instead,
//! - stopped instances are priced on attached-volume storage only, and
//!   detached volumes are a separate kind so the two never overlap.
//!
//! Conservative bias throughout: a missing or empty metric series means
//! "assume active" and produces no finding.

use crate::error::Result;
use crate::finding::{Age, Confidence, ResourceKind, WasteFinding};
use crate::policy::{has_protective_tag, idle_signal, passes_age_gate, policy_for, IdleSignal};
use crate::provider::ResourceDescriptor;

/// CPU-percentage ceiling below which a running service counts as idle.
const LOW_CPU_PCT: f64 = 10.0;
/// Lambda memory-utilization ceiling for the over-provisioning heuristic.
const LAMBDA_MEMORY_UTIL_PCT: f64 = 50.0;
/// Lambda GB-second price used for the right-sizing savings delta.
const LAMBDA_GB_SECOND_PRICE: f64 = 0.0000166667;

/// Classify one resource. `datapoints` is the daily utilization series
/// for metric-backed kinds (per `policy::MetricPolicy`), `None` when the
/// query failed or the kind is structural.
pub fn classify(
    descriptor: &ResourceDescriptor,
    datapoints: Option<&[f64]>,
) -> Result<Option<WasteFinding>> {
    let policy = policy_for(descriptor.kind);

    if !passes_age_gate(descriptor.age_days, policy) {
        return Ok(None);
    }
    if policy.protective_tags && has_protective_tag(&descriptor.tags) {
        return Ok(None);
    }

    match descriptor.kind {
        ResourceKind::EbsVolume => ebs_volume(descriptor),
        ResourceKind::EbsSnapshot => ebs_snapshot(descriptor),
        ResourceKind::ElasticIp => elastic_ip(descriptor),
        ResourceKind::LoadBalancer => load_balancer(descriptor),
        ResourceKind::NatGateway => nat_gateway(descriptor),
        ResourceKind::StoppedInstance => stopped_instance(descriptor),
        ResourceKind::TargetGroup => target_group(descriptor),
        ResourceKind::NetworkInterface => network_interface(descriptor),
        ResourceKind::Ami => ami(descriptor),
        ResourceKind::RdsInstance => rds_instance(descriptor, datapoints),
        ResourceKind::CloudfrontDistribution => cloudfront_distribution(descriptor, datapoints),
        ResourceKind::LambdaFunction => lambda_function(descriptor, datapoints),
        ResourceKind::S3Bucket => s3_bucket(descriptor, datapoints),
        ResourceKind::EcsService => ecs_service(descriptor, datapoints),
        ResourceKind::RedshiftCluster => redshift_cluster(descriptor, datapoints),
        ResourceKind::ElasticsearchDomain => elasticsearch_domain(descriptor, datapoints),
        ResourceKind::ApiGateway => api_gateway(descriptor, datapoints),
        ResourceKind::CloudwatchLogGroup => cloudwatch_log_group(descriptor),
    }
}

fn age_phrase(age: Age) -> String {
    match age {
        Age::Days(d) => format!("{d} days"),
        Age::Unknown => "an unknown period".to_string(),
    }
}

fn base_finding(
    descriptor: &ResourceDescriptor,
    confidence: Confidence,
    reason: impl Into<String>,
) -> Result<WasteFinding> {
    let mut finding = WasteFinding::new(
        descriptor.kind,
        descriptor.id.clone(),
        descriptor.region.clone(),
        descriptor.age_days,
        confidence,
        reason,
    )?;
    // carry through every pricing attribute the provider supplied
    for name in descriptor.kind.pricing_attributes() {
        if let Some(value) = descriptor.attributes.get(*name) {
            finding.attributes.insert((*name).to_string(), value.clone());
        }
    }
    Ok(finding)
}

fn ebs_volume(d: &ResourceDescriptor) -> Result<Option<WasteFinding>> {
    if !d.state_is("available") {
        return Ok(None);
    }
    let finding = base_finding(
        d,
        Confidence::High,
        format!("Volume unattached for {}", age_phrase(d.age_days)),
    )?;
    Ok(Some(finding))
}

fn ebs_snapshot(d: &ResourceDescriptor) -> Result<Option<WasteFinding>> {
    // AMI-referenced snapshots are billed through the AMI finding
    if d.attr_bool("referenced_by_image").unwrap_or(true) {
        return Ok(None);
    }
    let finding = base_finding(
        d,
        Confidence::High,
        format!(
            "Snapshot not referenced by any AMI, {} old",
            age_phrase(d.age_days)
        ),
    )?;
    Ok(Some(finding))
}

fn elastic_ip(d: &ResourceDescriptor) -> Result<Option<WasteFinding>> {
    if d.attr_bool("associated").unwrap_or(true) {
        return Ok(None);
    }
    let finding = base_finding(
        d,
        Confidence::High,
        "Elastic IP not associated with any resource",
    )?;
    Ok(Some(finding))
}

fn load_balancer(d: &ResourceDescriptor) -> Result<Option<WasteFinding>> {
    if d.attr_u64("healthy_target_count").unwrap_or(1) > 0 {
        return Ok(None);
    }
    let finding = base_finding(
        d,
        Confidence::High,
        "Load balancer has zero healthy targets across all target groups",
    )?;
    Ok(Some(finding))
}

fn nat_gateway(d: &ResourceDescriptor) -> Result<Option<WasteFinding>> {
    if d.attr_u64("route_table_refs").unwrap_or(1) > 0 {
        return Ok(None);
    }
    let finding = base_finding(
        d,
        Confidence::High,
        "NAT gateway not referenced by any route table",
    )?;
    Ok(Some(finding))
}

fn stopped_instance(d: &ResourceDescriptor) -> Result<Option<WasteFinding>> {
    if !d.state_is("stopped") {
        return Ok(None);
    }
    let finding = base_finding(
        d,
        Confidence::High,
        format!(
            "Instance stopped for {}, still paying for attached EBS storage",
            age_phrase(d.age_days)
        ),
    )?;
    Ok(Some(finding))
}

fn target_group(d: &ResourceDescriptor) -> Result<Option<WasteFinding>> {
    if d.attr_u64("load_balancer_count").unwrap_or(1) > 0 {
        return Ok(None);
    }
    let finding = base_finding(
        d,
        Confidence::High,
        "Target group not attached to any load balancer",
    )?;
    Ok(Some(finding))
}

fn network_interface(d: &ResourceDescriptor) -> Result<Option<WasteFinding>> {
    if !d.state_is("available") {
        return Ok(None);
    }
    let finding = base_finding(
        d,
        Confidence::High,
        "Network interface not attached to any instance",
    )?;
    Ok(Some(finding))
}

fn ami(d: &ResourceDescriptor) -> Result<Option<WasteFinding>> {
    if d.attr_bool("in_use").unwrap_or(true) {
        return Ok(None);
    }
    // priced on the AMI's own snapshot storage; those snapshots are
    // excluded from the EBS_SNAPSHOT kind
    let finding = base_finding(
        d,
        Confidence::Medium,
        format!(
            "AMI {} old and not referenced by any instance",
            age_phrase(d.age_days)
        ),
    )?;
    Ok(Some(finding))
}

fn rds_instance(d: &ResourceDescriptor, datapoints: Option<&[f64]>) -> Result<Option<WasteFinding>> {
    if d.state_is("stopped") {
        let finding = base_finding(
            d,
            Confidence::High,
            format!("RDS instance stopped for {}", age_phrase(d.age_days)),
        )?
        .with_attr("status", "stopped");
        return Ok(Some(finding.with_opt_attrs(d, &["storage_gb", "storage_type"])));
    }
    match idle_signal(datapoints) {
        IdleSignal::Idle => {
            let finding = base_finding(
                d,
                Confidence::High,
                "No database connections in the last 30 days",
            )?
            .with_attr("status", d.state.clone().unwrap_or_else(|| "available".into()));
            Ok(Some(finding.with_opt_attrs(d, &["engine"])))
        }
        IdleSignal::Active | IdleSignal::Unknown => Ok(None),
    }
}

fn cloudfront_distribution(
    d: &ResourceDescriptor,
    datapoints: Option<&[f64]>,
) -> Result<Option<WasteFinding>> {
    if !d.attr_bool("enabled").unwrap_or(false) {
        return Ok(None);
    }
    match idle_signal(datapoints) {
        IdleSignal::Idle => {
            let finding = base_finding(
                d,
                Confidence::High,
                "Distribution enabled but served zero requests in 30 days",
            )?;
            Ok(Some(finding))
        }
        _ => Ok(None),
    }
}

fn lambda_function(d: &ResourceDescriptor, datapoints: Option<&[f64]>) -> Result<Option<WasteFinding>> {
    match idle_signal(datapoints) {
        IdleSignal::Idle => {
            let finding = base_finding(
                d,
                Confidence::High,
                "Function had zero invocations in the last 30 days",
            )?;
            Ok(Some(finding))
        }
        IdleSignal::Active => over_provisioned_lambda(d),
        IdleSignal::Unknown => Ok(None),
    }
}

/// Active function whose peak memory use stays under half its allocation.
/// The savings delta assumes right-sizing halves the memory footprint.
fn over_provisioned_lambda(d: &ResourceDescriptor) -> Result<Option<WasteFinding>> {
    let used_pct = match d.attr_f64("max_memory_used_pct") {
        Some(p) => p,
        None => return Ok(None),
    };
    let gb_seconds = match d.attr_f64("monthly_gb_seconds") {
        Some(g) => g,
        None => return Ok(None),
    };
    if used_pct >= LAMBDA_MEMORY_UTIL_PCT {
        return Ok(None);
    }
    let monthly_compute_cost = gb_seconds * LAMBDA_GB_SECOND_PRICE;
    let savings = monthly_compute_cost * 0.5;
    let finding = base_finding(
        d,
        Confidence::Medium,
        format!("Memory over-provisioned: peak usage {used_pct:.0}% of allocation"),
    )?
    .with_attr("max_memory_used_pct", used_pct)
    .with_attr("estimated_monthly_savings", savings);
    Ok(Some(finding))
}

fn s3_bucket(d: &ResourceDescriptor, datapoints: Option<&[f64]>) -> Result<Option<WasteFinding>> {
    if d.attr_u64("object_count") == Some(0) {
        let finding = base_finding(d, Confidence::High, "Bucket is empty")?;
        return Ok(Some(finding));
    }
    // idle-but-populated needs a known storage footprint; without one
    // the cost would be meaningless
    if d.attr_f64("storage_gb").unwrap_or(0.0) <= 0.0 {
        return Ok(None);
    }
    match idle_signal(datapoints) {
        IdleSignal::Idle => {
            let finding = base_finding(
                d,
                Confidence::Medium,
                "No requests against this bucket in 90 days",
            )?;
            Ok(Some(finding))
        }
        _ => Ok(None),
    }
}

fn ecs_service(d: &ResourceDescriptor, datapoints: Option<&[f64]>) -> Result<Option<WasteFinding>> {
    let running = d.attr_u64("running_count").unwrap_or(1);
    let desired = d.attr_u64("desired_count").unwrap_or(1);
    if running == 0 && desired == 0 {
        let finding = base_finding(d, Confidence::High, "Service has zero running tasks")?;
        return Ok(Some(finding));
    }
    // series is daily average CPU%; idle means consistently below the
    // threshold, not literally zero
    match datapoints {
        Some(points) if !points.is_empty() && points.iter().all(|p| *p < LOW_CPU_PCT) => {
            let finding = base_finding(
                d,
                Confidence::Medium,
                format!("Service CPU stayed under {LOW_CPU_PCT:.0}% for 30 days"),
            )?;
            Ok(Some(finding))
        }
        _ => Ok(None),
    }
}

fn redshift_cluster(d: &ResourceDescriptor, datapoints: Option<&[f64]>) -> Result<Option<WasteFinding>> {
    if d.state_is("paused") {
        let finding = base_finding(
            d,
            Confidence::High,
            format!("Cluster paused for {}", age_phrase(d.age_days)),
        )?
        .with_attr("status", "paused");
        return Ok(Some(finding));
    }
    match idle_signal(datapoints) {
        IdleSignal::Idle => {
            let finding = base_finding(
                d,
                Confidence::High,
                "No database connections in the last 30 days",
            )?;
            return Ok(Some(finding));
        }
        IdleSignal::Active | IdleSignal::Unknown => {}
    }
    // running but barely used: flag the downsizing opportunity at half
    // the cluster price
    if let Some(cpu) = d.attr_f64("avg_cpu_pct") {
        if cpu < LOW_CPU_PCT {
            let finding = base_finding(
                d,
                Confidence::Medium,
                format!("Cluster averaging {cpu:.1}% CPU, candidate for downsizing"),
            )?
            .with_attr("savings_fraction", 0.5);
            return Ok(Some(finding));
        }
    }
    Ok(None)
}

fn elasticsearch_domain(
    d: &ResourceDescriptor,
    datapoints: Option<&[f64]>,
) -> Result<Option<WasteFinding>> {
    match idle_signal(datapoints) {
        IdleSignal::Idle => {
            let finding = base_finding(
                d,
                Confidence::High,
                "Domain served zero search requests in 30 days",
            )?;
            Ok(Some(finding.with_opt_attrs(d, &["storage_gb", "storage_type"])))
        }
        _ => Ok(None),
    }
}

fn api_gateway(d: &ResourceDescriptor, datapoints: Option<&[f64]>) -> Result<Option<WasteFinding>> {
    match idle_signal(datapoints) {
        IdleSignal::Idle => {
            let finding = base_finding(
                d,
                Confidence::High,
                "API received zero requests in the last 30 days",
            )?;
            Ok(Some(finding))
        }
        _ => Ok(None),
    }
}

fn cloudwatch_log_group(d: &ResourceDescriptor) -> Result<Option<WasteFinding>> {
    // never-expiring groups with real data accumulate cost indefinitely
    if d.attr_u64("retention_days").is_some() {
        return Ok(None);
    }
    let stored = d.attr_f64("stored_gb").unwrap_or(0.0);
    if stored <= 0.0 {
        return Ok(None);
    }
    let finding = base_finding(
        d,
        Confidence::Medium,
        format!("Log group has no retention policy and holds {stored:.1} GB"),
    )?;
    Ok(Some(finding))
}

trait WithOptAttrs {
    fn with_opt_attrs(self, descriptor: &ResourceDescriptor, names: &[&str]) -> Self;
}

impl WithOptAttrs for WasteFinding {
    fn with_opt_attrs(mut self, descriptor: &ResourceDescriptor, names: &[&str]) -> Self {
        for name in names {
            if let Some(value) = descriptor.attributes.get(*name) {
                self.attributes.insert((*name).to_string(), value.clone());
            }
        }
        self
    }
}
