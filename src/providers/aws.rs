//! AWS resource provider
//!
//! Enumerates resources with the AWS SDK and answers CloudWatch metric
//! queries. All cross-resource joins (snapshot-to-AMI references, NAT
//! gateway route-table usage, healthy-target counts, stopped-instance
//! volume sizes) are resolved here and recorded as descriptor attributes,
//! so everything above this layer is offline.
//!
//! Kinds with no SDK client in the carried stack (CloudFront,
//! Elasticsearch, API Gateway, CloudWatch log groups) are not in
//! `supported_kinds`; their classifiers run against the fixture provider.

use crate::error::{Result, SweepError};
use crate::finding::{Age, ResourceKind};
use crate::provider::{
    AccountInfo, MetricQuery, MetricSeries, MetricStat, ResourceDescriptor, ResourceProvider,
};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudwatch::types::{Dimension, Statistic};
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, SystemTime};
use tracing::debug;

pub struct AwsProvider {
    region: String,
    ec2: aws_sdk_ec2::Client,
    elbv2: aws_sdk_elasticloadbalancingv2::Client,
    s3: aws_sdk_s3::Client,
    sts: aws_sdk_sts::Client,
    cloudwatch: aws_sdk_cloudwatch::Client,
    rds: aws_sdk_rds::Client,
    lambda: aws_sdk_lambda::Client,
    ecs: aws_sdk_ecs::Client,
    redshift: aws_sdk_redshift::Client,
}

impl AwsProvider {
    pub async fn connect(region: &str, profile: Option<&str>) -> Result<Self> {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let conf = loader.load().await;

        let provider = Self {
            region: region.to_string(),
            ec2: aws_sdk_ec2::Client::new(&conf),
            elbv2: aws_sdk_elasticloadbalancingv2::Client::new(&conf),
            s3: aws_sdk_s3::Client::new(&conf),
            sts: aws_sdk_sts::Client::new(&conf),
            cloudwatch: aws_sdk_cloudwatch::Client::new(&conf),
            rds: aws_sdk_rds::Client::new(&conf),
            lambda: aws_sdk_lambda::Client::new(&conf),
            ecs: aws_sdk_ecs::Client::new(&conf),
            redshift: aws_sdk_redshift::Client::new(&conf),
        };
        Ok(provider)
    }

    fn age_from_epoch_secs(secs: i64) -> Age {
        let now = Utc::now().timestamp();
        if secs <= 0 || secs > now {
            return Age::Unknown;
        }
        Age::Days(((now - secs) / 86_400) as u32)
    }

    fn ec2_tags(tags: &[aws_sdk_ec2::types::Tag]) -> BTreeMap<String, String> {
        tags.iter()
            .filter_map(|t| Some((t.key()?.to_string(), t.value()?.to_string())))
            .collect()
    }

    async fn list_ebs_volumes(&self) -> Result<Vec<ResourceDescriptor>> {
        let mut out = Vec::new();
        let mut next: Option<String> = None;
        loop {
            let resp = self
                .ec2
                .describe_volumes()
                .set_next_token(next.clone())
                .send()
                .await
                .map_err(|e| sdk_err(ResourceKind::EbsVolume, "DescribeVolumes", e))?;

            for vol in resp.volumes() {
                let id = match vol.volume_id() {
                    Some(id) => id,
                    None => continue,
                };
                let mut d = ResourceDescriptor::new(ResourceKind::EbsVolume, id, &self.region);
                if let Some(state) = vol.state() {
                    d = d.with_state(state.as_str());
                }
                if let Some(ct) = vol.create_time() {
                    d = d.with_age(Self::age_from_epoch_secs(ct.secs()));
                }
                if let Some(size) = vol.size() {
                    d = d.with_attr("size_gb", size);
                }
                if let Some(vt) = vol.volume_type() {
                    d = d.with_attr("volume_type", vt.as_str());
                }
                d.tags = Self::ec2_tags(vol.tags());
                out.push(d);
            }

            next = resp.next_token().map(|s| s.to_string());
            if next.is_none() {
                break;
            }
        }
        Ok(out)
    }

    /// Snapshots, with the AMI back-reference resolved so the classifier
    /// can exclude snapshots billed through an image.
    async fn list_ebs_snapshots(&self) -> Result<Vec<ResourceDescriptor>> {
        let image_snapshot_ids = self.image_snapshot_ids().await?;

        let mut out = Vec::new();
        let mut next: Option<String> = None;
        loop {
            let resp = self
                .ec2
                .describe_snapshots()
                .owner_ids("self")
                .set_next_token(next.clone())
                .send()
                .await
                .map_err(|e| sdk_err(ResourceKind::EbsSnapshot, "DescribeSnapshots", e))?;

            for snap in resp.snapshots() {
                let id = match snap.snapshot_id() {
                    Some(id) => id,
                    None => continue,
                };
                let mut d = ResourceDescriptor::new(ResourceKind::EbsSnapshot, id, &self.region)
                    .with_attr("referenced_by_image", image_snapshot_ids.contains(id));
                if let Some(st) = snap.start_time() {
                    d = d.with_age(Self::age_from_epoch_secs(st.secs()));
                }
                if let Some(size) = snap.volume_size() {
                    d = d.with_attr("size_gb", size);
                }
                d.tags = Self::ec2_tags(snap.tags());
                out.push(d);
            }

            next = resp.next_token().map(|s| s.to_string());
            if next.is_none() {
                break;
            }
        }
        Ok(out)
    }

    /// Snapshot ids referenced by any of the account's own AMIs.
    async fn image_snapshot_ids(&self) -> Result<HashSet<String>> {
        let resp = self
            .ec2
            .describe_images()
            .owners("self")
            .send()
            .await
            .map_err(|e| sdk_err(ResourceKind::EbsSnapshot, "DescribeImages", e))?;

        let mut ids = HashSet::new();
        for image in resp.images() {
            for bdm in image.block_device_mappings() {
                if let Some(snapshot_id) = bdm.ebs().and_then(|e| e.snapshot_id()) {
                    ids.insert(snapshot_id.to_string());
                }
            }
        }
        Ok(ids)
    }

    async fn list_elastic_ips(&self) -> Result<Vec<ResourceDescriptor>> {
        let resp = self
            .ec2
            .describe_addresses()
            .send()
            .await
            .map_err(|e| sdk_err(ResourceKind::ElasticIp, "DescribeAddresses", e))?;

        let mut out = Vec::new();
        for addr in resp.addresses() {
            let id = match addr.allocation_id().or(addr.public_ip()) {
                Some(id) => id,
                None => continue,
            };
            let mut d = ResourceDescriptor::new(ResourceKind::ElasticIp, id, &self.region)
                .with_attr("associated", addr.association_id().is_some());
            d.tags = Self::ec2_tags(addr.tags());
            out.push(d);
        }
        Ok(out)
    }

    async fn list_load_balancers(&self) -> Result<Vec<ResourceDescriptor>> {
        let mut out = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let resp = self
                .elbv2
                .describe_load_balancers()
                .set_marker(marker.clone())
                .send()
                .await
                .map_err(|e| sdk_err(ResourceKind::LoadBalancer, "DescribeLoadBalancers", e))?;

            for lb in resp.load_balancers() {
                let arn = match lb.load_balancer_arn() {
                    Some(arn) => arn,
                    None => continue,
                };
                let name = lb.load_balancer_name().unwrap_or(arn);
                let healthy = self.healthy_target_count(arn).await?;
                let mut d = ResourceDescriptor::new(ResourceKind::LoadBalancer, name, &self.region)
                    .with_attr("healthy_target_count", healthy);
                if let Some(ct) = lb.created_time() {
                    d = d.with_age(Self::age_from_epoch_secs(ct.secs()));
                }
                out.push(d);
            }

            marker = resp.next_marker().map(|s| s.to_string());
            if marker.is_none() {
                break;
            }
        }
        Ok(out)
    }

    async fn healthy_target_count(&self, lb_arn: &str) -> Result<u64> {
        let groups = self
            .elbv2
            .describe_target_groups()
            .load_balancer_arn(lb_arn)
            .send()
            .await
            .map_err(|e| sdk_err(ResourceKind::LoadBalancer, "DescribeTargetGroups", e))?;

        let mut healthy = 0u64;
        for tg in groups.target_groups() {
            let arn = match tg.target_group_arn() {
                Some(arn) => arn,
                None => continue,
            };
            let health = self
                .elbv2
                .describe_target_health()
                .target_group_arn(arn)
                .send()
                .await
                .map_err(|e| sdk_err(ResourceKind::LoadBalancer, "DescribeTargetHealth", e))?;
            healthy += health
                .target_health_descriptions()
                .iter()
                .filter(|thd| {
                    thd.target_health()
                        .and_then(|th| th.state())
                        .map(|s| s.as_str() == "healthy")
                        .unwrap_or(false)
                })
                .count() as u64;
        }
        Ok(healthy)
    }

    async fn list_nat_gateways(&self) -> Result<Vec<ResourceDescriptor>> {
        let referenced = self.nat_gateway_route_refs().await?;

        let mut out = Vec::new();
        let mut next: Option<String> = None;
        loop {
            let resp = self
                .ec2
                .describe_nat_gateways()
                .set_next_token(next.clone())
                .send()
                .await
                .map_err(|e| sdk_err(ResourceKind::NatGateway, "DescribeNatGateways", e))?;

            for ngw in resp.nat_gateways() {
                let id = match ngw.nat_gateway_id() {
                    Some(id) => id,
                    None => continue,
                };
                if ngw.state().map(|s| s.as_str()) != Some("available") {
                    continue;
                }
                let refs = referenced.get(id).copied().unwrap_or(0);
                let mut d = ResourceDescriptor::new(ResourceKind::NatGateway, id, &self.region)
                    .with_attr("route_table_refs", refs);
                if let Some(ct) = ngw.create_time() {
                    d = d.with_age(Self::age_from_epoch_secs(ct.secs()));
                }
                d.tags = Self::ec2_tags(ngw.tags());
                out.push(d);
            }

            next = resp.next_token().map(|s| s.to_string());
            if next.is_none() {
                break;
            }
        }
        Ok(out)
    }

    async fn nat_gateway_route_refs(&self) -> Result<BTreeMap<String, u64>> {
        let mut refs: BTreeMap<String, u64> = BTreeMap::new();
        let mut next: Option<String> = None;
        loop {
            let resp = self
                .ec2
                .describe_route_tables()
                .set_next_token(next.clone())
                .send()
                .await
                .map_err(|e| sdk_err(ResourceKind::NatGateway, "DescribeRouteTables", e))?;

            for rt in resp.route_tables() {
                for route in rt.routes() {
                    if let Some(id) = route.nat_gateway_id() {
                        *refs.entry(id.to_string()).or_insert(0) += 1;
                    }
                }
            }

            next = resp.next_token().map(|s| s.to_string());
            if next.is_none() {
                break;
            }
        }
        Ok(refs)
    }

    async fn list_stopped_instances(&self) -> Result<Vec<ResourceDescriptor>> {
        let mut out = Vec::new();
        let mut next: Option<String> = None;
        loop {
            let resp = self
                .ec2
                .describe_instances()
                .set_next_token(next.clone())
                .send()
                .await
                .map_err(|e| sdk_err(ResourceKind::StoppedInstance, "DescribeInstances", e))?;

            for reservation in resp.reservations() {
                for inst in reservation.instances() {
                    let id = match inst.instance_id() {
                        Some(id) => id,
                        None => continue,
                    };
                    let state = inst
                        .state()
                        .and_then(|s| s.name())
                        .map(|n| n.as_str().to_string());
                    if state.as_deref() != Some("stopped") {
                        continue;
                    }
                    let storage_gb = self.attached_volume_gb(id).await?;
                    let mut d =
                        ResourceDescriptor::new(ResourceKind::StoppedInstance, id, &self.region)
                            .with_state("stopped")
                            .with_attr("storage_gb", storage_gb);
                    // launch time is a lower bound on how long it has been
                    // stopped; the exact stop time is not exposed
                    if let Some(lt) = inst.launch_time() {
                        d = d.with_age(Self::age_from_epoch_secs(lt.secs()));
                    }
                    d.tags = Self::ec2_tags(inst.tags());
                    out.push(d);
                }
            }

            next = resp.next_token().map(|s| s.to_string());
            if next.is_none() {
                break;
            }
        }
        Ok(out)
    }

    async fn attached_volume_gb(&self, instance_id: &str) -> Result<i64> {
        let filter = aws_sdk_ec2::types::Filter::builder()
            .name("attachment.instance-id")
            .values(instance_id)
            .build();
        let resp = self
            .ec2
            .describe_volumes()
            .filters(filter)
            .send()
            .await
            .map_err(|e| sdk_err(ResourceKind::StoppedInstance, "DescribeVolumes", e))?;
        Ok(resp
            .volumes()
            .iter()
            .filter_map(|v| v.size())
            .map(|s| s as i64)
            .sum())
    }

    async fn list_target_groups(&self) -> Result<Vec<ResourceDescriptor>> {
        let mut out = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let resp = self
                .elbv2
                .describe_target_groups()
                .set_marker(marker.clone())
                .send()
                .await
                .map_err(|e| sdk_err(ResourceKind::TargetGroup, "DescribeTargetGroups", e))?;

            for tg in resp.target_groups() {
                let name = match tg.target_group_name().or(tg.target_group_arn()) {
                    Some(name) => name,
                    None => continue,
                };
                // target groups expose no creation time; age stays unknown
                let d = ResourceDescriptor::new(ResourceKind::TargetGroup, name, &self.region)
                    .with_attr("load_balancer_count", tg.load_balancer_arns().len() as u64);
                out.push(d);
            }

            marker = resp.next_marker().map(|s| s.to_string());
            if marker.is_none() {
                break;
            }
        }
        Ok(out)
    }

    async fn list_network_interfaces(&self) -> Result<Vec<ResourceDescriptor>> {
        let mut out = Vec::new();
        let mut next: Option<String> = None;
        loop {
            let resp = self
                .ec2
                .describe_network_interfaces()
                .set_next_token(next.clone())
                .send()
                .await
                .map_err(|e| {
                    sdk_err(ResourceKind::NetworkInterface, "DescribeNetworkInterfaces", e)
                })?;

            for eni in resp.network_interfaces() {
                let id = match eni.network_interface_id() {
                    Some(id) => id,
                    None => continue,
                };
                let mut d =
                    ResourceDescriptor::new(ResourceKind::NetworkInterface, id, &self.region);
                if let Some(status) = eni.status() {
                    d = d.with_state(status.as_str());
                }
                d.tags = eni
                    .tag_set()
                    .iter()
                    .filter_map(|t| Some((t.key()?.to_string(), t.value()?.to_string())))
                    .collect();
                out.push(d);
            }

            next = resp.next_token().map(|s| s.to_string());
            if next.is_none() {
                break;
            }
        }
        Ok(out)
    }

    async fn list_amis(&self) -> Result<Vec<ResourceDescriptor>> {
        let used_image_ids = self.instance_image_ids().await?;

        let resp = self
            .ec2
            .describe_images()
            .owners("self")
            .send()
            .await
            .map_err(|e| sdk_err(ResourceKind::Ami, "DescribeImages", e))?;

        let mut out = Vec::new();
        for image in resp.images() {
            let id = match image.image_id() {
                Some(id) => id,
                None => continue,
            };
            let storage_gb: i64 = image
                .block_device_mappings()
                .iter()
                .filter_map(|bdm| bdm.ebs().and_then(|e| e.volume_size()))
                .map(|s| s as i64)
                .sum();
            let mut d = ResourceDescriptor::new(ResourceKind::Ami, id, &self.region)
                .with_attr("in_use", used_image_ids.contains(id))
                .with_attr("storage_gb", storage_gb);
            if let Some(created) = image.creation_date() {
                if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(created) {
                    d = d.with_age(Self::age_from_epoch_secs(ts.timestamp()));
                }
            }
            d.tags = Self::ec2_tags(image.tags());
            out.push(d);
        }
        Ok(out)
    }

    /// Image ids referenced by any instance, running or stopped.
    async fn instance_image_ids(&self) -> Result<HashSet<String>> {
        let mut ids = HashSet::new();
        let mut next: Option<String> = None;
        loop {
            let resp = self
                .ec2
                .describe_instances()
                .set_next_token(next.clone())
                .send()
                .await
                .map_err(|e| sdk_err(ResourceKind::Ami, "DescribeInstances", e))?;

            for reservation in resp.reservations() {
                for inst in reservation.instances() {
                    if let Some(image_id) = inst.image_id() {
                        ids.insert(image_id.to_string());
                    }
                }
            }

            next = resp.next_token().map(|s| s.to_string());
            if next.is_none() {
                break;
            }
        }
        Ok(ids)
    }

    async fn list_rds_instances(&self) -> Result<Vec<ResourceDescriptor>> {
        let mut out = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let resp = self
                .rds
                .describe_db_instances()
                .set_marker(marker.clone())
                .send()
                .await
                .map_err(|e| sdk_err(ResourceKind::RdsInstance, "DescribeDBInstances", e))?;

            for db in resp.db_instances() {
                let id = match db.db_instance_identifier() {
                    Some(id) => id,
                    None => continue,
                };
                let mut d = ResourceDescriptor::new(ResourceKind::RdsInstance, id, &self.region)
                    .with_attr("storage_gb", db.allocated_storage().unwrap_or(0));
                if let Some(status) = db.db_instance_status() {
                    d = d.with_state(status);
                }
                if let Some(class) = db.db_instance_class() {
                    d = d.with_attr("instance_class", class);
                }
                if let Some(engine) = db.engine() {
                    d = d.with_attr("engine", engine);
                }
                if let Some(st) = db.storage_type() {
                    d = d.with_attr("storage_type", st);
                }
                if let Some(ct) = db.instance_create_time() {
                    d = d.with_age(Self::age_from_epoch_secs(ct.secs()));
                }
                out.push(d);
            }

            marker = resp.marker().map(|s| s.to_string());
            if marker.is_none() {
                break;
            }
        }
        Ok(out)
    }

    async fn list_lambda_functions(&self) -> Result<Vec<ResourceDescriptor>> {
        let mut out = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let resp = self
                .lambda
                .list_functions()
                .set_marker(marker.clone())
                .send()
                .await
                .map_err(|e| sdk_err(ResourceKind::LambdaFunction, "ListFunctions", e))?;

            for f in resp.functions() {
                let name = match f.function_name() {
                    Some(name) => name,
                    None => continue,
                };
                let mut d =
                    ResourceDescriptor::new(ResourceKind::LambdaFunction, name, &self.region);
                if let Some(mem) = f.memory_size() {
                    d = d.with_attr("memory_mb", mem);
                }
                if let Some(modified) = f.last_modified() {
                    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(modified) {
                        d = d.with_age(Self::age_from_epoch_secs(ts.timestamp()));
                    }
                }
                out.push(d);
            }

            marker = resp.next_marker().map(|s| s.to_string());
            if marker.is_none() {
                break;
            }
        }
        Ok(out)
    }

    async fn list_s3_buckets(&self) -> Result<Vec<ResourceDescriptor>> {
        let resp = self
            .s3
            .list_buckets()
            .send()
            .await
            .map_err(|e| sdk_err(ResourceKind::S3Bucket, "ListBuckets", e))?;

        let mut out = Vec::new();
        for bucket in resp.buckets() {
            let name = match bucket.name() {
                Some(name) => name,
                None => continue,
            };
            let mut d = ResourceDescriptor::new(ResourceKind::S3Bucket, name, &self.region);
            if let Some(created) = bucket.creation_date() {
                d = d.with_age(Self::age_from_epoch_secs(created.secs()));
            }
            // a single keyed listing tells us whether the bucket is empty
            match self
                .s3
                .list_objects_v2()
                .bucket(name)
                .max_keys(1)
                .send()
                .await
            {
                Ok(objects) => {
                    if objects.contents().is_empty() {
                        d = d.with_attr("object_count", 0).with_attr("storage_gb", 0);
                    } else if let Some(bytes) = self.bucket_size_bytes(name).await {
                        d = d.with_attr("storage_gb", bytes / 1_073_741_824.0);
                    }
                }
                Err(e) => {
                    // per-bucket listing denial is non-fatal
                    debug!(bucket = name, error = %e, "ListObjectsV2 failed, skipping emptiness check");
                }
            }
            out.push(d);
        }
        Ok(out)
    }

    /// Latest BucketSizeBytes datapoint for the standard storage class.
    /// The storage metric lags by a day or two, so a three-day window is
    /// queried and the newest point wins. `None` on any failure: the
    /// classifier then skips the idle-storage heuristic for this bucket.
    async fn bucket_size_bytes(&self, bucket: &str) -> Option<f64> {
        let now = SystemTime::now();
        let start = now - Duration::from_secs(3 * 86_400);
        let resp = self
            .cloudwatch
            .get_metric_statistics()
            .namespace("AWS/S3")
            .metric_name("BucketSizeBytes")
            .dimensions(
                Dimension::builder()
                    .name("BucketName")
                    .value(bucket)
                    .build(),
            )
            .dimensions(
                Dimension::builder()
                    .name("StorageType")
                    .value("StandardStorage")
                    .build(),
            )
            .start_time(start.into())
            .end_time(now.into())
            .period(86_400)
            .statistics(Statistic::Average)
            .send()
            .await
            .ok()?;
        resp.datapoints()
            .iter()
            .filter_map(|dp| Some((dp.timestamp()?.secs(), dp.average()?)))
            .max_by_key(|(ts, _)| *ts)
            .map(|(_, bytes)| bytes)
    }

    async fn list_ecs_services(&self) -> Result<Vec<ResourceDescriptor>> {
        let clusters = self
            .ecs
            .list_clusters()
            .send()
            .await
            .map_err(|e| sdk_err(ResourceKind::EcsService, "ListClusters", e))?;

        let mut out = Vec::new();
        for cluster_arn in clusters.cluster_arns() {
            let cluster_name = cluster_arn.rsplit('/').next().unwrap_or(cluster_arn);
            let mut next: Option<String> = None;
            loop {
                let services = self
                    .ecs
                    .list_services()
                    .cluster(cluster_arn)
                    .set_next_token(next.clone())
                    .send()
                    .await
                    .map_err(|e| sdk_err(ResourceKind::EcsService, "ListServices", e))?;

                let arns: Vec<String> = services.service_arns().to_vec();
                // DescribeServices accepts at most 10 services per call
                for chunk in arns.chunks(10) {
                    let described = self
                        .ecs
                        .describe_services()
                        .cluster(cluster_arn)
                        .set_services(Some(chunk.to_vec()))
                        .send()
                        .await
                        .map_err(|e| sdk_err(ResourceKind::EcsService, "DescribeServices", e))?;

                    for service in described.services() {
                        let name = match service.service_name() {
                            Some(name) => name,
                            None => continue,
                        };
                        let id = format!("{cluster_name}/{name}");
                        let mut d =
                            ResourceDescriptor::new(ResourceKind::EcsService, id, &self.region)
                                .with_attr("running_count", service.running_count())
                                .with_attr("desired_count", service.desired_count());
                        if let Some(lt) = service.launch_type() {
                            d = d.with_attr("launch_type", lt.as_str());
                        }
                        if let Some(ct) = service.created_at() {
                            d = d.with_age(Self::age_from_epoch_secs(ct.secs()));
                        }
                        out.push(d);
                    }
                }

                next = services.next_token().map(|s| s.to_string());
                if next.is_none() {
                    break;
                }
            }
        }
        Ok(out)
    }

    async fn list_redshift_clusters(&self) -> Result<Vec<ResourceDescriptor>> {
        let mut out = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let resp = self
                .redshift
                .describe_clusters()
                .set_marker(marker.clone())
                .send()
                .await
                .map_err(|e| sdk_err(ResourceKind::RedshiftCluster, "DescribeClusters", e))?;

            for cluster in resp.clusters() {
                let id = match cluster.cluster_identifier() {
                    Some(id) => id,
                    None => continue,
                };
                let mut d =
                    ResourceDescriptor::new(ResourceKind::RedshiftCluster, id, &self.region);
                if let Some(status) = cluster.cluster_status() {
                    d = d.with_state(status);
                }
                if let Some(nt) = cluster.node_type() {
                    d = d.with_attr("node_type", nt);
                }
                if let Some(n) = cluster.number_of_nodes() {
                    d = d.with_attr("node_count", n);
                }
                if let Some(ct) = cluster.cluster_create_time() {
                    d = d.with_age(Self::age_from_epoch_secs(ct.secs()));
                }
                d.tags = cluster
                    .tags()
                    .iter()
                    .filter_map(|t| Some((t.key()?.to_string(), t.value()?.to_string())))
                    .collect();
                out.push(d);
            }

            marker = resp.marker().map(|s| s.to_string());
            if marker.is_none() {
                break;
            }
        }
        Ok(out)
    }
}

fn sdk_err<E: std::fmt::Display>(kind: ResourceKind, operation: &str, e: E) -> SweepError {
    SweepError::api_for_kind(kind, operation, e.to_string())
}

#[async_trait]
impl ResourceProvider for AwsProvider {
    async fn account_info(&self) -> Result<AccountInfo> {
        let identity = self
            .sts
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| SweepError::ProviderConnection {
                message: format!("GetCallerIdentity failed: {e}"),
                source: None,
            })?;
        Ok(AccountInfo {
            account_id: identity.account().unwrap_or("unknown").to_string(),
            user_arn: identity.arn().unwrap_or("unknown").to_string(),
        })
    }

    fn region(&self) -> &str {
        &self.region
    }

    fn supported_kinds(&self) -> Vec<ResourceKind> {
        ResourceKind::ALL
            .into_iter()
            .filter(|k| {
                !matches!(
                    k,
                    ResourceKind::CloudfrontDistribution
                        | ResourceKind::ElasticsearchDomain
                        | ResourceKind::ApiGateway
                        | ResourceKind::CloudwatchLogGroup
                )
            })
            .collect()
    }

    async fn list(&self, kind: ResourceKind) -> Result<Vec<ResourceDescriptor>> {
        match kind {
            ResourceKind::EbsVolume => self.list_ebs_volumes().await,
            ResourceKind::EbsSnapshot => self.list_ebs_snapshots().await,
            ResourceKind::ElasticIp => self.list_elastic_ips().await,
            ResourceKind::LoadBalancer => self.list_load_balancers().await,
            ResourceKind::NatGateway => self.list_nat_gateways().await,
            ResourceKind::StoppedInstance => self.list_stopped_instances().await,
            ResourceKind::TargetGroup => self.list_target_groups().await,
            ResourceKind::NetworkInterface => self.list_network_interfaces().await,
            ResourceKind::Ami => self.list_amis().await,
            ResourceKind::RdsInstance => self.list_rds_instances().await,
            ResourceKind::LambdaFunction => self.list_lambda_functions().await,
            ResourceKind::S3Bucket => self.list_s3_buckets().await,
            ResourceKind::EcsService => self.list_ecs_services().await,
            ResourceKind::RedshiftCluster => self.list_redshift_clusters().await,
            other => Err(SweepError::api_for_kind(
                other,
                "List",
                "kind not supported by the AWS provider",
            )),
        }
    }

    async fn metric_series(&self, query: &MetricQuery) -> Result<MetricSeries> {
        let statistic = match query.stat {
            MetricStat::Sum => Statistic::Sum,
            MetricStat::Maximum => Statistic::Maximum,
            MetricStat::Average => Statistic::Average,
        };
        let now = SystemTime::now();
        let start = now - Duration::from_secs(u64::from(query.lookback_days) * 86_400);

        let resp = self
            .cloudwatch
            .get_metric_statistics()
            .namespace(&query.namespace)
            .metric_name(&query.metric)
            .dimensions(
                Dimension::builder()
                    .name(&query.dimension.0)
                    .value(&query.dimension.1)
                    .build(),
            )
            .start_time(start.into())
            .end_time(now.into())
            .period(86_400)
            .statistics(statistic)
            .send()
            .await
            .map_err(|e| SweepError::MetricUnavailable {
                metric: format!("{}/{}: {e}", query.namespace, query.metric),
                resource_id: query.dimension.1.clone(),
            })?;

        let mut points: Vec<(i64, f64)> = resp
            .datapoints()
            .iter()
            .filter_map(|dp| {
                let ts = dp.timestamp()?.secs();
                let value = match query.stat {
                    MetricStat::Sum => dp.sum(),
                    MetricStat::Maximum => dp.maximum(),
                    MetricStat::Average => dp.average(),
                }?;
                Some((ts, value))
            })
            .collect();
        points.sort_by_key(|(ts, _)| *ts);

        Ok(MetricSeries {
            datapoints: points.into_iter().map(|(_, v)| v).collect(),
        })
    }
}
