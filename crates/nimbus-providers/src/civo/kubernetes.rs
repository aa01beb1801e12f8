//! Kubernetes clusters, node pools and instance sizes

use chrono::{DateTime, Utc};
use nimbus_core::{Context, Error, ErrorKind, RequestDescriptor, Result};
use serde::{Deserialize, Serialize};

use super::{CivoClient, SimpleResponse};
use crate::lookup::find_by_id_or_name;

const CLUSTER_BASE: &str = "/v2/kubernetes/clusters";
const SIZES: &str = "/v2/sizes";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesInstance {
    pub id: String,
    pub hostname: String,
    pub size: String,
    pub region: String,
    pub status: String,
    pub private_ip: String,
    pub public_ip: String,
    pub cpu_cores: u32,
    pub ram_mb: u32,
    pub disk_gb: u32,
    pub tags: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesPool {
    pub id: String,
    pub count: u32,
    pub size: String,
    pub instance_names: Vec<String>,
    pub instances: Vec<KubernetesInstance>,
    pub public_ip_node_pool: bool,
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesCluster {
    pub id: String,
    pub name: String,
    pub generated_name: String,
    pub version: String,
    pub status: String,
    pub ready: bool,
    #[serde(rename = "num_target_nodes")]
    pub num_target_node: u32,
    #[serde(rename = "target_nodes_size")]
    pub target_node_size: String,
    pub kubernetes_version: String,
    pub api_endpoint: String,
    pub master_ip: String,
    pub network_id: String,
    pub firewall_id: String,
    pub tags: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub instances: Vec<KubernetesInstance>,
    pub pools: Vec<KubernetesPool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PaginatedKubernetesClusters {
    pub page: u32,
    pub per_page: u32,
    pub pages: u32,
    pub items: Vec<KubernetesCluster>,
}

/// Body of a pool resize
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KubernetesPoolUpdateRequest {
    pub count: u32,
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstanceSize {
    pub id: String,
    pub name: String,
    pub nice_name: String,
    pub cpu_cores: u32,
    pub gpu_count: u32,
    pub ram_mb: u32,
    pub disk_gb: u32,
    pub transfer_tb: u32,
    pub description: String,
    pub selectable: bool,
}

fn require(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::wrap(ErrorKind::IdEmpty, format!("{} is empty", what)));
    }
    Ok(())
}

impl CivoClient {
    pub async fn list_kubernetes_clusters(
        &self,
        ctx: &Context,
    ) -> Result<PaginatedKubernetesClusters> {
        self.http
            .execute(
                ctx,
                self.scoped(RequestDescriptor::get(CLUSTER_BASE).caller("list_kubernetes_clusters")),
            )
            .await
    }

    pub async fn get_kubernetes_cluster(&self, ctx: &Context, id: &str) -> Result<KubernetesCluster> {
        require(id, "cluster id")?;
        self.http
            .execute(
                ctx,
                self.scoped(
                    RequestDescriptor::get(format!("{}/{}", CLUSTER_BASE, id))
                        .caller("get_kubernetes_cluster"),
                ),
            )
            .await
    }

    /// Find a cluster by id or name, names compared case-insensitively
    pub async fn find_kubernetes_cluster(
        &self,
        ctx: &Context,
        search: &str,
    ) -> Result<KubernetesCluster> {
        let clusters = self.list_kubernetes_clusters(ctx).await?;
        find_by_id_or_name(
            &clusters.items,
            search,
            |c| c.id.as_str(),
            |c| c.name.as_str(),
            true,
        )
        .cloned()
    }

    pub async fn list_kubernetes_cluster_pools(
        &self,
        ctx: &Context,
        cluster_id: &str,
    ) -> Result<Vec<KubernetesPool>> {
        require(cluster_id, "cluster id")?;
        self.http
            .execute(
                ctx,
                self.scoped(
                    RequestDescriptor::get(format!("{}/{}/pools", CLUSTER_BASE, cluster_id))
                        .caller("list_kubernetes_cluster_pools"),
                ),
            )
            .await
    }

    pub async fn get_kubernetes_cluster_pool(
        &self,
        ctx: &Context,
        cluster_id: &str,
        pool_id: &str,
    ) -> Result<KubernetesPool> {
        require(cluster_id, "cluster id")?;
        require(pool_id, "pool id")?;
        self.http
            .execute(
                ctx,
                self.scoped(
                    RequestDescriptor::get(format!(
                        "{}/{}/pools/{}",
                        CLUSTER_BASE, cluster_id, pool_id
                    ))
                    .caller("get_kubernetes_cluster_pool"),
                ),
            )
            .await
    }

    /// Resize a pool to `count` nodes
    pub async fn update_kubernetes_cluster_pool(
        &self,
        ctx: &Context,
        cluster_id: &str,
        pool_id: &str,
        count: u32,
    ) -> Result<KubernetesPool> {
        require(cluster_id, "cluster id")?;
        require(pool_id, "pool id")?;
        let body = KubernetesPoolUpdateRequest {
            count,
            region: self.region.clone(),
        };
        self.http
            .execute(
                ctx,
                self.scoped(
                    RequestDescriptor::put(format!(
                        "{}/{}/pools/{}",
                        CLUSTER_BASE, cluster_id, pool_id
                    ))
                    .json(&body)?
                    .caller("update_kubernetes_cluster_pool"),
                ),
            )
            .await
    }

    pub async fn list_kubernetes_cluster_instances(
        &self,
        ctx: &Context,
        cluster_id: &str,
    ) -> Result<Vec<KubernetesInstance>> {
        require(cluster_id, "cluster id")?;
        self.http
            .execute(
                ctx,
                self.scoped(
                    RequestDescriptor::get(format!("{}/{}/instances", CLUSTER_BASE, cluster_id))
                        .caller("list_kubernetes_cluster_instances"),
                ),
            )
            .await
    }

    /// Find a cluster node by id or hostname, hostnames compared case-insensitively
    pub async fn find_kubernetes_cluster_instance(
        &self,
        ctx: &Context,
        cluster_id: &str,
        search: &str,
    ) -> Result<KubernetesInstance> {
        let instances = self.list_kubernetes_cluster_instances(ctx, cluster_id).await?;
        find_by_id_or_name(
            &instances,
            search,
            |i| i.id.as_str(),
            |i| i.hostname.as_str(),
            true,
        )
        .cloned()
    }

    /// Remove one node from a pool
    pub async fn delete_kubernetes_cluster_pool_instance(
        &self,
        ctx: &Context,
        cluster_id: &str,
        pool_id: &str,
        instance_id: &str,
    ) -> Result<SimpleResponse> {
        require(cluster_id, "cluster id")?;
        require(pool_id, "pool id")?;
        require(instance_id, "instance id")?;
        self.http
            .execute(
                ctx,
                self.scoped(
                    RequestDescriptor::delete(format!(
                        "{}/{}/pools/{}/instances/{}",
                        CLUSTER_BASE, cluster_id, pool_id, instance_id
                    ))
                    .caller("delete_kubernetes_cluster_pool_instance"),
                ),
            )
            .await
    }

    pub async fn list_instance_sizes(&self, ctx: &Context) -> Result<Vec<InstanceSize>> {
        self.http
            .execute(
                ctx,
                self.scoped(RequestDescriptor::get(SIZES).caller("list_instance_sizes")),
            )
            .await
    }

    /// Find a size by id or name, case-sensitive
    pub async fn find_instance_size(&self, ctx: &Context, search: &str) -> Result<InstanceSize> {
        let sizes = self.list_instance_sizes(ctx).await?;
        find_by_id_or_name(
            &sizes,
            search,
            |s| s.id.as_str(),
            |s| s.name.as_str(),
            false,
        )
        .cloned()
    }
}
