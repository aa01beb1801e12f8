//! PaaS services
//!
//! Managed Kubernetes clusters are PaaS services; the node count of a cluster
//! lives in its free-form `parameters` map under
//! [`WORKER_NODE_COUNT_PARAM`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use nimbus_core::{Context, Error, ErrorKind, RequestDescriptor, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{validate_id, GridscaleClient};

const PAAS_SERVICE_BASE: &str = "/objects/paas/services";

/// Parameter holding the worker node count of a Kubernetes service
pub const WORKER_NODE_COUNT_PARAM: &str = "k8s_worker_node_count";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceLimit {
    pub resource: String,
    pub limit: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaaSService {
    pub object_uuid: String,
    pub name: String,
    pub status: String,
    pub labels: Vec<String>,
    pub security_zone_uuid: String,
    pub network_uuid: String,
    pub service_template_uuid: String,
    pub service_template_category: String,
    pub resource_limits: Vec<ResourceLimit>,
    pub parameters: Map<String, Value>,
    pub create_time: Option<DateTime<Utc>>,
    pub change_time: Option<DateTime<Utc>>,
}

impl PaaSService {
    /// Worker node count from the parameters; the API sends it as a JSON number
    /// that may carry a fraction
    pub fn worker_node_count(&self) -> Option<u64> {
        let value = self.parameters.get(WORKER_NODE_COUNT_PARAM)?;
        value
            .as_u64()
            .or_else(|| value.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64))
    }
}

#[derive(Debug, Deserialize)]
struct PaaSServiceEnvelope {
    paas_service: PaaSService,
}

#[derive(Debug, Deserialize)]
struct PaaSServiceList {
    #[serde(default)]
    paas_services: BTreeMap<String, PaaSService>,
}

/// Partial update; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaaSServiceUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_limits: Option<Vec<ResourceLimit>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_template_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_uuid: Option<String>,
}

impl GridscaleClient {
    pub async fn get_paas_service_list(&self, ctx: &Context) -> Result<Vec<PaaSService>> {
        let list: PaaSServiceList = self
            .http
            .execute(
                ctx,
                RequestDescriptor::get(PAAS_SERVICE_BASE).caller("get_paas_service_list"),
            )
            .await?;
        Ok(list.paas_services.into_values().collect())
    }

    pub async fn get_paas_service(&self, ctx: &Context, id: &str) -> Result<PaaSService> {
        validate_id(id)?;
        let envelope: PaaSServiceEnvelope = self
            .http
            .execute(
                ctx,
                RequestDescriptor::get(format!("{}/{}", PAAS_SERVICE_BASE, id))
                    .caller("get_paas_service"),
            )
            .await?;
        Ok(envelope.paas_service)
    }

    pub async fn update_paas_service(
        &self,
        ctx: &Context,
        id: &str,
        body: &PaaSServiceUpdateRequest,
    ) -> Result<()> {
        validate_id(id)?;
        self.http
            .execute_unit(
                ctx,
                RequestDescriptor::patch(format!("{}/{}", PAAS_SERVICE_BASE, id))
                    .json(body)?
                    .caller("update_paas_service"),
            )
            .await
    }

    /// Resize a Kubernetes service, keeping every other parameter as it is
    pub async fn set_paas_worker_node_count(
        &self,
        ctx: &Context,
        id: &str,
        count: u64,
    ) -> Result<()> {
        let service = self.get_paas_service(ctx, id).await?;
        if service.worker_node_count().is_none() {
            return Err(Error::wrap(
                ErrorKind::ValidationFailed,
                format!("PaaS service {} has no '{}' parameter", id, WORKER_NODE_COUNT_PARAM),
            ));
        }
        let mut parameters = service.parameters;
        parameters.insert(WORKER_NODE_COUNT_PARAM.to_string(), Value::from(count));
        let body = PaaSServiceUpdateRequest {
            parameters: Some(parameters),
            ..Default::default()
        };
        self.update_paas_service(ctx, id, &body).await
    }
}
