//! Private networks

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use nimbus_core::{Context, RequestDescriptor, Result};
use serde::{Deserialize, Serialize};

use super::{validate_id, GridscaleClient};

const NETWORK_BASE: &str = "/objects/networks";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Network {
    pub object_uuid: String,
    pub name: String,
    pub status: String,
    pub location_uuid: String,
    pub public_net: bool,
    pub l2security: bool,
    pub labels: Vec<String>,
    pub create_time: Option<DateTime<Utc>>,
    pub change_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct NetworkEnvelope {
    network: Network,
}

#[derive(Debug, Deserialize)]
struct NetworkList {
    #[serde(default)]
    networks: BTreeMap<String, Network>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkCreateRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    pub l2security: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NetworkCreateResponse {
    pub object_uuid: String,
    pub request_uuid: String,
}

impl GridscaleClient {
    pub async fn get_network(&self, ctx: &Context, id: &str) -> Result<Network> {
        validate_id(id)?;
        let envelope: NetworkEnvelope = self
            .http
            .execute(
                ctx,
                RequestDescriptor::get(format!("{}/{}", NETWORK_BASE, id)).caller("get_network"),
            )
            .await?;
        Ok(envelope.network)
    }

    pub async fn get_network_list(&self, ctx: &Context) -> Result<Vec<Network>> {
        let list: NetworkList = self
            .http
            .execute(ctx, RequestDescriptor::get(NETWORK_BASE).caller("get_network_list"))
            .await?;
        Ok(list.networks.into_values().collect())
    }

    pub async fn create_network(
        &self,
        ctx: &Context,
        body: &NetworkCreateRequest,
    ) -> Result<NetworkCreateResponse> {
        self.http
            .execute(
                ctx,
                RequestDescriptor::post(NETWORK_BASE)
                    .json(body)?
                    .caller("create_network"),
            )
            .await
    }

    pub async fn delete_network(&self, ctx: &Context, id: &str) -> Result<()> {
        validate_id(id)?;
        self.http
            .execute_unit(
                ctx,
                RequestDescriptor::delete(format!("{}/{}", NETWORK_BASE, id))
                    .caller("delete_network"),
            )
            .await
    }
}
