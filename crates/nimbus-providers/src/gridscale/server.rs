//! Servers

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use nimbus_core::{Context, RequestDescriptor, Result};
use serde::{Deserialize, Serialize};

use super::{validate_id, GridscaleClient};

const SERVER_BASE: &str = "/objects/servers";

/// Properties of a server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub object_uuid: String,
    pub name: String,
    /// Memory in GB
    pub memory: u32,
    pub cores: u32,
    pub hardware_profile: String,
    pub status: String,
    pub location_uuid: String,
    pub power: bool,
    pub availability_zone: String,
    pub auto_recovery: bool,
    pub legacy: bool,
    pub labels: Vec<String>,
    pub create_time: Option<DateTime<Utc>>,
    pub change_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ServerEnvelope {
    server: Server,
}

#[derive(Debug, Deserialize)]
struct ServerList {
    #[serde(default)]
    servers: BTreeMap<String, Server>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServerCreateRequest {
    pub name: String,
    pub memory: u32,
    pub cores: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_recovery: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relations: Option<ServerCreateRelations>,
}

/// Objects attached at creation time; empty lists are sent as `[]`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServerCreateRelations {
    pub isoimages: Vec<IsoImageRelation>,
    pub networks: Vec<NetworkRelation>,
    pub public_ips: Vec<IpRelation>,
    pub storages: Vec<StorageRelation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IsoImageRelation {
    pub isoimage_uuid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkRelation {
    pub network_uuid: String,
    #[serde(rename = "bootdevice", skip_serializing_if = "std::ops::Not::not")]
    pub boot_device: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IpRelation {
    pub ipaddr_uuid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageRelation {
    pub storage_uuid: String,
    #[serde(rename = "bootdevice", skip_serializing_if = "std::ops::Not::not")]
    pub boot_device: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerCreateResponse {
    pub object_uuid: String,
    pub request_uuid: String,
    pub server_uuid: String,
    pub network_uuids: Vec<String>,
    pub storage_uuids: Vec<String>,
    pub ipaddr_uuids: Vec<String>,
}

impl ServerCreateResponse {
    /// The API fills only one of `object_uuid`/`server_uuid` depending on
    /// whether relations were sent; copy it into the other.
    fn mirror_uuids(&mut self) {
        if self.server_uuid.is_empty() && !self.object_uuid.is_empty() {
            self.server_uuid = self.object_uuid.clone();
        } else if self.object_uuid.is_empty() && !self.server_uuid.is_empty() {
            self.object_uuid = self.server_uuid.clone();
        }
    }
}

/// Partial update; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServerUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_recovery: Option<bool>,
}

#[derive(Debug, Serialize)]
struct EmptyBody {}

#[derive(Debug, Serialize)]
struct PowerUpdate {
    power: bool,
}

impl GridscaleClient {
    pub async fn get_server(&self, ctx: &Context, id: &str) -> Result<Server> {
        validate_id(id)?;
        let envelope: ServerEnvelope = self
            .http
            .execute(
                ctx,
                RequestDescriptor::get(format!("{}/{}", SERVER_BASE, id)).caller("get_server"),
            )
            .await?;
        Ok(envelope.server)
    }

    pub async fn get_server_list(&self, ctx: &Context) -> Result<Vec<Server>> {
        let list: ServerList = self
            .http
            .execute(ctx, RequestDescriptor::get(SERVER_BASE).caller("get_server_list"))
            .await?;
        Ok(list.servers.into_values().collect())
    }

    /// Create a server; in synchronous mode returns once provisioning is done
    pub async fn create_server(
        &self,
        ctx: &Context,
        body: &ServerCreateRequest,
    ) -> Result<ServerCreateResponse> {
        let mut response: ServerCreateResponse = self
            .http
            .execute(
                ctx,
                RequestDescriptor::post(SERVER_BASE)
                    .json(body)?
                    .caller("create_server"),
            )
            .await?;
        response.mirror_uuids();
        Ok(response)
    }

    pub async fn update_server(
        &self,
        ctx: &Context,
        id: &str,
        body: &ServerUpdateRequest,
    ) -> Result<()> {
        validate_id(id)?;
        self.http
            .execute_unit(
                ctx,
                RequestDescriptor::patch(format!("{}/{}", SERVER_BASE, id))
                    .json(body)?
                    .caller("update_server"),
            )
            .await
    }

    pub async fn delete_server(&self, ctx: &Context, id: &str) -> Result<()> {
        validate_id(id)?;
        self.http
            .execute_unit(
                ctx,
                RequestDescriptor::delete(format!("{}/{}", SERVER_BASE, id))
                    .caller("delete_server"),
            )
            .await
    }

    pub async fn is_server_on(&self, ctx: &Context, id: &str) -> Result<bool> {
        Ok(self.get_server(ctx, id).await?.power)
    }

    pub async fn start_server(&self, ctx: &Context, id: &str) -> Result<()> {
        self.set_server_power(ctx, id, true).await
    }

    pub async fn stop_server(&self, ctx: &Context, id: &str) -> Result<()> {
        self.set_server_power(ctx, id, false).await
    }

    /// Ask the guest OS to power down; a server already off is left alone
    pub async fn shutdown_server(&self, ctx: &Context, id: &str) -> Result<()> {
        if !self.is_server_on(ctx, id).await? {
            tracing::debug!(server = id, "server already off, skipping shutdown");
            return Ok(());
        }
        self.http
            .execute_unit(
                ctx,
                RequestDescriptor::patch(format!("{}/{}/shutdown", SERVER_BASE, id))
                    .json(&EmptyBody {})?
                    .caller("shutdown_server"),
            )
            .await?;

        if self.synchronous() {
            self.wait_for_server_power(ctx, id, false).await?;
        }
        Ok(())
    }

    /// Poll the server every base delay until its power flag equals `on`
    pub async fn wait_for_server_power(&self, ctx: &Context, id: &str, on: bool) -> Result<()> {
        loop {
            if self.is_server_on(ctx, id).await? == on {
                return Ok(());
            }
            ctx.sleep(self.http.config().delay()).await?;
        }
    }

    async fn set_server_power(&self, ctx: &Context, id: &str, on: bool) -> Result<()> {
        if self.is_server_on(ctx, id).await? == on {
            tracing::debug!(server = id, power = on, "server already in requested power state");
            return Ok(());
        }
        self.http
            .execute_unit(
                ctx,
                RequestDescriptor::patch(format!("{}/{}/power", SERVER_BASE, id))
                    .json(&PowerUpdate { power: on })?
                    .caller("set_server_power"),
            )
            .await?;

        if self.synchronous() {
            self.wait_for_server_power(ctx, id, on).await?;
        }
        Ok(())
    }
}
