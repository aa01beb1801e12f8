//! Block storages

use chrono::{DateTime, Utc};
use nimbus_core::{Context, RequestDescriptor, Result};
use serde::{Deserialize, Serialize};

use super::{validate_id, GridscaleClient};

const STORAGE_BASE: &str = "/objects/storages";

/// Performance class of a storage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    #[default]
    Storage,
    StorageHigh,
    StorageInsane,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Storage {
    pub object_uuid: String,
    pub name: String,
    /// Capacity in GB
    pub capacity: u64,
    pub storage_type: StorageType,
    pub status: String,
    pub location_uuid: String,
    pub labels: Vec<String>,
    pub create_time: Option<DateTime<Utc>>,
    pub change_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct StorageEnvelope {
    storage: Storage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StorageCreateRequest {
    pub name: String,
    pub capacity: u64,
    pub storage_type: StorageType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageCreateResponse {
    pub object_uuid: String,
    pub request_uuid: String,
}

impl GridscaleClient {
    pub async fn get_storage(&self, ctx: &Context, id: &str) -> Result<Storage> {
        validate_id(id)?;
        let envelope: StorageEnvelope = self
            .http
            .execute(
                ctx,
                RequestDescriptor::get(format!("{}/{}", STORAGE_BASE, id)).caller("get_storage"),
            )
            .await?;
        Ok(envelope.storage)
    }

    pub async fn create_storage(
        &self,
        ctx: &Context,
        body: &StorageCreateRequest,
    ) -> Result<StorageCreateResponse> {
        self.http
            .execute(
                ctx,
                RequestDescriptor::post(STORAGE_BASE)
                    .json(body)?
                    .caller("create_storage"),
            )
            .await
    }

    pub async fn delete_storage(&self, ctx: &Context, id: &str) -> Result<()> {
        validate_id(id)?;
        self.http
            .execute_unit(
                ctx,
                RequestDescriptor::delete(format!("{}/{}", STORAGE_BASE, id))
                    .caller("delete_storage"),
            )
            .await
    }
}
