//! Typed CRUD calls for knowledge-graph entities.
//!
//! Thin helpers over [`ApiClient`]; every call goes through the wrapper and
//! is therefore recorded in the debug log like any other.

pub mod fields;
pub mod types;

pub use fields::{parse_json_field, parse_properties, FieldError};
pub use types::{Entity, EntityList, EntityUpdate, NewEntity};

use crate::client::{encode_path, ApiClient, ClientError, RequestConfig};

pub struct EntitiesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> EntitiesApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// List entities, optionally restricted to one type.
    pub async fn list(&self, entity_type: Option<&str>) -> Result<EntityList, ClientError> {
        let config = entity_type.map(|t| RequestConfig::default().query("type", t));
        let envelope = self.client.get::<EntityList>("/entities", config).await?;
        Ok(envelope.into_data()?.unwrap_or_default())
    }

    pub async fn get(&self, id: &str) -> Result<Entity, ClientError> {
        self.client
            .get::<Entity>(&entity_path(id)?, None)
            .await?
            .require_data()
    }

    pub async fn create(&self, entity: &NewEntity) -> Result<Entity, ClientError> {
        self.client
            .post::<Entity, _>("/entities", Some(entity), None)
            .await?
            .require_data()
    }

    pub async fn update(&self, id: &str, update: &EntityUpdate) -> Result<Entity, ClientError> {
        self.client
            .put::<Entity, _>(&entity_path(id)?, Some(update), None)
            .await?
            .require_data()
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.client
            .delete::<serde_json::Value>(&entity_path(id)?, None)
            .await?
            .into_data()?;
        Ok(())
    }
}

/// `/entities/{id}` with the id escaped as a single segment.
fn entity_path(id: &str) -> Result<String, ClientError> {
    encode_path(&["entities", id])
}
