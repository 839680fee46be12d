//! Knowledge-graph entity types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A node in the backend's knowledge graph (Person, Project, Document, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub name: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload of `GET /entities`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityList {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// Body of `POST /entities`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEntity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub name: String,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Body of `PUT /entities/{id}`; unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
}
