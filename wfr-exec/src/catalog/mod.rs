//! Operation kinds published by the standards schema.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{info, instrument, warn};
use url::Url;
use wfr_core::OperationId;

use crate::config::CatalogConfig;
use crate::http::{HttpClient, HttpError, HttpRequest};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid operation schema URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("operation schema request failed: {0}")]
    Http(#[from] HttpError),
    #[error("operation schema returned HTTP {status}")]
    Status { status: u16 },
    #[error("operation schema is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("operation schema has no `$defs` object")]
    MissingDefinitions,
    #[error("operation definition '{name}' is invalid: {reason}")]
    InvalidDefinition { name: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct OperationKind {
    pub id: OperationId,
    pub title: String,
    pub description: Option<String>,
    /// The declared `properties` schema of the operation object.
    pub properties: JsonValue,
    pub additional_properties: bool,
    /// Every provider may hold distinct data, so all of them must be asked.
    pub unique: bool,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct OperationTable {
    kinds: BTreeMap<OperationId, OperationKind>,
}

impl OperationTable {
    pub fn from_kinds(kinds: impl IntoIterator<Item = OperationKind>) -> Self {
        let mut table = BTreeMap::new();
        for kind in kinds {
            table.entry(kind.id.clone()).or_insert(kind);
        }
        Self { kinds: table }
    }

    pub fn get(&self, id: &OperationId) -> Option<&OperationKind> {
        self.kinds.get(id)
    }

    pub fn contains(&self, id: &OperationId) -> bool {
        self.kinds.contains_key(id)
    }

    pub fn is_unique(&self, id: &OperationId) -> bool {
        self.kinds.get(id).is_some_and(|k| k.unique)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OperationKind> {
        self.kinds.values()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[derive(Debug, serde::Deserialize)]
struct SchemaDefinition {
    #[serde(default)]
    title: Option<String>,

    #[serde(default)]
    description: Option<String>,

    #[serde(default)]
    properties: serde_json::Map<String, JsonValue>,

    #[serde(rename = "additionalProperties", default)]
    additional_properties: Option<JsonValue>,
}

/// Fetches the operation schema document.
#[derive(Clone)]
pub struct OperationCatalog {
    http: Arc<dyn HttpClient>,
    config: CatalogConfig,
}

impl OperationCatalog {
    pub fn new(http: Arc<dyn HttpClient>, config: CatalogConfig) -> Self {
        Self { http, config }
    }

    #[instrument(name = "catalog_fetch", skip_all, fields(schema = %self.config.schema_url))]
    pub async fn fetch(&self) -> Result<OperationTable, CatalogError> {
        let url = Url::parse(&self.config.schema_url).map_err(|e| CatalogError::InvalidUrl {
            url: self.config.schema_url.clone(),
            reason: e.to_string(),
        })?;
        let resp = self
            .http
            .send(
                HttpRequest::get(url),
                self.config.fetch_timeout,
                self.config.max_response_bytes,
            )
            .await?;
        if !resp.is_success() {
            return Err(CatalogError::Status {
                status: resp.status,
            });
        }
        let doc: JsonValue = serde_json::from_slice(&resp.body)?;
        let table = parse_operation_schema(&doc)?;
        info!(operations = table.len(), "operation catalog loaded");
        Ok(table)
    }
}

/// Turn a schema document's `$defs` into operation kinds. Any bad definition fails the
/// whole table.
pub fn parse_operation_schema(doc: &JsonValue) -> Result<OperationTable, CatalogError> {
    let defs = doc
        .get("$defs")
        .and_then(JsonValue::as_object)
        .ok_or(CatalogError::MissingDefinitions)?;

    let mut kinds = Vec::with_capacity(defs.len());
    for (name, raw) in defs {
        let def: SchemaDefinition =
            serde_json::from_value(raw.clone()).map_err(|e| CatalogError::InvalidDefinition {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let id = def
            .properties
            .get("id")
            .and_then(declared_constant)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| name.clone());
        let unique = match def.properties.get("unique") {
            Some(JsonValue::Bool(b)) => *b,
            Some(schema) => declared_constant(schema)
                .and_then(JsonValue::as_bool)
                .unwrap_or(false),
            None => false,
        };
        let additional_properties = match def.additional_properties {
            Some(JsonValue::Bool(b)) => b,
            _ => true,
        };
        if kinds.iter().any(|k: &OperationKind| k.id.as_str() == id) {
            warn!(definition = %name, id = %id, "duplicate operation id; keeping the first");
        }
        kinds.push(OperationKind {
            id: OperationId::from(id),
            title: def.title.unwrap_or_else(|| name.clone()),
            description: def.description,
            properties: JsonValue::Object(def.properties),
            additional_properties,
            unique,
        });
    }
    Ok(OperationTable::from_kinds(kinds))
}

/// The single value a property schema pins: `const`, `default`, or a one-element `enum`.
fn declared_constant(schema: &JsonValue) -> Option<&JsonValue> {
    schema
        .get("const")
        .or_else(|| schema.get("enum").and_then(|e| e.get(0)))
        .or_else(|| schema.get("default"))
}
