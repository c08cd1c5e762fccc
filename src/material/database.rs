//! Immutable material snapshot loaded from the game's materials JSON.
//!
//! The JSON format is the content database export:
//!
//! ```json
//! { "materials": [
//!     { "materialId": "iron_ore", "category": "metal", "tier": 1,
//!       "tags": ["basic", "metal"] }
//! ] }
//! ```
//!
//! Tags can live in three places on a record; [`resolve_tags`] picks one.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::lookup::{MaterialId, MaterialInfo, MaterialLookup, KNOWN_CATEGORIES};

/// Errors that can occur while loading a material database.
#[derive(Debug, thiserror::Error)]
pub enum MaterialDbError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse materials JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate material id: '{0}'")]
    DuplicateId(String),

    #[error("material record with empty id")]
    EmptyId,
}

/// Top-level shape of the materials file.
#[derive(Debug, Clone, Deserialize)]
pub struct MaterialFile {
    pub materials: Vec<MaterialRecord>,
}

/// A raw material record as exported by the content database.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRecord {
    pub material_id: String,
    pub category: String,
    pub tier: i64,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Generic property bag; may embed a `"tags"` array.
    #[serde(default)]
    pub properties: Option<HashMap<String, Value>>,
    #[serde(default)]
    pub metadata: Option<RecordMetadata>,
}

/// Secondary metadata block carrying its own tag list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordMetadata {
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Resolves a record's tags through the fixed priority chain:
/// `tags` field, then `properties.tags`, then `metadata.tags`, then empty.
///
/// The first non-empty source wins; sources are never merged. Order within
/// the winning source is preserved.
pub fn resolve_tags(record: &MaterialRecord) -> Vec<String> {
    if let Some(tags) = record.tags.as_ref().filter(|t| !t.is_empty()) {
        return tags.clone();
    }

    let embedded: Vec<String> = record
        .properties
        .as_ref()
        .and_then(|props| props.get("tags"))
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    if !embedded.is_empty() {
        return embedded;
    }

    if let Some(tags) = record
        .metadata
        .as_ref()
        .and_then(|m| m.tags.as_ref())
        .filter(|t| !t.is_empty())
    {
        return tags.clone();
    }

    Vec::new()
}

/// An immutable, id-indexed material snapshot.
#[derive(Debug, Clone, Default)]
pub struct MaterialDatabase {
    materials: HashMap<String, MaterialInfo>,
    /// Ids in file order, for deterministic iteration.
    order: Vec<String>,
}

impl MaterialDatabase {
    /// Builds a snapshot from already-parsed records.
    pub fn from_records(records: Vec<MaterialRecord>) -> Result<Self, MaterialDbError> {
        let mut materials = HashMap::with_capacity(records.len());
        let mut order = Vec::with_capacity(records.len());

        for record in records {
            if record.material_id.is_empty() {
                return Err(MaterialDbError::EmptyId);
            }
            if materials.contains_key(&record.material_id) {
                return Err(MaterialDbError::DuplicateId(record.material_id));
            }

            if !KNOWN_CATEGORIES.contains(&record.category.as_str()) {
                tracing::warn!(
                    id = %record.material_id,
                    category = %record.category,
                    "material has an unrecognized category; encoders will use fallbacks"
                );
            }

            // Out-of-range tiers are kept; encoders have fallbacks for them.
            if !(1..=4).contains(&record.tier) {
                tracing::warn!(
                    id = %record.material_id,
                    tier = record.tier,
                    "material tier outside 1..=4; encoders will use fallbacks"
                );
            }
            let tier = u8::try_from(record.tier).unwrap_or(0);

            let tags = resolve_tags(&record);
            let info = MaterialInfo::new(record.category, tier, tags);
            order.push(record.material_id.clone());
            materials.insert(record.material_id, info);
        }

        tracing::info!(count = order.len(), "loaded material database");
        Ok(MaterialDatabase { materials, order })
    }

    /// Parses a snapshot from materials JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, MaterialDbError> {
        let file: MaterialFile = serde_json::from_str(json)?;
        Self::from_records(file.materials)
    }

    /// Loads a snapshot from a materials JSON file.
    pub fn load(path: &Path) -> Result<Self, MaterialDbError> {
        let data = fs::read_to_string(path).map_err(|source| MaterialDbError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&data)
    }

    /// Adds or replaces a material, returning a new snapshot builder-style.
    pub fn with_material(mut self, id: impl Into<String>, info: MaterialInfo) -> Self {
        let id = id.into();
        if self.materials.insert(id.clone(), info).is_none() {
            self.order.push(id);
        }
        self
    }

    /// Number of materials in the snapshot.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Material ids in load order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

impl MaterialLookup for MaterialDatabase {
    fn get_material(&self, id: &MaterialId) -> Option<&MaterialInfo> {
        self.materials.get(id)
    }
}
