use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ItemId, LayoutKind};

/// Persisted level description: an ordered list of entries, one per segment
/// activation. Loaded once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayoutMap {
    pub layouts: Vec<MapEntry>,
}

impl LayoutMap {
    /// The entries the assembly controller actually walks, in order.
    pub fn enabled_entries(&self) -> Vec<MapEntry> {
        self.layouts
            .iter()
            .filter(|entry| entry.enable)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MapEntry {
    pub enable: bool,
    pub zone: i32,
    #[serde(rename = "type")]
    pub kind: LayoutKind,
    #[serde(default)]
    pub items: Vec<ItemRef>,
    #[serde(rename = "nextTypes", default)]
    pub next_kinds: Vec<LayoutKind>,
    #[serde(default)]
    pub config: MapEntryConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ItemRef {
    pub id: ItemId,
}

/// Reserved per-entry configuration block. Empty today; kept so existing
/// map files stay forward compatible when fields land here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct MapEntryConfig {}

#[derive(Debug, Error)]
pub enum MapParseError {
    #[error("failed to parse map json: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse map json at {path}: {source}")]
    JsonAtPath {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One-time deserialization of the map description, reporting the failing
/// JSON path on malformed input.
pub fn parse_layout_map(raw: &str) -> Result<LayoutMap, MapParseError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, LayoutMap>(&mut deserializer) {
        Ok(map) => Ok(map),
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            if path.is_empty() || path == "." {
                Err(MapParseError::Json { source })
            } else {
                Err(MapParseError::JsonAtPath { path, source })
            }
        }
    }
}
