use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::value::PropertyMap;

pub const PLATFORM_PLACEHOLDER: &str = "#PLATFORM#";
pub const DEVICE_PLACEHOLDER: &str = "#DEVICE#";
pub const MAJOR_VERSION_PLACEHOLDER: &str = "#MAJORVER#";
pub const MINOR_VERSION_PLACEHOLDER: &str = "#MINORVER#";

/// A family that declares no real version axis resolves to exactly this list.
pub const SENTINEL_VERSION: &str = "0.0";

/// An authored child exactly as it appeared in the source file. Shape checks are
/// left to the child validator.
pub type RawChild = serde_json::Map<String, serde_json::Value>;

pub fn sentinel_versions() -> Vec<String> {
    vec![SENTINEL_VERSION.to_string()]
}

/// An empty list counts as the sentinel too.
pub fn is_sentinel_versions(versions: &[String]) -> bool {
    versions.is_empty() || (versions.len() == 1 && versions[0] == SENTINEL_VERSION)
}

/// Absent and empty version lists both resolve to the sentinel.
pub fn normalize_versions(versions: Vec<String>) -> Vec<String> {
    if versions.is_empty() {
        sentinel_versions()
    } else {
        versions
    }
}

fn deserialize_versions<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<String>::deserialize(deserializer).map(normalize_versions)
}

pub fn has_version_placeholder(template: &str) -> bool {
    template.contains(MAJOR_VERSION_PLACEHOLDER) || template.contains(MINOR_VERSION_PLACEHOLDER)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAgentDefinition {
    pub user_agent: String,
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(default = "sentinel_versions", deserialize_with = "deserialize_versions")]
    pub versions: Vec<String>,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub children: Vec<RawChild>,
}

/// A child that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildDefinition {
    #[serde(rename = "match")]
    pub match_template: String,
    /// `device` is folded into a one-element list here.
    pub devices: Option<Vec<String>>,
    pub platforms: Option<Vec<String>>,
    pub properties: PropertyMap,
    pub engine: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Platform,
    Device,
    Engine,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Platform => f.write_str("platform"),
            Self::Device => f.write_str("device"),
            Self::Engine => f.write_str("engine"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(default)]
    pub inherits: Option<String>,
    /// Text substituted for `#PLATFORM#`; falls back to the entry key.
    #[serde(default, rename = "match")]
    pub match_fragment: Option<String>,
}

pub type PlatformCatalogEntry = CatalogEntry;
pub type DeviceCatalogEntry = CatalogEntry;
pub type EngineCatalogEntry = CatalogEntry;

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub kind: CatalogKind,
    pub entries: IndexMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn new(kind: CatalogKind) -> Self {
        Self {
            kind,
            entries: IndexMap::new(),
        }
    }

    pub fn with_entries(kind: CatalogKind, entries: IndexMap<String, CatalogEntry>) -> Self {
        Self { kind, entries }
    }

    pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalogs {
    pub platforms: Catalog,
    pub devices: Catalog,
    pub engines: Catalog,
}

impl Default for Catalogs {
    fn default() -> Self {
        Self {
            platforms: Catalog::new(CatalogKind::Platform),
            devices: Catalog::new(CatalogKind::Device),
            engines: Catalog::new(CatalogKind::Engine),
        }
    }
}

/// Positional identity of the child a record was generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildOrigin {
    pub user_agent: String,
    pub child_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcreteRecord {
    #[serde(rename = "match")]
    pub match_string: String,
    pub properties: PropertyMap,
    #[serde(flatten)]
    pub source_child: ChildOrigin,
}
