use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;
use sc_core::{
    normalize_versions, property_value_from_json, Catalog, CatalogEntry, CatalogKind, Catalogs,
    DefinitionError, PropertyMap, RawChild, UserAgentDefinition,
};
use serde::Deserialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::LoaderError;

const PLATFORMS_FILE: &str = "platforms.json";
const DEVICES_FILE: &str = "devices.json";
const ENGINES_FILE: &str = "engines.json";
const USER_AGENTS_DIR: &str = "user-agents/";

/// Everything the engine consumes for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinitionTree {
    pub families: Vec<UserAgentDefinition>,
    pub catalogs: Catalogs,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFamily {
    user_agent: String,
    #[serde(default)]
    properties: JsonMap<String, JsonValue>,
    #[serde(default)]
    versions: Vec<String>,
    #[serde(default)]
    engine: Option<String>,
    #[serde(default)]
    device: Option<String>,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    children: Vec<JsonValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFamilies {
    Many(Vec<RawFamily>),
    One(RawFamily),
}

#[derive(Debug, Deserialize)]
struct RawCatalogEntry {
    #[serde(default)]
    properties: JsonMap<String, JsonValue>,
    #[serde(default)]
    inherits: Option<String>,
    #[serde(default, rename = "match")]
    match_fragment: Option<String>,
}

/// Builds the definition tree from `relative path -> file content`. Catalog files
/// sit at the root, family files anywhere under `user-agents/`. Other files are
/// ignored.
pub fn load_tree_from_sources(
    sources: &BTreeMap<String, String>,
) -> Result<DefinitionTree, LoaderError> {
    let mut tree = DefinitionTree::default();
    let mut seen_user_agents = HashSet::new();

    for (path, text) in sources {
        match path.as_str() {
            PLATFORMS_FILE => {
                tree.catalogs.platforms = parse_catalog(CatalogKind::Platform, path, text)?
            }
            DEVICES_FILE => {
                tree.catalogs.devices = parse_catalog(CatalogKind::Device, path, text)?
            }
            ENGINES_FILE => {
                tree.catalogs.engines = parse_catalog(CatalogKind::Engine, path, text)?
            }
            _ if path.starts_with(USER_AGENTS_DIR) => {
                for family in parse_families(path, text)? {
                    if !seen_user_agents.insert(family.user_agent.clone()) {
                        return Err(DefinitionError::conflict(
                            "FAMILY_DUPLICATE",
                            format!(
                                "the userAgent \"{}\" in \"{}\" is already defined",
                                family.user_agent, path
                            ),
                        )
                        .into());
                    }
                    tree.families.push(family);
                }
            }
            _ => tracing::debug!(path = %path, "ignoring unrecognized resource file"),
        }
    }

    tracing::info!(
        families = tree.families.len(),
        platforms = tree.catalogs.platforms.len(),
        devices = tree.catalogs.devices.len(),
        engines = tree.catalogs.engines.len(),
        "loaded definition tree"
    );
    Ok(tree)
}

fn parse_json<T: for<'de> Deserialize<'de>>(path: &str, text: &str) -> Result<T, LoaderError> {
    serde_json::from_str(text).map_err(|source| LoaderError::ParseJson {
        path: path.to_string(),
        source,
    })
}

fn parse_catalog(kind: CatalogKind, path: &str, text: &str) -> Result<Catalog, LoaderError> {
    let raw: IndexMap<String, RawCatalogEntry> = parse_json(path, text)?;

    let mut entries = IndexMap::new();
    for (key, entry) in raw {
        let owner = format!("{} \"{}\"", kind, key);
        let properties = properties_from_json(&entry.properties, &owner)?;
        entries.insert(
            key,
            CatalogEntry {
                properties,
                inherits: entry.inherits,
                match_fragment: entry.match_fragment,
            },
        );
    }

    Ok(Catalog::with_entries(kind, entries))
}

fn parse_families(path: &str, text: &str) -> Result<Vec<UserAgentDefinition>, LoaderError> {
    let raw = match parse_json::<RawFamilies>(path, text)? {
        RawFamilies::Many(families) => families,
        RawFamilies::One(family) => vec![family],
    };

    raw.into_iter()
        .map(|family| family_from_raw(path, family).map_err(LoaderError::from))
        .collect()
}

fn family_from_raw(path: &str, raw: RawFamily) -> Result<UserAgentDefinition, DefinitionError> {
    if raw.user_agent.trim().is_empty() {
        return Err(DefinitionError::malformed(
            "FAMILY_USER_AGENT_EMPTY",
            format!("a family in \"{}\" has an empty userAgent", path),
        ));
    }

    let owner = format!("userAgent \"{}\"", raw.user_agent);
    let properties = properties_from_json(&raw.properties, &owner)?;

    let children = raw
        .children
        .into_iter()
        .enumerate()
        .map(|(index, child)| match child {
            JsonValue::Object(map) => Ok::<RawChild, DefinitionError>(map),
            other => Err(DefinitionError::malformed(
                "CHILD_NOT_OBJECT",
                format!(
                    "child #{} of key \"{}\" has to be an object, got: {}",
                    index, raw.user_agent, other
                ),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let versions = normalize_versions(raw.versions);

    Ok(UserAgentDefinition {
        user_agent: raw.user_agent,
        properties,
        versions,
        engine: raw.engine,
        device: raw.device,
        platform: raw.platform,
        children,
    })
}

fn properties_from_json(
    properties: &JsonMap<String, JsonValue>,
    owner: &str,
) -> Result<PropertyMap, DefinitionError> {
    let mut out = PropertyMap::new();
    for (key, value) in properties {
        let Some(value) = property_value_from_json(value) else {
            return Err(DefinitionError::malformed(
                "PROPERTY_VALUE_INVALID",
                format!(
                    "the property \"{}\" of {} has to be a scalar, got: {}",
                    key, owner, value
                ),
            ));
        };
        out.insert(key.clone(), value);
    }
    Ok(out)
}
