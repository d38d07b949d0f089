use crate::*;

/// One platform x device x version choice for a child. `None` marks an axis the
/// child does not multiply over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Combination {
    pub platform: Option<String>,
    /// Text written in place of `#PLATFORM#`.
    pub platform_token: Option<String>,
    pub device: Option<String>,
    pub engine: Option<String>,
    pub version: Option<String>,
}

impl Combination {
    pub fn substitute(&self, template: &str) -> String {
        let mut out = template.to_string();
        if let Some(token) = &self.platform_token {
            out = out.replace(PLATFORM_PLACEHOLDER, token);
        }
        if let Some(device) = &self.device {
            out = out.replace(DEVICE_PLACEHOLDER, device);
        }
        if let Some(version) = &self.version {
            let (major, minor) = split_version(version);
            out = out
                .replace(MAJOR_VERSION_PLACEHOLDER, major)
                .replace(MINOR_VERSION_PLACEHOLDER, minor);
        }
        out
    }

    /// Substitutes placeholders inside string values. Values that change are
    /// coerced again, so `"#X#"` can turn into a boolean literal.
    pub fn substitute_properties(&self, properties: &PropertyMap) -> PropertyMap {
        properties
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    PropertyValue::String(text) => {
                        let substituted = self.substitute(text);
                        if substituted == *text {
                            value.clone()
                        } else {
                            coerce_scalar(&substituted)
                        }
                    }
                    PropertyValue::Bool(_) => value.clone(),
                };
                (key.clone(), value)
            })
            .collect()
    }
}

/// Splits on the first `.`; a version without one has minor `0`.
pub fn split_version(version: &str) -> (&str, &str) {
    version.split_once('.').unwrap_or((version, "0"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedRecord {
    /// Properties hold the child overlay plus catalog identity keys, not yet merged
    /// with ancestors.
    pub record: ConcreteRecord,
    pub combination: Combination,
}

/// Expands a validated child into one record per platform x device x version,
/// platform outermost and version innermost, in declared order.
pub fn expand(
    child: &ChildDefinition,
    origin: &ChildOrigin,
    parent: &UserAgentDefinition,
    catalogs: &ResolvedCatalogs,
    versions: &[String],
) -> Result<Vec<ExpandedRecord>, DefinitionError> {
    let platforms = axis(child.platforms.as_ref(), parent.platform.as_ref());
    let devices = axis(child.devices.as_ref(), parent.device.as_ref());
    let versions = version_axis(&child.match_template, versions);
    let engine = child.engine.clone().or_else(|| parent.engine.clone());

    if platforms.is_empty() || devices.is_empty() {
        tracing::warn!(
            user_agent = %parent.user_agent,
            child = %child.match_template,
            "child declares an empty platforms or devices list and expands to nothing"
        );
    }

    for platform in platforms.iter().flatten() {
        catalogs.entry(CatalogKind::Platform, platform)?;
    }
    for device in devices.iter().flatten() {
        catalogs.entry(CatalogKind::Device, device)?;
    }
    if let Some(engine) = &engine {
        catalogs.entry(CatalogKind::Engine, engine)?;
    }

    let mut out = Vec::with_capacity(platforms.len() * devices.len() * versions.len());
    for platform in &platforms {
        let platform_token = match platform {
            Some(key) => {
                let entry = catalogs.entry(CatalogKind::Platform, key)?;
                Some(entry.match_fragment.clone().unwrap_or_else(|| key.clone()))
            }
            None => None,
        };

        for device in &devices {
            for version in &versions {
                let combination = Combination {
                    platform: platform.clone(),
                    platform_token: platform_token.clone(),
                    device: device.clone(),
                    engine: engine.clone(),
                    version: version.clone(),
                };

                let mut properties = combination.substitute_properties(&child.properties);
                for (key, value) in identity_properties(&combination, catalogs)? {
                    properties.insert(key, value);
                }

                out.push(ExpandedRecord {
                    record: ConcreteRecord {
                        match_string: combination.substitute(&child.match_template),
                        properties,
                        source_child: origin.clone(),
                    },
                    combination,
                });
            }
        }
    }

    tracing::debug!(
        user_agent = %parent.user_agent,
        child = %child.match_template,
        records = out.len(),
        "expanded child"
    );
    Ok(out)
}

fn axis(own: Option<&Vec<String>>, inherited: Option<&String>) -> Vec<Option<String>> {
    match (own, inherited) {
        (Some(keys), _) => keys.iter().cloned().map(Some).collect(),
        (None, Some(key)) => vec![Some(key.clone())],
        (None, None) => vec![None],
    }
}

fn version_axis(template: &str, versions: &[String]) -> Vec<Option<String>> {
    if has_version_placeholder(template) {
        return versions.iter().cloned().map(Some).collect();
    }
    // A single real version still feeds placeholders inside property values.
    if versions.len() == 1 && !is_sentinel_versions(versions) {
        return vec![Some(versions[0].clone())];
    }
    vec![None]
}

/// Scope-owned keys of the selected catalog entries, engine then device then platform.
fn identity_properties(
    combination: &Combination,
    catalogs: &ResolvedCatalogs,
) -> Result<PropertyMap, DefinitionError> {
    let selected = [
        (Scope::Engine, combination.engine.as_ref()),
        (Scope::Device, combination.device.as_ref()),
        (Scope::Platform, combination.platform.as_ref()),
    ];

    let mut identity = PropertyMap::new();
    for (scope, key) in selected {
        let Some(key) = key else {
            continue;
        };
        let entry = catalogs.entry(scope.catalog_kind(), key)?;
        let owned = scope.identity_subset(&entry.properties);
        for (name, value) in combination.substitute_properties(&owned) {
            identity.insert(name, value);
        }
    }
    Ok(identity)
}
