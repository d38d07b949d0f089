use crate::*;

pub(crate) fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

pub(crate) fn props(entries: &[(&str, PropertyValue)]) -> PropertyMap {
    entries
        .iter()
        .map(|(key, value)| ((*key).to_string(), value.clone()))
        .collect()
}

pub(crate) fn raw(value: JsonValue) -> RawChild {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("test child must be a JSON object, got {}", other),
    }
}

/// Empty `versions` means the sentinel list.
pub(crate) fn family(user_agent: &str, versions: &[&str]) -> UserAgentDefinition {
    UserAgentDefinition {
        user_agent: user_agent.to_string(),
        properties: props(&[("Browser", PropertyValue::from(user_agent))]),
        versions: if versions.is_empty() {
            sc_core::sentinel_versions()
        } else {
            strings(versions)
        },
        engine: None,
        device: None,
        platform: None,
        children: Vec::new(),
    }
}

pub(crate) fn entry(properties: PropertyMap) -> CatalogEntry {
    CatalogEntry {
        properties,
        inherits: None,
        match_fragment: None,
    }
}

pub(crate) fn catalogs() -> Catalogs {
    let mut platforms = IndexMap::new();
    platforms.insert(
        "WinXP".to_string(),
        entry(props(&[
            ("Platform", PropertyValue::from("WinXP")),
            ("Platform_Version", PropertyValue::from("5.1")),
            ("Win32", PropertyValue::Bool(true)),
            ("isMobileDevice", PropertyValue::Bool(false)),
        ])),
    );
    platforms.insert(
        "Win7".to_string(),
        entry(props(&[
            ("Platform", PropertyValue::from("Win7")),
            ("Platform_Version", PropertyValue::from("6.1")),
            ("Win32", PropertyValue::Bool(true)),
        ])),
    );
    platforms.insert(
        "Android_Dynamic".to_string(),
        CatalogEntry {
            properties: props(&[("Platform", PropertyValue::from("Android"))]),
            inherits: None,
            match_fragment: Some("Linux; Android".to_string()),
        },
    );

    let mut devices = IndexMap::new();
    devices.insert(
        "Windows Desktop".to_string(),
        entry(props(&[
            ("Device_Name", PropertyValue::from("Windows Desktop")),
            ("Device_Type", PropertyValue::from("Desktop")),
            ("isMobileDevice", PropertyValue::Bool(false)),
        ])),
    );
    devices.insert(
        "Nexus 5".to_string(),
        entry(props(&[
            ("Device_Name", PropertyValue::from("Nexus 5")),
            ("Device_Type", PropertyValue::from("Mobile Phone")),
            ("isMobileDevice", PropertyValue::Bool(true)),
        ])),
    );

    let mut engines = IndexMap::new();
    engines.insert(
        "Trident".to_string(),
        entry(props(&[
            ("RenderingEngine_Name", PropertyValue::from("Trident")),
            ("RenderingEngine_Maker", PropertyValue::from("Microsoft Corporation")),
        ])),
    );

    Catalogs {
        platforms: Catalog::with_entries(CatalogKind::Platform, platforms),
        devices: Catalog::with_entries(CatalogKind::Device, devices),
        engines: Catalog::with_entries(CatalogKind::Engine, engines),
    }
}

pub(crate) fn resolved_catalogs() -> ResolvedCatalogs {
    resolve_catalogs(&catalogs()).expect("test catalogs should resolve")
}
