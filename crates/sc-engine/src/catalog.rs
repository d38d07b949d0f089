use crate::*;

/// Catalogs whose `inherits` chains have been flattened. Expansion and merging
/// only accept this form.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCatalogs {
    inner: Catalogs,
}

impl ResolvedCatalogs {
    pub fn platforms(&self) -> &Catalog {
        &self.inner.platforms
    }

    pub fn devices(&self) -> &Catalog {
        &self.inner.devices
    }

    pub fn engines(&self) -> &Catalog {
        &self.inner.engines
    }

    pub fn by_kind(&self, kind: CatalogKind) -> &Catalog {
        match kind {
            CatalogKind::Platform => self.platforms(),
            CatalogKind::Device => self.devices(),
            CatalogKind::Engine => self.engines(),
        }
    }

    /// Looks up `key`, failing with the kind-specific not-found error.
    pub(crate) fn entry(
        &self,
        kind: CatalogKind,
        key: &str,
    ) -> Result<&CatalogEntry, DefinitionError> {
        self.by_kind(kind).get(key).ok_or_else(|| {
            let code = match kind {
                CatalogKind::Platform => "PLATFORM_NOT_FOUND",
                CatalogKind::Device => "DEVICE_NOT_FOUND",
                CatalogKind::Engine => "ENGINE_NOT_FOUND",
            };
            DefinitionError::conflict(code, format!("the {} \"{}\" is not defined", kind, key))
        })
    }
}

pub fn resolve_catalogs(catalogs: &Catalogs) -> Result<ResolvedCatalogs, DefinitionError> {
    Ok(ResolvedCatalogs {
        inner: Catalogs {
            platforms: resolve_catalog(&catalogs.platforms)?,
            devices: resolve_catalog(&catalogs.devices)?,
            engines: resolve_catalog(&catalogs.engines)?,
        },
    })
}

/// Flattens every entry's `inherits` chain. Ancestors contribute first, the entry's
/// own properties overwrite them. Declared entry order is kept.
pub fn resolve_catalog(catalog: &Catalog) -> Result<Catalog, DefinitionError> {
    let mut resolved: HashMap<String, CatalogEntry> = HashMap::new();
    for key in catalog.entries.keys() {
        resolve_entry(key, catalog, &mut resolved, &mut Vec::new())?;
    }

    let mut entries = IndexMap::new();
    for key in catalog.entries.keys() {
        if let Some(entry) = resolved.remove(key) {
            entries.insert(key.clone(), entry);
        }
    }

    Ok(Catalog::with_entries(catalog.kind, entries))
}

fn resolve_entry(
    key: &str,
    catalog: &Catalog,
    resolved: &mut HashMap<String, CatalogEntry>,
    stack: &mut Vec<String>,
) -> Result<CatalogEntry, DefinitionError> {
    if let Some(done) = resolved.get(key) {
        return Ok(done.clone());
    }

    if stack.iter().any(|visiting| visiting == key) {
        stack.push(key.to_string());
        return Err(DefinitionError::conflict(
            "CATALOG_INHERITS_CYCLE",
            format!(
                "{} inheritance cycle detected: {}",
                catalog.kind,
                stack.join(" -> ")
            ),
        ));
    }

    let Some(entry) = catalog.get(key) else {
        let referrer = stack.last().map(String::as_str).unwrap_or_default();
        return Err(DefinitionError::conflict(
            "CATALOG_INHERITS_NOT_FOUND",
            format!(
                "the {} \"{}\" inherits from \"{}\", which is not defined",
                catalog.kind, referrer, key
            ),
        ));
    };

    stack.push(key.to_string());
    let mut flattened = match &entry.inherits {
        Some(ancestor) => resolve_entry(ancestor, catalog, resolved, stack)?,
        None => CatalogEntry::default(),
    };
    stack.pop();

    for (name, value) in &entry.properties {
        flattened.properties.insert(name.clone(), value.clone());
    }
    if entry.match_fragment.is_some() {
        flattened.match_fragment = entry.match_fragment.clone();
    }
    flattened.inherits = None;

    resolved.insert(key.to_string(), flattened.clone());
    Ok(flattened)
}
