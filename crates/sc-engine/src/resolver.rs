use crate::*;

/// Property layers below a record's own overlay, lowest precedence first:
/// engine entry, device entry, platform entry, then the family properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AncestorChain {
    layers: Vec<PropertyMap>,
}

impl AncestorChain {
    pub fn new(layers: Vec<PropertyMap>) -> Self {
        Self { layers }
    }

    /// Builds the chain for one expanded combination. Every layer gets the same
    /// placeholder substitution as the record's match string.
    pub fn for_combination(
        parent: &UserAgentDefinition,
        combination: &Combination,
        catalogs: &ResolvedCatalogs,
    ) -> Result<Self, DefinitionError> {
        let selected = [
            (CatalogKind::Engine, combination.engine.as_ref()),
            (CatalogKind::Device, combination.device.as_ref()),
            (CatalogKind::Platform, combination.platform.as_ref()),
        ];

        let mut layers = Vec::with_capacity(selected.len() + 1);
        for (kind, key) in selected {
            if let Some(key) = key {
                let entry = catalogs.entry(kind, key)?;
                layers.push(combination.substitute_properties(&entry.properties));
            }
        }
        layers.push(combination.substitute_properties(&parent.properties));

        Ok(Self { layers })
    }

    pub fn layers(&self) -> &[PropertyMap] {
        &self.layers
    }
}

/// Left fold of the ancestor layers followed by the record's own properties.
/// Later layers overwrite earlier ones; nothing is ever removed.
pub fn merge(record: &ConcreteRecord, chain: &AncestorChain) -> PropertyMap {
    let mut merged = PropertyMap::new();
    for layer in chain.layers().iter().chain(std::iter::once(&record.properties)) {
        for (key, value) in layer {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Replaces the record's overlay with its fully merged properties.
pub fn materialize(mut record: ConcreteRecord, chain: &AncestorChain) -> ConcreteRecord {
    record.properties = merge(&record, chain);
    record
}
