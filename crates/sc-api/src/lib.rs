use std::collections::BTreeMap;
use std::path::Path;

use sc_engine::{build_catalog, resolve_catalogs, validate_family};
use sc_loader::{load_resources_dir, load_tree_from_sources};

pub use sc_core::{ConcreteRecord, DefinitionError, ErrorKind, PropertyMap, PropertyValue};
pub use sc_engine::{BuildOptions, BuildOutcome, Diagnostic};
pub use sc_loader::{DefinitionTree, LoaderError};

pub fn load_dir(resources_dir: &Path) -> Result<DefinitionTree, LoaderError> {
    load_resources_dir(resources_dir)
}

pub fn build_from_dir(
    resources_dir: &Path,
    options: BuildOptions,
) -> Result<BuildOutcome, LoaderError> {
    let tree = load_resources_dir(resources_dir)?;
    Ok(build_tree(&tree, options))
}

pub fn build_from_sources(
    sources: &BTreeMap<String, String>,
    options: BuildOptions,
) -> Result<BuildOutcome, LoaderError> {
    let tree = load_tree_from_sources(sources)?;
    Ok(build_tree(&tree, options))
}

pub fn build_tree(tree: &DefinitionTree, options: BuildOptions) -> BuildOutcome {
    build_catalog(&tree.families, &tree.catalogs, options)
}

/// Runs only the validation phase: catalog inheritance and every child of every
/// family. Nothing is expanded.
pub fn validate_tree(tree: &DefinitionTree) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if let Err(error) = resolve_catalogs(&tree.catalogs) {
        diagnostics.push(Diagnostic {
            subject: "catalogs".to_string(),
            child_index: None,
            error,
        });
    }

    for family in &tree.families {
        if let Err(found) = validate_family(family) {
            diagnostics.extend(found);
        }
    }

    tracing::info!(
        families = tree.families.len(),
        diagnostics = diagnostics.len(),
        "validated definition tree"
    );
    diagnostics
}

pub fn validate_dir(resources_dir: &Path) -> Result<Vec<Diagnostic>, LoaderError> {
    let tree = load_dir(resources_dir)?;
    Ok(validate_tree(&tree))
}
