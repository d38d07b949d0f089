use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::{load_tree_from_sources, DefinitionTree, LoaderError};

/// Reads and loads a whole resources directory.
pub fn load_resources_dir(resources_dir: &Path) -> Result<DefinitionTree, LoaderError> {
    let sources = read_sources_from_dir(resources_dir)?;
    tracing::debug!(
        path = %resources_dir.display(),
        files = sources.len(),
        "read resource sources"
    );
    load_tree_from_sources(&sources)
}

/// Collects every `.json` file under `resources_dir`, keyed by its `/`-separated
/// path relative to the directory.
pub fn read_sources_from_dir(
    resources_dir: &Path,
) -> Result<BTreeMap<String, String>, LoaderError> {
    if !resources_dir.exists() {
        return Err(LoaderError::NotFound {
            path: resources_dir.to_path_buf(),
        });
    }
    if !resources_dir.is_dir() {
        return Err(LoaderError::NotADirectory {
            path: resources_dir.to_path_buf(),
        });
    }

    let mut sources = BTreeMap::new();
    for entry in WalkDir::new(resources_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let relative = path
            .strip_prefix(resources_dir)
            .map_err(|error| LoaderError::Scan {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?
            .to_string_lossy()
            .replace('\\', "/");

        let content = fs::read_to_string(path).map_err(|source| LoaderError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        sources.insert(relative, content);
    }

    if sources.is_empty() {
        return Err(LoaderError::SourceEmpty {
            path: resources_dir.to_path_buf(),
        });
    }

    Ok(sources)
}
