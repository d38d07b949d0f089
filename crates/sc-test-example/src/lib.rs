use std::path::{Path, PathBuf};

/// The workspace checkout, two levels above this crate's manifest.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

pub fn fixtures_root() -> PathBuf {
    workspace_root().join("fixtures").join("resources")
}

/// One resource tree under `fixtures/resources`, e.g. `basic` or `invalid`.
pub fn resources_dir(name: &str) -> PathBuf {
    fixtures_root().join(name)
}
