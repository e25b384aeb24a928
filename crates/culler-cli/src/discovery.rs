//! Builds the `WorkspaceRegistry` for a run.
//!
//! Full monorepo workspace-glob discovery (following a root manifest's
//! `"workspaces"` field) is left for a future plugin; today this reads the
//! root manifest and registers a single workspace rooted at the working
//! directory, which is the common case the fixed-point engine exercises.

use culler_core::{manifest::Manifest, workspace::WorkspaceRegistry, Error};
use culler_paths::AbsoluteSystemPathBuf;

pub fn build(root: &AbsoluteSystemPathBuf) -> Result<WorkspaceRegistry, Error> {
    let manifest_path = root.join_component("package.json");

    if !manifest_path.as_path().exists() {
        return Err(Error::ManifestMissing { path: manifest_path });
    }

    let text = std::fs::read_to_string(manifest_path.as_path())
        .map_err(|_| Error::ManifestMissing { path: manifest_path.clone() })?;
    let manifest = Manifest::parse(&manifest_path, &text)?;

    let name = manifest.package_name().unwrap_or("root").to_string();
    let mut builder = culler_core::workspace::WorkspaceRegistryBuilder::new();
    builder.add_workspace(name, root.clone(), manifest);
    builder.build()
}
