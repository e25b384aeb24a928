//! The Workspace Registry: the set of workspaces participating in a run,
//! their directories, manifests, and ancestor relationships.
//!
//! A builder accumulates discovered workspaces and produces an immutable
//! registry, validating invariants (unique package names) before handing
//! out a queryable value -- the same split `package_graph::{PackageGraph,
//! PackageGraphBuilder}` uses.

use std::collections::HashMap;

use culler_paths::AbsoluteSystemPathBuf;

use crate::{Error, manifest::Manifest};

/// A stable identifier for a workspace within a single run. Workspaces are
/// identified by directory, but carry a separate display name for logging.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkspaceName(pub String);

impl std::fmt::Display for WorkspaceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone)]
pub struct Workspace {
    pub name: WorkspaceName,
    pub directory: AbsoluteSystemPathBuf,
    pub manifest: Manifest,
    /// Ancestor workspace names, root first. Empty for the root workspace.
    pub ancestors: Vec<WorkspaceName>,
}

impl Workspace {
    pub fn package_name(&self) -> Option<&str> {
        self.manifest.package_name()
    }
}

pub struct WorkspaceRegistry {
    workspaces: Vec<Workspace>,
    by_name: HashMap<WorkspaceName, usize>,
    by_package_name: HashMap<String, usize>,
}

impl WorkspaceRegistry {
    pub fn lookup_by_package_name(&self, name: &str) -> Option<&Workspace> {
        self.by_package_name.get(name).map(|&i| &self.workspaces[i])
    }

    /// Returns the deepest workspace whose directory is a prefix of `path`.
    /// Ties are broken by longest prefix, which for directories on the same
    /// filesystem is unambiguous.
    pub fn lookup_by_file_path(&self, path: &AbsoluteSystemPathBuf) -> Option<&Workspace> {
        self.workspaces
            .iter()
            .filter(|ws| path.as_path().starts_with(ws.directory.as_path()))
            .max_by_key(|ws| ws.directory.as_path().as_str().len())
    }

    pub fn ancestors(&self, name: &WorkspaceName) -> &[WorkspaceName] {
        self.by_name
            .get(name)
            .map(|&i| self.workspaces[i].ancestors.as_slice())
            .unwrap_or_default()
    }

    pub fn enabled_workspaces(&self) -> impl Iterator<Item = &Workspace> {
        self.workspaces.iter()
    }

    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }
}

#[derive(Default)]
pub struct WorkspaceRegistryBuilder {
    workspaces: Vec<Workspace>,
}

impl WorkspaceRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_workspace(
        &mut self,
        name: impl Into<String>,
        directory: AbsoluteSystemPathBuf,
        manifest: Manifest,
    ) -> &mut Self {
        self.workspaces.push(Workspace {
            name: WorkspaceName(name.into()),
            directory,
            manifest,
            ancestors: Vec::new(),
        });
        self
    }

    /// Computes ancestor chains from directory nesting (root first), then
    /// validates package-name uniqueness, producing an immutable registry.
    pub fn build(mut self) -> Result<WorkspaceRegistry, Error> {
        self.workspaces
            .sort_by_key(|ws| ws.directory.as_path().as_str().len());

        for i in 0..self.workspaces.len() {
            let dir = self.workspaces[i].directory.clone();
            let mut ancestors: Vec<WorkspaceName> = self.workspaces[..i]
                .iter()
                .filter(|candidate| {
                    candidate.directory.as_path() != dir.as_path()
                        && dir.as_path().starts_with(candidate.directory.as_path())
                })
                .map(|candidate| candidate.name.clone())
                .collect();
            ancestors.sort_by_key(|name| name.0.len());
            self.workspaces[i].ancestors = ancestors;
        }

        let mut by_name = HashMap::new();
        let mut by_package_name: HashMap<String, usize> = HashMap::new();
        for (i, ws) in self.workspaces.iter().enumerate() {
            by_name.insert(ws.name.clone(), i);
            if let Some(package_name) = ws.package_name() {
                if let Some(&existing) = by_package_name.get(package_name) {
                    return Err(Error::DuplicatePackageName {
                        name: package_name.to_string(),
                        first: self.workspaces[existing].directory.clone(),
                        second: ws.directory.clone(),
                    });
                }
                by_package_name.insert(package_name.to_string(), i);
            }
        }

        Ok(WorkspaceRegistry {
            workspaces: self.workspaces,
            by_name,
            by_package_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use culler_paths::AbsoluteSystemPathBuf;

    use super::*;

    fn manifest(name: &str) -> Manifest {
        serde_json::from_str(&format!(r#"{{ "name": "{name}" }}"#)).unwrap()
    }

    #[test]
    fn computes_ancestors_from_directory_nesting() {
        let mut builder = WorkspaceRegistryBuilder::new();
        builder.add_workspace(
            "root",
            AbsoluteSystemPathBuf::new("/repo").unwrap(),
            manifest("root"),
        );
        builder.add_workspace(
            "packages/a",
            AbsoluteSystemPathBuf::new("/repo/packages/a").unwrap(),
            manifest("@repo/a"),
        );

        let registry = builder.build().unwrap();
        let a = registry.lookup_by_package_name("@repo/a").unwrap();
        assert_eq!(a.ancestors, vec![WorkspaceName("root".to_string())]);
    }

    #[test]
    fn rejects_duplicate_package_names() {
        let mut builder = WorkspaceRegistryBuilder::new();
        builder.add_workspace(
            "a",
            AbsoluteSystemPathBuf::new("/repo/a").unwrap(),
            manifest("dup"),
        );
        builder.add_workspace(
            "b",
            AbsoluteSystemPathBuf::new("/repo/b").unwrap(),
            manifest("dup"),
        );

        assert!(matches!(
            builder.build(),
            Err(Error::DuplicatePackageName { .. })
        ));
    }

    #[test]
    fn lookup_by_file_path_prefers_deepest_match() {
        let mut builder = WorkspaceRegistryBuilder::new();
        builder.add_workspace(
            "root",
            AbsoluteSystemPathBuf::new("/repo").unwrap(),
            manifest("root"),
        );
        builder.add_workspace(
            "packages/a",
            AbsoluteSystemPathBuf::new("/repo/packages/a").unwrap(),
            manifest("@repo/a"),
        );

        let registry = builder.build().unwrap();
        let file = AbsoluteSystemPathBuf::new("/repo/packages/a/src/index.ts").unwrap();
        let found = registry.lookup_by_file_path(&file).unwrap();
        assert_eq!(found.package_name(), Some("@repo/a"));
    }
}
