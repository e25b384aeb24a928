//! The Dependency Ledger: per-workspace accounting of declared vs.
//! referenced dependencies.
//!
//! Ignore patterns are glob patterns tested against a candidate package
//! name string, the same idiom `package_manager::Globs` uses.

use std::collections::{BTreeMap, HashMap, HashSet};

use wax::Pattern;

use crate::workspace::{WorkspaceName, WorkspaceRegistry};

#[derive(Debug, Default)]
struct WorkspaceDeps {
    dependencies: HashSet<String>,
    dev_dependencies: HashSet<String>,
    peer_dependencies: HashSet<String>,
    optional_dependencies: HashSet<String>,
    installed_binaries: BTreeMap<String, String>,
    referenced: HashSet<String>,
}

pub struct DependencyLedger<'a> {
    registry: &'a WorkspaceRegistry,
    strict: bool,
    ignore_patterns: Vec<wax::Glob<'a>>,
    by_workspace: HashMap<WorkspaceName, WorkspaceDeps>,
}

impl<'a> DependencyLedger<'a> {
    pub fn new(
        registry: &'a WorkspaceRegistry,
        strict: bool,
        ignore_patterns: &'a [String],
    ) -> Self {
        let ignore_patterns = ignore_patterns
            .iter()
            .filter_map(|pattern| wax::Glob::new(pattern).ok())
            .collect();

        Self {
            registry,
            strict,
            ignore_patterns,
            by_workspace: HashMap::new(),
        }
    }

    pub fn add_workspace(&mut self, ws: &crate::workspace::Workspace) {
        let mut deps = WorkspaceDeps::default();
        deps.dependencies
            .extend(ws.manifest.dependencies.keys().cloned());
        deps.dev_dependencies
            .extend(ws.manifest.dev_dependencies.keys().cloned());
        deps.peer_dependencies
            .extend(ws.manifest.peer_dependencies.keys().cloned());
        deps.optional_dependencies
            .extend(ws.manifest.optional_dependencies.keys().cloned());
        self.by_workspace.insert(ws.name.clone(), deps);
    }

    pub fn add_peer_dependencies(&mut self, ws: &WorkspaceName, peers: impl IntoIterator<Item = String>) {
        if let Some(deps) = self.by_workspace.get_mut(ws) {
            deps.peer_dependencies.extend(peers);
        }
    }

    pub fn set_installed_binaries(&mut self, ws: &WorkspaceName, binaries: BTreeMap<String, String>) {
        if let Some(deps) = self.by_workspace.get_mut(ws) {
            deps.installed_binaries = binaries;
        }
    }

    /// Returns true when `package_name` is satisfied for `ws` -- declared
    /// directly, declared by a non-strict ancestor, a peer dependency
    /// (non-strict only), the workspace's own name, or matched by an ignore
    /// pattern. Side effect: records the reference so `settle()` can later
    /// compute the declared-minus-referenced set.
    pub fn maybe_add_referenced(&mut self, ws: &WorkspaceName, package_name: &str) -> bool {
        let self_name = self
            .registry
            .enabled_workspaces()
            .find(|candidate| &candidate.name == ws)
            .and_then(|candidate| candidate.package_name());

        let declared_locally = self
            .by_workspace
            .get(ws)
            .is_some_and(|deps| deps.dependencies.contains(package_name) || deps.dev_dependencies.contains(package_name) || deps.optional_dependencies.contains(package_name));

        let declared_by_ancestor = !self.strict
            && self
                .registry
                .ancestors(ws)
                .iter()
                .filter_map(|ancestor| self.by_workspace.get(ancestor))
                .any(|deps| deps.dependencies.contains(package_name) || deps.dev_dependencies.contains(package_name));

        let satisfies_peer = !self.strict
            && self
                .by_workspace
                .get(ws)
                .is_some_and(|deps| deps.peer_dependencies.contains(package_name));

        let is_own_name = self_name == Some(package_name);

        let matches_ignore = self
            .ignore_patterns
            .iter()
            .any(|glob| glob.is_match(package_name));

        let satisfied =
            declared_locally || declared_by_ancestor || satisfies_peer || is_own_name || matches_ignore;

        if satisfied {
            if let Some(deps) = self.by_workspace.get_mut(ws) {
                deps.referenced.insert(package_name.to_string());
            }
        }

        satisfied
    }

    /// Declared-minus-referenced per workspace, split into production and
    /// dev dependency buckets.
    pub fn settle(&self) -> BTreeMap<WorkspaceName, (Vec<String>, Vec<String>)> {
        self.by_workspace
            .iter()
            .map(|(name, deps)| {
                let mut unused = deps
                    .dependencies
                    .difference(&deps.referenced)
                    .cloned()
                    .collect::<Vec<_>>();
                unused.sort();
                let mut unused_dev = deps
                    .dev_dependencies
                    .difference(&deps.referenced)
                    .cloned()
                    .collect::<Vec<_>>();
                unused_dev.sort();
                (name.clone(), (unused, unused_dev))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use culler_paths::AbsoluteSystemPathBuf;

    use super::*;
    use crate::workspace::WorkspaceRegistryBuilder;

    fn registry_with_one_workspace(manifest_json: &str) -> (WorkspaceRegistry, WorkspaceName) {
        let manifest = serde_json::from_str(manifest_json).unwrap();
        let mut builder = WorkspaceRegistryBuilder::new();
        builder.add_workspace(
            "root",
            AbsoluteSystemPathBuf::new("/repo").unwrap(),
            manifest,
        );
        (builder.build().unwrap(), WorkspaceName("root".to_string()))
    }

    #[test]
    fn declared_dependency_is_referenced() {
        let (registry, name) =
            registry_with_one_workspace(r#"{ "dependencies": { "lodash": "^4.0.0" } }"#);
        let ws = registry.enabled_workspaces().next().unwrap();
        let mut ledger = DependencyLedger::new(&registry, false, &[]);
        ledger.add_workspace(ws);

        assert!(ledger.maybe_add_referenced(&name, "lodash"));
        assert!(!ledger.maybe_add_referenced(&name, "unknown-pkg"));
    }

    #[test]
    fn strict_mode_rejects_peer_dependencies() {
        let (registry, name) =
            registry_with_one_workspace(r#"{ "peerDependencies": { "react": "^18" } }"#);
        let ws = registry.enabled_workspaces().next().unwrap();

        let mut lenient = DependencyLedger::new(&registry, false, &[]);
        lenient.add_workspace(ws);
        assert!(lenient.maybe_add_referenced(&name, "react"));

        let mut strict = DependencyLedger::new(&registry, true, &[]);
        strict.add_workspace(ws);
        assert!(!strict.maybe_add_referenced(&name, "react"));
    }

    #[test]
    fn ignore_pattern_satisfies_unknown_package() {
        let (registry, name) = registry_with_one_workspace("{}");
        let ws = registry.enabled_workspaces().next().unwrap();
        let patterns = vec!["@types/*".to_string()];
        let mut ledger = DependencyLedger::new(&registry, false, &patterns);
        ledger.add_workspace(ws);

        assert!(ledger.maybe_add_referenced(&name, "@types/node"));
    }

    #[test]
    fn settle_reports_declared_minus_referenced() {
        let (registry, name) = registry_with_one_workspace(
            r#"{ "dependencies": { "lodash": "^4.0.0", "axios": "^1.0.0" } }"#,
        );
        let ws = registry.enabled_workspaces().next().unwrap();
        let mut ledger = DependencyLedger::new(&registry, false, &[]);
        ledger.add_workspace(ws);
        ledger.maybe_add_referenced(&name, "lodash");

        let settled = ledger.settle();
        let (unused, unused_dev) = &settled[&name];
        assert_eq!(unused, &vec!["axios".to_string()]);
        assert!(unused_dev.is_empty());
    }
}
