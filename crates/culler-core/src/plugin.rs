//! The `EntryPointPlugin` collaborator boundary.
//!
//! Plugins contribute extra entry-point globs and referenced-dependency
//! pairs from framework-specific configuration files. They do not see the
//! import graph and must not mutate it directly -- they communicate only
//! through the two injection points described in the design notes:
//! `Principal::add_entry_path` and `DependencyLedger::maybe_add_referenced`.

use culler_paths::AbsoluteSystemPathBuf;

#[derive(Debug, Default)]
pub struct PluginContribution {
    pub entry_paths: Vec<AbsoluteSystemPathBuf>,
    /// `(containing_file, specifier)` pairs to be replayed through the same
    /// classifier used in Phase B so plugin-attributed references
    /// participate in ledger accounting.
    pub referenced_packages: Vec<(AbsoluteSystemPathBuf, String)>,
    pub peer_dependencies: Vec<String>,
    pub installed_binaries: Vec<(String, String)>,
}

pub trait EntryPointPlugin {
    fn is_enabled(&self, declared_dependencies: &[String]) -> bool;
    fn config_globs(&self) -> &[String];
    fn contribute(
        &self,
        config_path: &AbsoluteSystemPathBuf,
        workspace_directory: &AbsoluteSystemPathBuf,
    ) -> PluginContribution;
}

/// The default registered plugin: contributes nothing. A complete framework
/// plugin (e.g. for a test runner's config file) would implement
/// `EntryPointPlugin` the same way this one does, but consult the
/// framework's actual config format in `contribute`.
#[derive(Debug, Default)]
pub struct NoopPlugin;

impl EntryPointPlugin for NoopPlugin {
    fn is_enabled(&self, _declared_dependencies: &[String]) -> bool {
        false
    }

    fn config_globs(&self) -> &[String] {
        &[]
    }

    fn contribute(
        &self,
        _config_path: &AbsoluteSystemPathBuf,
        _workspace_directory: &AbsoluteSystemPathBuf,
    ) -> PluginContribution {
        PluginContribution::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_plugin_never_enables_and_contributes_nothing() {
        let plugin = NoopPlugin;
        assert!(!plugin.is_enabled(&["react".to_string()]));
        assert!(plugin.config_globs().is_empty());

        let config_path = AbsoluteSystemPathBuf::new("/repo/jest.config.js").unwrap();
        let workspace = AbsoluteSystemPathBuf::new("/repo").unwrap();
        let contribution = plugin.contribute(&config_path, &workspace);
        assert!(contribution.entry_paths.is_empty());
        assert!(contribution.referenced_packages.is_empty());
    }
}
