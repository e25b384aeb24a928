//! Whole-project dead-code analysis over one or more workspaces sharing a
//! package manifest.
//!
//! The hard engineering lives in [`engine`]: the iterative fixed-point that,
//! given a set of entry files, walks the import graph across multiple
//! workspaces, classifies every module specifier it encounters, promotes
//! newly discovered cross-workspace targets to entry points, and re-runs
//! until the reachable set stabilises. Everything else -- the workspace
//! registry, the dependency ledger, the issue collector, the reconciler --
//! supports that core.
//!
//! The syntactic source parser, configuration discovery, plugin adapters,
//! the reporter, and the glob matcher are external collaborators: this
//! crate defines their Rust interface (see [`parser`], [`plugin`],
//! [`globs`]) and ships deterministic default implementations so the engine
//! is runnable and testable standalone.

pub mod config;
pub mod engine;
mod error;
pub mod globs;
pub mod issues;
pub mod ledger;
pub mod manifest;
pub mod parser;
pub mod plugin;
pub mod principal;
pub mod principal_factory;
pub mod reconciler;
pub mod specifier;
pub mod workspace;

pub use error::Error;

use parser::SourceParser;
use plugin::EntryPointPlugin;

/// The crate's public entry point: drives seeding, the fixed point, and
/// reconciliation, and returns `(report_selectors, issues_by_type,
/// counters)` as described in the invocation contract.
pub fn analyze<P: SourceParser + Clone>(
    config: &config::Config,
    registry: &workspace::WorkspaceRegistry,
    glob_expander: &dyn globs::GlobExpander,
    plugins: &[Box<dyn EntryPointPlugin>],
    parser_template: P,
    collect_member_findings: bool,
) -> (
    engine::ReportSelectors,
    std::collections::BTreeMap<issues::IssueKind, Vec<issues::Issue>>,
    issues::Counters,
) {
    let mut run = engine::run(config, registry, glob_expander, plugins, parser_template);

    for principal in run.factory.principals() {
        reconciler::reconcile(principal, collect_member_findings, &mut run.issues);
    }

    let counters = run.issues.counters();
    let issues_by_type = run.issues.by_type().clone();

    (run.report_selectors, issues_by_type, counters)
}

#[cfg(test)]
mod tests {
    use culler_paths::AbsoluteSystemPathBuf;
    use tempfile::TempDir;

    use crate::{
        config::Config,
        globs::GlobExpander,
        manifest::Manifest,
        parser::StubParser,
        workspace::WorkspaceRegistryBuilder,
    };

    use super::*;

    /// A glob expander that returns fixed, pre-computed file lists instead
    /// of walking the filesystem -- keeps the end-to-end scenario tests
    /// deterministic and decoupled from `culler-globwalk`.
    struct FixedExpander {
        entries: Vec<(String, String, Vec<AbsoluteSystemPathBuf>)>,
    }

    impl GlobExpander for FixedExpander {
        fn expand(
            &self,
            root: &AbsoluteSystemPathBuf,
            patterns: &[String],
            _respect_gitignore: bool,
        ) -> Vec<AbsoluteSystemPathBuf> {
            let Some(pattern) = patterns.first() else {
                return Vec::new();
            };
            self.entries
                .iter()
                .find(|(entry_root, entry_pattern, _)| {
                    entry_root == root.as_str() && entry_pattern == pattern
                })
                .map(|(_, _, files)| files.clone())
                .unwrap_or_default()
        }
    }

    fn write_file(dir: &std::path::Path, name: &str, contents: &str) -> AbsoluteSystemPathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        AbsoluteSystemPathBuf::new(path.to_str().unwrap()).unwrap()
    }

    #[test]
    fn self_reference_chain_reports_no_issues() {
        let dir = TempDir::new().unwrap();
        let root = AbsoluteSystemPathBuf::new(dir.path().to_str().unwrap()).unwrap();

        let a = write_file(dir.path(), "a.ts", "// import: self/b.ts used\n// export: start:value:public\n");
        let b = write_file(dir.path(), "b.ts", "// import: ./c.ts used\n// export: used:value\n");
        let c = write_file(dir.path(), "c.ts", "// import: ./d.ts used\n// export: used:value\n");
        let d = write_file(dir.path(), "d.ts", "// export: used:value\n");

        let manifest: Manifest = serde_json::from_str(r#"{ "name": "self" }"#).unwrap();
        let mut builder = WorkspaceRegistryBuilder::new();
        builder.add_workspace("root", root.clone(), manifest);
        let registry = builder.build().unwrap();

        let project_files = vec![a.clone(), b.clone(), c.clone(), d.clone()];
        let expander = FixedExpander {
            entries: vec![
                (
                    root.as_str().to_string(),
                    "**/*.ts".to_string(),
                    project_files.clone(),
                ),
                (root.as_str().to_string(), "**/index.ts".to_string(), vec![a.clone()]),
            ],
        };

        let mut config = Config::new(root.clone());
        config.entry_patterns = vec!["**/index.ts".to_string()];
        config.project_patterns = vec!["**/*.ts".to_string()];

        let (_, issues_by_type, counters) =
            analyze(&config, &registry, &expander, &[], StubParser::default(), false);

        assert_eq!(counters.processed, 4);
        assert_eq!(counters.total, 4);
        assert!(issues_by_type.get(&issues::IssueKind::Unlisted).is_none());
        assert!(issues_by_type.get(&issues::IssueKind::Unresolved).is_none());
        assert!(issues_by_type.get(&issues::IssueKind::Exports).is_none());
    }

    #[test]
    fn self_reference_chain_in_production_mode_reports_no_issues() {
        let dir = TempDir::new().unwrap();
        let root = AbsoluteSystemPathBuf::new(dir.path().to_str().unwrap()).unwrap();

        let a = write_file(dir.path(), "a.ts", "// import: self/b.ts used\n// export: start:value:public\n");
        let b = write_file(dir.path(), "b.ts", "// import: ./c.ts used\n// export: used:value\n");
        let c = write_file(dir.path(), "c.ts", "// import: ./d.ts used\n// export: used:value\n");
        let d = write_file(dir.path(), "d.ts", "// export: used:value\n");

        let manifest: Manifest =
            serde_json::from_str(r#"{ "name": "self", "main": "./a.ts" }"#).unwrap();
        let mut builder = WorkspaceRegistryBuilder::new();
        builder.add_workspace("root", root.clone(), manifest);
        let registry = builder.build().unwrap();

        let project_files = vec![a.clone(), b.clone(), c.clone(), d.clone()];
        let expander = FixedExpander {
            entries: vec![(
                root.as_str().to_string(),
                "**/*.ts".to_string(),
                project_files.clone(),
            )],
        };

        let mut config = Config::new(root.clone());
        config.production = true;
        config.entry_patterns = vec!["**/index.ts".to_string()];
        config.project_patterns = vec!["**/*.ts".to_string()];

        let (_, issues_by_type, counters) =
            analyze(&config, &registry, &expander, &[], StubParser::default(), false);

        assert_eq!(counters.processed, 4);
        assert_eq!(counters.total, 4);
        assert!(issues_by_type.get(&issues::IssueKind::Unlisted).is_none());
        assert!(issues_by_type.get(&issues::IssueKind::Unresolved).is_none());
        assert!(issues_by_type.get(&issues::IssueKind::Exports).is_none());
    }

    #[test]
    fn self_reference_chain_in_strict_production_mode_reports_no_issues() {
        let dir = TempDir::new().unwrap();
        let root = AbsoluteSystemPathBuf::new(dir.path().to_str().unwrap()).unwrap();

        let a = write_file(dir.path(), "a.ts", "// import: self/b.ts used\n// export: start:value:public\n");
        let b = write_file(dir.path(), "b.ts", "// import: ./c.ts used\n// export: used:value\n");
        let c = write_file(dir.path(), "c.ts", "// import: ./d.ts used\n// export: used:value\n");
        let d = write_file(dir.path(), "d.ts", "// export: used:value\n");

        let manifest: Manifest =
            serde_json::from_str(r#"{ "name": "self", "main": "./a.ts" }"#).unwrap();
        let mut builder = WorkspaceRegistryBuilder::new();
        builder.add_workspace("root", root.clone(), manifest);
        let registry = builder.build().unwrap();

        let project_files = vec![a.clone(), b.clone(), c.clone(), d.clone()];
        let expander = FixedExpander {
            entries: vec![(
                root.as_str().to_string(),
                "**/*.ts".to_string(),
                project_files.clone(),
            )],
        };

        let mut config = Config::new(root.clone());
        config.production = true;
        config.strict = true;
        config.entry_patterns = vec!["**/index.ts".to_string()];
        config.project_patterns = vec!["**/*.ts".to_string()];

        let (_, issues_by_type, counters) =
            analyze(&config, &registry, &expander, &[], StubParser::default(), false);

        assert_eq!(counters.processed, 4);
        assert_eq!(counters.total, 4);
        assert!(issues_by_type.is_empty());
    }

    #[test]
    fn duplicate_export_is_flagged() {
        let dir = TempDir::new().unwrap();
        let root = AbsoluteSystemPathBuf::new(dir.path().to_str().unwrap()).unwrap();

        let index = write_file(
            dir.path(),
            "index.ts",
            "// export: foo:value:public\n// export: foo:value:public\n",
        );

        let manifest: Manifest = serde_json::from_str(r#"{ "name": "proj" }"#).unwrap();
        let mut builder = WorkspaceRegistryBuilder::new();
        builder.add_workspace("root", root.clone(), manifest);
        let registry = builder.build().unwrap();

        let expander = FixedExpander {
            entries: vec![
                (
                    root.as_str().to_string(),
                    "**/*.ts".to_string(),
                    vec![index.clone()],
                ),
                (root.as_str().to_string(), "**/index.ts".to_string(), vec![index.clone()]),
            ],
        };

        let mut config = Config::new(root.clone());
        config.entry_patterns = vec!["**/index.ts".to_string()];
        config.project_patterns = vec!["**/*.ts".to_string()];

        let (_, issues_by_type, _) =
            analyze(&config, &registry, &expander, &[], StubParser::default(), false);

        let duplicates = &issues_by_type[&issues::IssueKind::Duplicates];
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].symbol, "foo|foo");
    }

    #[test]
    fn cross_workspace_subpath_reexport_is_reachable_and_unused_free() {
        let dir_a = TempDir::new().unwrap();
        let dir_b = TempDir::new().unwrap();
        let root_a = AbsoluteSystemPathBuf::new(dir_a.path().to_str().unwrap()).unwrap();
        let root_b = AbsoluteSystemPathBuf::new(dir_b.path().to_str().unwrap()).unwrap();

        let a_index = write_file(
            dir_a.path(),
            "index.ts",
            "// import: @b/pkg/deep.ts used\n// export: start:value:public\n",
        );
        let b_deep = write_file(
            dir_b.path(),
            "deep.ts",
            "// import: ./inner.ts!reexport used\n// export: used:value\n",
        );
        let b_inner = write_file(dir_b.path(), "inner.ts", "// export: bar:value\n");

        let manifest_a: Manifest =
            serde_json::from_str(r#"{ "name": "@a/pkg", "dependencies": { "@b/pkg": "*" } }"#)
                .unwrap();
        let manifest_b: Manifest = serde_json::from_str(r#"{ "name": "@b/pkg" }"#).unwrap();

        let mut builder = WorkspaceRegistryBuilder::new();
        builder.add_workspace("a", root_a.clone(), manifest_a);
        builder.add_workspace("b", root_b.clone(), manifest_b);
        let registry = builder.build().unwrap();

        let expander = FixedExpander {
            entries: vec![
                (
                    root_a.as_str().to_string(),
                    "**/*.ts".to_string(),
                    vec![a_index.clone()],
                ),
                (
                    root_a.as_str().to_string(),
                    "**/index.ts".to_string(),
                    vec![a_index.clone()],
                ),
                (
                    root_b.as_str().to_string(),
                    "**/*.ts".to_string(),
                    vec![b_deep.clone(), b_inner.clone()],
                ),
                (root_b.as_str().to_string(), "**/index.ts".to_string(), vec![]),
            ],
        };

        let mut config = Config::new(root_a.clone());
        config.entry_patterns = vec!["**/index.ts".to_string()];
        config.project_patterns = vec!["**/*.ts".to_string()];

        let (_, issues_by_type, counters) =
            analyze(&config, &registry, &expander, &[], StubParser::default(), false);

        assert_eq!(counters.processed, 3);
        assert!(issues_by_type.get(&issues::IssueKind::Exports).is_none());
        assert!(issues_by_type.get(&issues::IssueKind::Unlisted).is_none());
        assert!(issues_by_type.get(&issues::IssueKind::Files).is_none());
    }

    #[test]
    fn unused_file_is_flagged() {
        let dir = TempDir::new().unwrap();
        let root = AbsoluteSystemPathBuf::new(dir.path().to_str().unwrap()).unwrap();

        let index = write_file(dir.path(), "index.ts", "");
        let orphan = write_file(dir.path(), "orphan.ts", "");

        let manifest: Manifest = serde_json::from_str(r#"{ "name": "proj" }"#).unwrap();
        let mut builder = WorkspaceRegistryBuilder::new();
        builder.add_workspace("root", root.clone(), manifest);
        let registry = builder.build().unwrap();

        let expander = FixedExpander {
            entries: vec![
                (
                    root.as_str().to_string(),
                    "**/*.ts".to_string(),
                    vec![index.clone(), orphan.clone()],
                ),
                (root.as_str().to_string(), "**/index.ts".to_string(), vec![index.clone()]),
            ],
        };

        let mut config = Config::new(root.clone());
        config.entry_patterns = vec!["**/index.ts".to_string()];
        config.project_patterns = vec!["**/*.ts".to_string()];

        let (report_selectors, issues_by_type, counters) =
            analyze(&config, &registry, &expander, &[], StubParser::default(), false);

        assert_eq!(counters.processed, 1);
        assert_eq!(counters.total, 2);
        assert_eq!(issues_by_type[&issues::IssueKind::Files].len(), 1);
        assert_eq!(report_selectors, vec![orphan]);
    }
}
