//! The Resolution & Reachability Engine: the fixed-point loop that drives
//! Principals, promotes cross-workspace imports, classifies specifiers, and
//! attributes references to the ledger.

use culler_paths::AbsoluteSystemPathBuf;
use tracing::{debug, instrument};

use crate::globs::GlobExpander;
use crate::issues::{Issue, IssueCollector, IssueKind};
use crate::ledger::DependencyLedger;
use crate::parser::SourceParser;
use crate::plugin::EntryPointPlugin;
use crate::principal::Principal;
use crate::principal_factory::{CompilerOptions, PrincipalFactory};
use crate::specifier::{self, SpecifierKind};
use crate::workspace::{Workspace, WorkspaceName, WorkspaceRegistry};

/// Files ultimately selected for the `files` report -- the unreferenced
/// project paths across every principal, once the fixed point has
/// converged. The reporter front end (out of scope per the component
/// design) groups these by workspace; the engine hands back a flat list.
pub type ReportSelectors = Vec<AbsoluteSystemPathBuf>;

#[allow(clippy::too_many_arguments)]
#[instrument(skip_all, fields(workspace = %workspace.name))]
fn seed_workspace<P: SourceParser>(
    workspace: &Workspace,
    production: bool,
    respect_gitignore: bool,
    glob_expander: &dyn GlobExpander,
    plugins: &[Box<dyn EntryPointPlugin>],
    entry_patterns: &[String],
    production_entry_patterns: &[String],
    project_patterns: &[String],
    ledger: &mut DependencyLedger,
    principal: &mut Principal<P>,
) -> Vec<(AbsoluteSystemPathBuf, String)> {
    let mut plugin_references = Vec::new();

    for path in glob_expander.expand(&workspace.directory, project_patterns, respect_gitignore) {
        principal.add_project_path(path);
    }

    let active_entry_patterns = if production { production_entry_patterns } else { entry_patterns };
    for path in glob_expander.expand(&workspace.directory, active_entry_patterns, respect_gitignore) {
        principal.add_entry_path(path);
    }

    for field in workspace.manifest.declared_entry_fields() {
        let resolved = resolve_internal(&workspace.directory, &field);
        principal.add_entry_path(resolved);
    }

    let declared_dependencies: Vec<String> = workspace
        .manifest
        .dependencies
        .keys()
        .cloned()
        .collect();

    for plugin in plugins {
        if !plugin.is_enabled(&declared_dependencies) {
            continue;
        }
        for config_glob in plugin.config_globs() {
            for config_path in
                glob_expander.expand(&workspace.directory, std::slice::from_ref(config_glob), respect_gitignore)
            {
                let contribution = plugin.contribute(&config_path, &workspace.directory);
                for path in contribution.entry_paths {
                    principal.add_entry_path(path);
                }
                plugin_references.extend(contribution.referenced_packages);
                ledger.add_peer_dependencies(&workspace.name, contribution.peer_dependencies);
                ledger.set_installed_binaries(
                    &workspace.name,
                    contribution.installed_binaries.into_iter().collect(),
                );
            }
        }
    }

    plugin_references
}

fn resolve_internal(base: &AbsoluteSystemPathBuf, specifier: &str) -> AbsoluteSystemPathBuf {
    AbsoluteSystemPathBuf::from_unknown(base, specifier)
}

/// Phase B: classifies one `(containing_file, specifier)` pair and folds the
/// result into the principal / ledger / issue collector as appropriate.
/// Returns the resolved internal path when one was added, so the fixed
/// point can detect growth.
#[allow(clippy::too_many_arguments)]
fn classify_and_resolve<P: SourceParser>(
    registry: &WorkspaceRegistry,
    ledger: &mut DependencyLedger,
    principal: &mut Principal<P>,
    containing_workspace: &WorkspaceName,
    containing_file: &AbsoluteSystemPathBuf,
    specifier: &str,
    issues: &mut IssueCollector,
) -> Option<AbsoluteSystemPathBuf> {
    match specifier::classify(specifier) {
        SpecifierKind::InternalRelative => {
            let base = containing_file
                .as_path()
                .parent()
                .map(|p| AbsoluteSystemPathBuf::new(p.as_str()).expect("parent of absolute path is absolute"))
                .unwrap_or_else(|| containing_file.clone());
            let resolved = resolve_internal(&base, specifier);
            principal.add_entry_path(resolved.clone());
            Some(resolved)
        }
        SpecifierKind::NodeModulesAbsolute => {
            let Some(suffix) = specifier::after_last_node_modules(specifier) else {
                issues.push(unresolved_issue(containing_file, specifier));
                return None;
            };
            let Some(package_name) = specifier::package_name(suffix) else {
                issues.push(unresolved_issue(containing_file, specifier));
                return None;
            };
            if !ledger.maybe_add_referenced(containing_workspace, package_name) {
                issues.push(unlisted_issue(containing_file, package_name));
            }
            None
        }
        SpecifierKind::BarePackage => {
            let Some(package_name) = specifier::package_name(specifier) else {
                issues.push(unresolved_issue(containing_file, specifier));
                return None;
            };

            let referenced = ledger.maybe_add_referenced(containing_workspace, package_name);
            if !referenced {
                issues.push(unlisted_issue(containing_file, package_name));
            }

            let Some(target_workspace) = registry.lookup_by_package_name(package_name) else {
                return None;
            };

            let subpath = specifier
                .strip_prefix(package_name)
                .unwrap_or("")
                .trim_start_matches('/');
            if subpath.is_empty() {
                return None;
            }

            let resolved = match target_workspace.manifest.resolve_export_subpath(subpath) {
                Some(mapped) => resolve_internal(&target_workspace.directory, &mapped),
                None => resolve_internal(&target_workspace.directory, subpath),
            };
            // Self-reference patch: importing your own workspace by package
            // name always resolves to an internal entry path on `principal`
            // (the caller is responsible for adding it to the *target*
            // workspace's principal when that differs from `principal`).
            if &target_workspace.name == containing_workspace {
                principal.add_entry_path(resolved.clone());
            }
            Some(resolved)
        }
        SpecifierKind::Unresolvable => {
            issues.push(unresolved_issue(containing_file, specifier));
            None
        }
    }
}

fn unresolved_issue(file: &AbsoluteSystemPathBuf, specifier: &str) -> Issue {
    Issue {
        kind: IssueKind::Unresolved,
        file_path: file.clone(),
        symbol: specifier.to_string(),
        symbols: None,
        symbol_type: None,
        parent_symbol: None,
    }
}

fn unlisted_issue(file: &AbsoluteSystemPathBuf, package_name: &str) -> Issue {
    Issue {
        kind: IssueKind::Unlisted,
        file_path: file.clone(),
        symbol: package_name.to_string(),
        symbols: None,
        symbol_type: None,
        parent_symbol: None,
    }
}

/// Phase C for a single principal: repeatedly analyzes newly-reachable
/// files until the entry-path set stops growing. Returns the set of
/// resolved cross-workspace entry paths discovered along the way, so the
/// caller can inject them into the target workspace's own principal.
#[instrument(skip_all)]
fn fixed_point<P: SourceParser>(
    principal: &mut Principal<P>,
    registry: &WorkspaceRegistry,
    ledger: &mut DependencyLedger,
    containing_workspace: &WorkspaceName,
    compiler_options: &CompilerOptions,
    issues: &mut IssueCollector,
) -> Vec<AbsoluteSystemPathBuf> {
    let mut cross_workspace_targets = Vec::new();

    loop {
        let before = principal.entry_path_count();
        let to_analyze: Vec<AbsoluteSystemPathBuf> = principal
            .get_used_resolved_files()
            .into_iter()
            .filter(|p| !principal.is_analyzed(p))
            .collect();

        if to_analyze.is_empty() && principal.entry_path_count() == before {
            break;
        }

        for file in &to_analyze {
            let parsed = match principal.analyze_source_file(file, compiler_options) {
                Ok(parsed) => parsed,
                Err(err) => {
                    debug!(?err, file = %file, "skipping file that failed to parse");
                    continue;
                }
            };

            for import in &parsed.internal_imports {
                if let Some(resolved) = classify_and_resolve(
                    registry,
                    ledger,
                    principal,
                    containing_workspace,
                    file,
                    &import.specifier,
                    issues,
                ) {
                    principal.record_internal_import(
                        file,
                        resolved.clone(),
                        import.specifier.clone(),
                        import.identifiers.clone(),
                        import.is_re_exported,
                        import.is_star,
                    );

                    if registry
                        .lookup_by_file_path(&resolved)
                        .map(|ws| &ws.name != containing_workspace)
                        .unwrap_or(false)
                    {
                        cross_workspace_targets.push(resolved);
                    }
                }
            }

            for specifier in &parsed.external_imports {
                classify_and_resolve(
                    registry,
                    ledger,
                    principal,
                    containing_workspace,
                    file,
                    specifier,
                    issues,
                );
            }

            for specifier in &parsed.unresolved_imports {
                issues.push(unresolved_issue(file, specifier));
            }
        }

        if principal.entry_path_count() == before {
            break;
        }
    }

    cross_workspace_targets
}

pub struct EngineRun<P: SourceParser + Clone> {
    pub factory: PrincipalFactory<P>,
    pub ledger_settlement: std::collections::BTreeMap<WorkspaceName, (Vec<String>, Vec<String>)>,
    pub issues: IssueCollector,
    pub report_selectors: ReportSelectors,
}

/// Drives the whole pipeline: Phase A seeding for every enabled workspace,
/// then the Phase C fixed point per principal (re-run whenever a
/// cross-workspace import promotes new roots into another principal),
/// then the dependency ledger settlement. Symbol reconciliation is run
/// separately via `crate::reconciler::reconcile` once this returns, so
/// callers can choose whether to enable member-level findings.
pub fn run<P: SourceParser + Clone>(
    config: &crate::config::Config,
    registry: &WorkspaceRegistry,
    glob_expander: &dyn GlobExpander,
    plugins: &[Box<dyn EntryPointPlugin>],
    parser_template: P,
) -> EngineRun<P> {
    let mut factory = PrincipalFactory::new(parser_template);
    let mut ledger = DependencyLedger::new(registry, config.strict, &config.ignore_dependencies);
    let mut issues = IssueCollector::new();

    for workspace in registry.enabled_workspaces() {
        ledger.add_workspace(workspace);
    }

    // Phase A: seed every workspace's principal.
    let mut deferred_plugin_refs: Vec<(WorkspaceName, AbsoluteSystemPathBuf, String)> = Vec::new();
    for workspace in registry.enabled_workspaces() {
        let options = CompilerOptions::default();
        let principal = factory.get_principal(&options);
        let refs = seed_workspace(
            workspace,
            config.production,
            config.respect_gitignore,
            glob_expander,
            plugins,
            &config.entry_patterns,
            &config.production_entry_patterns,
            &config.project_patterns,
            &mut ledger,
            principal,
        );
        deferred_plugin_refs.extend(
            refs.into_iter()
                .map(|(file, specifier)| (workspace.name.clone(), file, specifier)),
        );
    }

    // Replay plugin-attributed references through the same classifier used
    // in Phase B so they participate in ledger accounting.
    for (workspace_name, file, specifier) in &deferred_plugin_refs {
        let options = CompilerOptions::default();
        let principal = factory.get_principal(&options);
        classify_and_resolve(registry, &mut ledger, principal, workspace_name, file, specifier, &mut issues);
    }

    // Phase C: fixed point per principal, re-run while cross-workspace
    // promotions keep injecting new roots anywhere.
    let mut changed = true;
    while changed {
        changed = false;
        let workspace_names: Vec<WorkspaceName> = registry
            .enabled_workspaces()
            .map(|ws| ws.name.clone())
            .collect();

        for workspace_name in &workspace_names {
            let options = CompilerOptions::default();
            let principal = factory.get_principal(&options);
            let before = principal.entry_path_count();
            let cross_targets = fixed_point(principal, registry, &mut ledger, workspace_name, &options, &mut issues);

            for target in cross_targets {
                if registry.lookup_by_file_path(&target).is_some() {
                    let target_options = CompilerOptions::default();
                    let target_principal = factory.get_principal(&target_options);
                    if target_principal.add_entry_path(target) {
                        changed = true;
                    }
                }
            }

            let principal = factory.get_principal(&CompilerOptions::default());
            if principal.entry_path_count() != before {
                changed = true;
            }
        }
    }

    let mut processed = 0;
    let mut total = 0;
    let mut report_selectors = Vec::new();
    let analyzed_counts: Vec<usize> = factory
        .principals()
        .map(|p| p.files().count())
        .collect();
    processed += analyzed_counts.iter().sum::<usize>();

    for principal in factory.principals() {
        let unreferenced = principal.get_unreferenced_files();
        for file in &unreferenced {
            issues.push(Issue {
                kind: IssueKind::Files,
                file_path: file.clone(),
                symbol: file.as_path().file_name().unwrap_or_default().to_string(),
                symbols: None,
                symbol_type: None,
                parent_symbol: None,
            });
        }
        total += unreferenced.len();
        report_selectors.extend(unreferenced);
    }
    total += processed;

    issues.record_processed(processed);
    issues.record_total(total);

    let ledger_settlement = ledger.settle();
    for (workspace_name, (unused, unused_dev)) in &ledger_settlement {
        for package in unused {
            issues.push(Issue {
                kind: IssueKind::Dependencies,
                file_path: registry
                    .enabled_workspaces()
                    .find(|ws| &ws.name == workspace_name)
                    .map(|ws| ws.directory.clone())
                    .unwrap_or_default(),
                symbol: package.clone(),
                symbols: None,
                symbol_type: None,
                parent_symbol: None,
            });
        }
        for package in unused_dev {
            issues.push(Issue {
                kind: IssueKind::DevDependencies,
                file_path: registry
                    .enabled_workspaces()
                    .find(|ws| &ws.name == workspace_name)
                    .map(|ws| ws.directory.clone())
                    .unwrap_or_default(),
                symbol: package.clone(),
                symbols: None,
                symbol_type: None,
                parent_symbol: None,
            });
        }
    }

    EngineRun {
        factory,
        ledger_settlement,
        issues,
        report_selectors,
    }
}

