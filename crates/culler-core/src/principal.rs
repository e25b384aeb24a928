//! Principal: a per-compiler-context analyzer.
//!
//! Owns the entry-path and project-path sets for one compiler-options group,
//! delegates per-file parsing to a `SourceParser`, and tracks which files are
//! reachable. File-level reachability bookkeeping, generalized from the
//! package-level shape `package_graph` uses.

use std::collections::{HashMap, HashSet};

use culler_paths::AbsoluteSystemPathBuf;

use crate::parser::{ParseError, ParsedFile, SourceParser};
use crate::principal_factory::CompilerOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Value,
    Type,
    Interface,
    Enum,
    Class,
    Other,
}

#[derive(Debug, Clone)]
pub struct ExportItem {
    pub name: String,
    pub kind: ExportKind,
    pub members: Vec<String>,
    pub is_public: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ImportItems {
    pub specifier: String,
    pub identifiers: HashSet<String>,
    pub is_re_exported: bool,
    pub is_star: bool,
    /// Files observed to re-export through this import.
    pub re_exported_by: HashSet<AbsoluteSystemPathBuf>,
}

#[derive(Debug, Default)]
pub struct FileRecord {
    pub exports: Vec<ExportItem>,
    pub duplicate_exports: Vec<(String, String)>,
    /// Keyed by resolved target file path.
    pub imports: HashMap<AbsoluteSystemPathBuf, ImportItems>,
    pub external_imports: HashSet<String>,
    pub unresolved_imports: HashSet<String>,
    pub skip_exports_analysis: bool,
}

/// One analysis context bound to a single compile-options group. Multiple
/// workspaces sharing compatible options share a Principal so their import
/// graphs connect naturally (see `PrincipalFactory`).
pub struct Principal<P: SourceParser> {
    parser: P,
    entry_paths: HashSet<AbsoluteSystemPathBuf>,
    project_paths: HashSet<AbsoluteSystemPathBuf>,
    files: HashMap<AbsoluteSystemPathBuf, FileRecord>,
}

impl<P: SourceParser> Principal<P> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            entry_paths: HashSet::new(),
            project_paths: HashSet::new(),
            files: HashMap::new(),
        }
    }

    /// Adding a path that was previously only a project path reclassifies it
    /// as reachable. The entry-path set never shrinks -- do not add a
    /// removal operation here (see the monotone fixed point design note).
    pub fn add_entry_path(&mut self, path: AbsoluteSystemPathBuf) -> bool {
        self.entry_paths.insert(path)
    }

    pub fn add_project_path(&mut self, path: AbsoluteSystemPathBuf) {
        self.project_paths.insert(path);
    }

    pub fn skip_exports_analysis_for(&mut self, path: &AbsoluteSystemPathBuf) {
        self.files.entry(path.clone()).or_default().skip_exports_analysis = true;
    }

    pub fn entry_paths(&self) -> impl Iterator<Item = &AbsoluteSystemPathBuf> {
        self.entry_paths.iter()
    }

    pub fn project_paths(&self) -> impl Iterator<Item = &AbsoluteSystemPathBuf> {
        self.project_paths.iter()
    }

    pub fn entry_path_count(&self) -> usize {
        self.entry_paths.len()
    }

    pub fn file(&self, path: &AbsoluteSystemPathBuf) -> Option<&FileRecord> {
        self.files.get(path)
    }

    pub fn files(&self) -> impl Iterator<Item = (&AbsoluteSystemPathBuf, &FileRecord)> {
        self.files.iter()
    }

    pub fn is_analyzed(&self, path: &AbsoluteSystemPathBuf) -> bool {
        self.files.contains_key(path)
    }

    pub(crate) fn file_mut(&mut self, path: &AbsoluteSystemPathBuf) -> &mut FileRecord {
        self.files.entry(path.clone()).or_default()
    }

    /// Delegates to the parser and records the resulting imports/exports
    /// against the file. Returns the raw parsed shape so the engine can fold
    /// new internal imports into the entry-path set.
    pub fn analyze_source_file(
        &mut self,
        path: &AbsoluteSystemPathBuf,
        options: &CompilerOptions,
    ) -> Result<ParsedFile, ParseError> {
        let parsed = self.parser.analyze(path, options)?;

        let record = self.files.entry(path.clone()).or_default();
        record.exports = parsed
            .exports
            .iter()
            .map(|export| ExportItem {
                name: export.name.clone(),
                kind: export.kind,
                members: export.members.clone(),
                is_public: export.is_public,
            })
            .collect();
        record.duplicate_exports = duplicate_names(&parsed.exports);
        record.external_imports = parsed.external_imports.clone();
        record.unresolved_imports = parsed.unresolved_imports.clone();

        Ok(parsed)
    }

    /// Registers that `from` imports `identifiers` out of `target`, folding
    /// repeated imports of the same target from different files into one
    /// record with a growing re-exporter set.
    pub fn record_internal_import(
        &mut self,
        from: &AbsoluteSystemPathBuf,
        target: AbsoluteSystemPathBuf,
        specifier: String,
        identifiers: HashSet<String>,
        is_re_exported: bool,
        is_star: bool,
    ) {
        let record = self.files.entry(from.clone()).or_default();
        let entry = record.imports.entry(target).or_insert_with(|| ImportItems {
            specifier: specifier.clone(),
            ..Default::default()
        });
        entry.identifiers.extend(identifiers);
        entry.is_re_exported |= is_re_exported;
        entry.is_star |= is_star;
        if is_re_exported || is_star {
            entry.re_exported_by.insert(from.clone());
        }
    }

    /// Transitive closure of files reachable from entry paths via
    /// already-analysed imports. Unanalysed targets still count as
    /// reachable -- they are what drives the next fixed-point round.
    pub fn get_used_resolved_files(&self) -> HashSet<AbsoluteSystemPathBuf> {
        let mut visited: HashSet<AbsoluteSystemPathBuf> = HashSet::new();
        let mut stack: Vec<AbsoluteSystemPathBuf> = self.entry_paths.iter().cloned().collect();

        while let Some(path) = stack.pop() {
            if !visited.insert(path.clone()) {
                continue;
            }
            if let Some(record) = self.files.get(&path) {
                for target in record.imports.keys() {
                    if !visited.contains(target) {
                        stack.push(target.clone());
                    }
                }
            }
        }

        visited
    }

    pub fn get_unreferenced_files(&self) -> Vec<AbsoluteSystemPathBuf> {
        let reachable = self.get_used_resolved_files();
        self.project_paths
            .iter()
            .filter(|p| !reachable.contains(*p))
            .cloned()
            .collect()
    }

    pub fn find_unused_members(&self, path: &AbsoluteSystemPathBuf, members: &[String]) -> Vec<String> {
        self.parser.find_unused_members(path, members)
    }

    pub fn is_public_export(&self, export: &ExportItem) -> bool {
        export.is_public
    }

    /// True when some importing file marks this export's file as
    /// re-exported or wildcard-imported, or the parser itself reports
    /// external consumers for it.
    pub fn has_external_references(
        &self,
        file: &AbsoluteSystemPathBuf,
        export: &ExportItem,
    ) -> bool {
        self.parser.has_external_references(file, &export.name)
    }
}

fn duplicate_names(
    exports: &[crate::parser::ParsedExport],
) -> Vec<(String, String)> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for export in exports {
        *seen.entry(export.name.as_str()).or_insert(0) += 1;
    }
    seen.into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| (name.to_string(), name.to_string()))
        .collect()
}
