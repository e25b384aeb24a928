//! Symbol Reconciler.
//!
//! After the fixed point converges, cross-references exports against
//! imports to emit unused-symbol issues. The re-export chase is bounded by
//! the finite set of files; a visited set guards cycles.

use std::collections::HashSet;

use culler_paths::AbsoluteSystemPathBuf;

use crate::issues::{Issue, IssueCollector, IssueKind};
use crate::parser::SourceParser;
use crate::principal::{ExportItem, ExportKind, Principal};

pub fn reconcile<P: SourceParser>(
    principal: &Principal<P>,
    collect_member_findings: bool,
    issues: &mut IssueCollector,
) {
    for (file, record) in principal.files() {
        if record.skip_exports_analysis {
            continue;
        }

        for export in &record.exports {
            if principal.is_public_export(export) {
                continue;
            }

            if collect_member_findings && matches!(export.kind, ExportKind::Enum | ExportKind::Class) {
                let unused = principal.find_unused_members(file, &export.members);
                for member in unused {
                    issues.push(Issue {
                        kind: match export.kind {
                            ExportKind::Enum => IssueKind::EnumMembers,
                            _ => IssueKind::ClassMembers,
                        },
                        file_path: file.clone(),
                        symbol: member,
                        symbols: None,
                        symbol_type: None,
                        parent_symbol: Some(export.name.clone()),
                    });
                }
            }

            if is_used_directly(principal, file, export) {
                continue;
            }

            if let Some(namespace_used) = chase_re_export_chain(principal, file, export) {
                if !namespace_used {
                    issues.push(namespace_issue(file, export));
                }
                continue;
            }

            if principal.has_external_references(file, export) {
                continue;
            }

            issues.push(direct_issue(file, export));
        }

        for (first, second) in &record.duplicate_exports {
            issues.push(Issue {
                kind: IssueKind::Duplicates,
                file_path: file.clone(),
                symbol: format!("{first}|{second}"),
                symbols: Some(vec![first.clone(), second.clone()]),
                symbol_type: None,
                parent_symbol: None,
            });
        }
    }
}

fn is_used_directly<P: SourceParser>(
    principal: &Principal<P>,
    file: &AbsoluteSystemPathBuf,
    export: &ExportItem,
) -> bool {
    principal.files().any(|(_, importer)| {
        importer
            .imports
            .get(file)
            .is_some_and(|import| import.identifiers.contains(&export.name))
    })
}

/// Returns `None` when no re-export path was even attempted (so the caller
/// should fall through to a direct unused-export issue). Returns `Some(true)`
/// when some hop in the chain lands on an entry file (namespace re-export
/// from a root counts as used), `Some(false)` otherwise.
fn chase_re_export_chain<P: SourceParser>(
    principal: &Principal<P>,
    file: &AbsoluteSystemPathBuf,
    _export: &ExportItem,
) -> Option<bool> {
    let re_exporters: Vec<AbsoluteSystemPathBuf> = principal
        .files()
        .filter_map(|(importer_path, importer)| {
            importer
                .imports
                .get(file)
                .filter(|import| import.is_re_exported || import.is_star)
                .map(|_| importer_path.clone())
        })
        .collect();

    if re_exporters.is_empty() {
        return None;
    }

    let mut visited: HashSet<AbsoluteSystemPathBuf> = HashSet::new();
    let mut stack = re_exporters;

    while let Some(current) = stack.pop() {
        if !visited.insert(current.clone()) {
            continue;
        }
        if principal.entry_paths().any(|entry| *entry == current) {
            return Some(true);
        }
        for (importer_path, importer) in principal.files() {
            if importer
                .imports
                .get(&current)
                .is_some_and(|import| import.is_re_exported || import.is_star)
                && !visited.contains(importer_path)
            {
                stack.push(importer_path.clone());
            }
        }
    }

    Some(false)
}

fn namespace_issue(file: &AbsoluteSystemPathBuf, export: &ExportItem) -> Issue {
    Issue {
        kind: if matches!(export.kind, ExportKind::Type | ExportKind::Interface | ExportKind::Enum) {
            IssueKind::NsTypes
        } else {
            IssueKind::NsExports
        },
        file_path: file.clone(),
        symbol: export.name.clone(),
        symbols: None,
        symbol_type: Some(format!("{:?}", export.kind)),
        parent_symbol: None,
    }
}

fn direct_issue(file: &AbsoluteSystemPathBuf, export: &ExportItem) -> Issue {
    Issue {
        kind: if matches!(export.kind, ExportKind::Type | ExportKind::Interface | ExportKind::Enum) {
            IssueKind::Types
        } else {
            IssueKind::Exports
        },
        file_path: file.clone(),
        symbol: export.name.clone(),
        symbols: None,
        symbol_type: Some(format!("{:?}", export.kind)),
        parent_symbol: None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet as StdHashSet;

    use crate::parser::StubParser;

    use super::*;

    #[test]
    fn unused_export_with_no_importers_is_reported() {
        let mut principal = Principal::new(StubParser::default());
        let file = AbsoluteSystemPathBuf::new("/repo/a.ts").unwrap();
        principal.add_entry_path(file.clone());

        principal.file_mut(&file).exports.push(ExportItem {
            name: "unused".to_string(),
            kind: ExportKind::Value,
            members: Vec::new(),
            is_public: false,
        });

        let mut issues = IssueCollector::new();
        reconcile(&principal, false, &mut issues);

        assert_eq!(issues.by_type()[&IssueKind::Exports].len(), 1);
    }

    #[test]
    fn used_export_is_not_reported() {
        let mut principal = Principal::new(StubParser::default());
        let target = AbsoluteSystemPathBuf::new("/repo/b.ts").unwrap();
        let importer = AbsoluteSystemPathBuf::new("/repo/a.ts").unwrap();

        principal.file_mut(&target).exports.push(ExportItem {
            name: "used".to_string(),
            kind: ExportKind::Value,
            members: Vec::new(),
            is_public: false,
        });

        let mut identifiers = StdHashSet::new();
        identifiers.insert("used".to_string());
        principal.record_internal_import(&importer, target.clone(), "./b".into(), identifiers, false, false);

        let mut issues = IssueCollector::new();
        reconcile(&principal, false, &mut issues);

        assert!(issues.by_type().get(&IssueKind::Exports).is_none());
    }
}
