//! The Issue Collector: accumulates findings by type and file, tracks
//! counters.

use std::collections::BTreeMap;

use culler_paths::AbsoluteSystemPathBuf;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    Files,
    Duplicates,
    Exports,
    NsExports,
    Types,
    NsTypes,
    EnumMembers,
    ClassMembers,
    Unlisted,
    Unresolved,
    Dependencies,
    DevDependencies,
}

#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub file_path: AbsoluteSystemPathBuf,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_symbol: Option<String>,
}

#[derive(Debug, Default)]
pub struct IssueCollector {
    by_kind: BTreeMap<IssueKind, Vec<Issue>>,
    processed: usize,
    total: usize,
}

impl IssueCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        self.by_kind.entry(issue.kind).or_default().push(issue);
    }

    pub fn record_processed(&mut self, count: usize) {
        self.processed += count;
    }

    pub fn record_total(&mut self, count: usize) {
        self.total += count;
    }

    pub fn counters(&self) -> Counters {
        Counters {
            processed: self.processed,
            total: self.total,
        }
    }

    pub fn by_type(&self) -> &BTreeMap<IssueKind, Vec<Issue>> {
        &self.by_kind
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.values().all(|issues| issues.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Counters {
    pub processed: usize,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_issues_by_kind() {
        let mut collector = IssueCollector::new();
        collector.push(Issue {
            kind: IssueKind::Files,
            file_path: AbsoluteSystemPathBuf::new("/repo/orphan.ts").unwrap(),
            symbol: "orphan.ts".to_string(),
            symbols: None,
            symbol_type: None,
            parent_symbol: None,
        });

        assert_eq!(collector.by_type()[&IssueKind::Files].len(), 1);
        assert!(collector.by_type().get(&IssueKind::Unlisted).is_none());
    }
}
