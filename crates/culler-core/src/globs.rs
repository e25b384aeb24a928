//! The `GlobExpander` collaborator boundary.
//!
//! The engine itself only depends on the trait; `WalkdirGlobExpander` is
//! the default implementation wired in by the CLI, backed by
//! `culler-globwalk`'s glob-filtered directory walk and, when
//! `respect_gitignore` is set, `ignore`'s gitignore matcher.

use culler_paths::AbsoluteSystemPathBuf;
use ignore::gitignore::GitignoreBuilder;

pub trait GlobExpander {
    fn expand(
        &self,
        root: &AbsoluteSystemPathBuf,
        patterns: &[String],
        respect_gitignore: bool,
    ) -> Vec<AbsoluteSystemPathBuf>;
}

/// Walks `root` collecting files matching `patterns`, always excluding
/// `exclude_patterns` (fixed at construction, since they come from the
/// invocation-wide `Config` rather than varying per call).
#[derive(Debug, Default)]
pub struct WalkdirGlobExpander {
    exclude_patterns: Vec<String>,
}

impl WalkdirGlobExpander {
    pub fn new(exclude_patterns: Vec<String>) -> Self {
        Self { exclude_patterns }
    }
}

impl GlobExpander for WalkdirGlobExpander {
    fn expand(
        &self,
        root: &AbsoluteSystemPathBuf,
        patterns: &[String],
        respect_gitignore: bool,
    ) -> Vec<AbsoluteSystemPathBuf> {
        let include = patterns.to_vec();
        let exclude = self.exclude_patterns.clone();

        let entries: Vec<AbsoluteSystemPathBuf> =
            match culler_globwalk::globwalk(root, &include, &exclude, culler_globwalk::WalkType::Files) {
                Ok(entries) => entries.into_iter().filter_map(Result::ok).collect(),
                Err(err) => {
                    tracing::debug!(?err, "glob expansion failed");
                    return Vec::new();
                }
            };

        if !respect_gitignore {
            return entries;
        }

        let mut builder = GitignoreBuilder::new(root.as_path());
        if let Some(err) = builder.add(root.as_path().join(".gitignore")) {
            tracing::debug!(?err, "failed to read .gitignore");
        }
        let matcher = match builder.build() {
            Ok(matcher) => matcher,
            Err(err) => {
                tracing::debug!(?err, "failed to build gitignore matcher");
                return entries;
            }
        };

        entries
            .into_iter()
            .filter(|path| !matcher.matched(path.as_path(), false).is_ignore())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn expands_matching_files_under_root() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.ts"), "").unwrap();
        fs::write(dir.path().join("a.test.ts"), "").unwrap();

        let root = AbsoluteSystemPathBuf::new(dir.path().to_str().unwrap()).unwrap();
        let expander = WalkdirGlobExpander::default();
        let found = expander.expand(&root, &["**/*.ts".to_string()], false);

        assert_eq!(found.len(), 2);
    }

    #[test]
    fn gitignored_files_are_excluded_when_respected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "ignored.ts\n").unwrap();
        fs::write(dir.path().join("kept.ts"), "").unwrap();
        fs::write(dir.path().join("ignored.ts"), "").unwrap();

        let root = AbsoluteSystemPathBuf::new(dir.path().to_str().unwrap()).unwrap();
        let expander = WalkdirGlobExpander::default();

        let with_gitignore = expander.expand(&root, &["**/*.ts".to_string()], true);
        assert_eq!(with_gitignore.len(), 1);

        let without_gitignore = expander.expand(&root, &["**/*.ts".to_string()], false);
        assert_eq!(without_gitignore.len(), 2);
    }
}
