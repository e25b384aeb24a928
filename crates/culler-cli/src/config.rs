//! Configuration discovery for the CLI invocation contract.
//!
//! Precedence, low to high: the discovered/explicit compiler-config file,
//! then environment variables, then CLI flags.

use std::path::{Path, PathBuf};

use culler_core::config::Config;
use culler_core::Error;
use culler_paths::AbsoluteSystemPathBuf;
use serde::Deserialize;

use crate::cli::Args;

/// The subset of `knip.json`/`knip.jsonc` fields this project reads.
/// Everything else in the file (plugin sections, per-workspace overrides)
/// is out of scope and ignored rather than rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileConfig {
    entry: Option<Vec<String>>,
    project: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    ignore_dependencies: Option<Vec<String>>,
}

/// Strips `//` and `/* */` comments so JSONC-flavoured config files parse
/// with plain `serde_json`.
fn strip_jsonc_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = None;
                for c in chars.by_ref() {
                    if prev == Some('*') && c == '/' {
                        break;
                    }
                    prev = Some(c);
                }
            }
            other => out.push(other),
        }
    }

    out
}

/// Finds the compiler-config file to use: the explicit path if given,
/// otherwise `<cwd>/knip.json` then `<cwd>/knip.jsonc`. Returns `None` when
/// none of the defaults exist -- an absent default file is not an error.
fn discover_path(cwd: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(explicit) = explicit {
        return Some(explicit.to_path_buf());
    }

    for candidate in ["knip.json", "knip.jsonc"] {
        let path = cwd.join(candidate);
        if path.exists() {
            return Some(path);
        }
    }

    None
}

/// Reads and parses the discovered compiler-config file, if any, then folds
/// CLI flags on top to produce the final `Config` the engine consumes.
pub fn load(args: &Args) -> Result<Config, Error> {
    let cwd = args
        .working_directory
        .clone()
        .unwrap_or_else(|| std::env::current_dir().expect("current directory is readable"));
    let cwd_str = cwd.to_str().expect("working directory is valid utf-8").to_string();
    let root = AbsoluteSystemPathBuf::new(cwd_str.clone())
        .map_err(|source| Error::InvalidWorkingDirectory { path: cwd_str, source })?;

    let discovered = discover_path(&cwd, args.compiler_config.as_deref());

    let mut file_config = FileConfig::default();
    let mut discovered_abs = None;
    if let Some(path) = &discovered {
        let abs_path = AbsoluteSystemPathBuf::from_unknown(
            &root,
            path.to_str().expect("compiler config path is valid utf-8").to_string(),
        );
        let text = std::fs::read_to_string(abs_path.as_path()).map_err(|source| Error::ConfigMissing {
            path: abs_path.clone(),
            source,
        })?;
        let stripped = strip_jsonc_comments(&text);
        file_config = serde_json::from_str(&stripped).map_err(|source| Error::ConfigParse {
            path: abs_path.clone(),
            source,
        })?;
        discovered_abs = Some(abs_path);
    }

    let mut config = Config::new(root);
    config.compiler_config_path = discovered_abs;

    if let Some(entry) = file_config.entry {
        config.entry_patterns = entry;
    }
    if let Some(project) = file_config.project {
        config.project_patterns = project;
    }
    if let Some(exclude) = file_config.exclude {
        config.exclude_patterns = exclude;
    }
    if let Some(ignore_dependencies) = file_config.ignore_dependencies {
        config.ignore_dependencies = ignore_dependencies;
    }

    config.respect_gitignore = args.gitignore;
    config.strict = args.strict;
    config.production = args.production;
    config.show_progress = args.progress;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_and_block_comments() {
        let text = "{\n  // a comment\n  \"a\": 1, /* inline */ \"b\": \"keep // this\"\n}";
        let stripped = strip_jsonc_comments(text);
        let value: serde_json::Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(value["a"], 1);
        assert_eq!(value["b"], "keep // this");
    }

    #[test]
    fn absent_default_config_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = discover_path(dir.path(), None);
        assert!(result.is_none());
    }

    #[test]
    fn explicit_path_is_used_verbatim_even_if_missing() {
        let explicit = PathBuf::from("/does/not/exist/knip.json");
        let result = discover_path(Path::new("/tmp"), Some(&explicit));
        assert_eq!(result, Some(explicit));
    }

    #[test]
    fn config_file_entry_project_exclude_and_ignore_dependencies_are_folded_in() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("knip.json"),
            r#"{
                "entry": ["src/entry.ts"],
                "project": ["src/**/*.ts"],
                "exclude": ["**/*.spec.ts"],
                "ignoreDependencies": ["@types/*"]
            }"#,
        )
        .unwrap();

        let args = crate::cli::Args {
            working_directory: Some(dir.path().to_path_buf()),
            compiler_config: None,
            gitignore: true,
            strict: false,
            production: false,
            progress: false,
            json: false,
            verbosity: 0,
        };

        let config = load(&args).unwrap();
        assert_eq!(config.entry_patterns, vec!["src/entry.ts".to_string()]);
        assert_eq!(config.project_patterns, vec!["src/**/*.ts".to_string()]);
        assert_eq!(config.exclude_patterns, vec!["**/*.spec.ts".to_string()]);
        assert_eq!(config.ignore_dependencies, vec!["@types/*".to_string()]);
    }
}
