//! The invocation contract: the single configuration object a run is driven
//! by. Composed by the CLI from config-file, environment, and flag sources
//! in that precedence order (see `culler-cli`'s config loader); the engine
//! itself only ever sees the resolved `Config`.

use culler_paths::AbsoluteSystemPathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub working_directory: AbsoluteSystemPathBuf,
    pub compiler_config_path: Option<AbsoluteSystemPathBuf>,
    pub respect_gitignore: bool,
    pub strict: bool,
    pub production: bool,
    pub show_progress: bool,
    /// Glob-like package-name patterns exempted from `unlisted` reporting.
    pub ignore_dependencies: Vec<String>,
    pub entry_patterns: Vec<String>,
    /// Entry globs substituted for `entry_patterns` when `production` is
    /// set, so production mode can drop test/dev-only roots (e.g.
    /// `*.test.ts`, `*.stories.ts`) from the entry set instead of losing
    /// glob-based entry discovery entirely.
    pub production_entry_patterns: Vec<String>,
    pub project_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl Config {
    pub fn new(working_directory: AbsoluteSystemPathBuf) -> Self {
        Self {
            working_directory,
            compiler_config_path: None,
            respect_gitignore: true,
            strict: false,
            production: false,
            show_progress: false,
            ignore_dependencies: Vec::new(),
            entry_patterns: vec!["**/index.ts".to_string()],
            production_entry_patterns: vec!["**/index.ts".to_string()],
            project_patterns: vec!["**/*.ts".to_string()],
            exclude_patterns: vec!["**/node_modules/**".to_string()],
        }
    }
}
