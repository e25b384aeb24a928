use culler_paths::AbsoluteSystemPathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Tier-1 fatal errors: anything that aborts the run before a report can be
/// produced. Tiers 2 (recoverable per file) and 3 (reported as issues) never
/// surface here -- see `IssueCollector` and the `tracing::debug!` call sites
/// in `engine`.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("workspace manifest not found at {path}")]
    #[diagnostic(code(culler::manifest_missing))]
    ManifestMissing { path: AbsoluteSystemPathBuf },

    #[error("failed to parse manifest at {path}")]
    #[diagnostic(code(culler::manifest_parse))]
    ManifestParse {
        path: AbsoluteSystemPathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate package name {name} declared by both {first} and {second}")]
    #[diagnostic(code(culler::duplicate_package_name))]
    DuplicatePackageName {
        name: String,
        first: AbsoluteSystemPathBuf,
        second: AbsoluteSystemPathBuf,
    },

    #[error("root configuration file {path} could not be read")]
    #[diagnostic(code(culler::config_missing))]
    ConfigMissing {
        path: AbsoluteSystemPathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {path}")]
    #[diagnostic(code(culler::config_parse))]
    ConfigParse {
        path: AbsoluteSystemPathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid working directory {path}")]
    #[diagnostic(code(culler::invalid_cwd))]
    InvalidWorkingDirectory {
        path: String,
        #[source]
        source: culler_paths::PathError,
    },
}
