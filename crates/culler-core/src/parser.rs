//! The `SourceParser` collaborator boundary.
//!
//! The real syntactic parser that extracts imports and exports from a
//! single JS/TS file is an external collaborator and stays out of this
//! crate. What ships here is the trait, plus a `StubParser` deterministic
//! default used by the test suite and as a degenerate fallback: it
//! recognises a minimal literal convention so fixtures can be plain text
//! files.
//!
//! Convention recognised by `StubParser`:
//!   `// import: <specifier> <idents...>`
//!   `// export: <name>:<kind>[:public]`
//! where `<kind>` is one of `value`, `type`, `interface`, `enum`, `class`.

use std::collections::HashSet;

use culler_paths::AbsoluteSystemPathBuf;
use thiserror::Error;

use crate::principal::ExportKind;
use crate::principal_factory::CompilerOptions;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {path}")]
    Io {
        path: AbsoluteSystemPathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ParsedExport {
    pub name: String,
    pub kind: ExportKind,
    pub members: Vec<String>,
    pub is_public: bool,
}

#[derive(Debug, Clone)]
pub struct ParsedImport {
    pub specifier: String,
    pub identifiers: HashSet<String>,
    pub is_re_exported: bool,
    pub is_star: bool,
}

/// The shape a parser hands back for one file: internal imports keyed by
/// the raw (unresolved) specifier, external/unresolved specifier sets, and
/// the file's own exports.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub internal_imports: Vec<ParsedImport>,
    pub external_imports: HashSet<String>,
    pub unresolved_imports: HashSet<String>,
    pub exports: Vec<ParsedExport>,
}

pub trait SourceParser {
    /// `options` carries the per-principal compiler configuration (path
    /// rewrites, active compiler plugins) a real parser needs to resolve
    /// path aliases and recognise compiler-plugin-specific syntax.
    fn analyze(&self, path: &AbsoluteSystemPathBuf, options: &CompilerOptions) -> Result<ParsedFile, ParseError>;

    /// Member-level usage query for enum/class exports when member-level
    /// reporting is enabled. The default stub reports every member unused.
    fn find_unused_members(&self, _path: &AbsoluteSystemPathBuf, members: &[String]) -> Vec<String> {
        members.to_vec()
    }

    /// Whether the parser itself is aware of external consumers for a named
    /// export of `path` (e.g. a star export referenced from outside the
    /// project). The stub has no such knowledge.
    fn has_external_references(&self, _path: &AbsoluteSystemPathBuf, _export_name: &str) -> bool {
        false
    }
}

#[derive(Debug, Default, Clone)]
pub struct StubParser;

impl SourceParser for StubParser {
    fn analyze(&self, path: &AbsoluteSystemPathBuf, _options: &CompilerOptions) -> Result<ParsedFile, ParseError> {
        let text = std::fs::read_to_string(path.as_path()).map_err(|source| ParseError::Io {
            path: path.clone(),
            source,
        })?;

        let mut parsed = ParsedFile::default();

        for line in text.lines() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("// import:") {
                let mut tokens = rest.split_whitespace();
                let Some(specifier) = tokens.next() else {
                    continue;
                };
                let identifiers: HashSet<String> = tokens.map(str::to_string).collect();
                let is_star = identifiers.contains("*");
                let is_re_exported = specifier.ends_with("!reexport");
                let specifier = specifier.trim_end_matches("!reexport").to_string();
                parsed.internal_imports.push(ParsedImport {
                    specifier,
                    identifiers,
                    is_re_exported,
                    is_star,
                });
            } else if let Some(rest) = line.strip_prefix("// export:") {
                let mut parts = rest.trim().splitn(3, ':');
                let Some(name) = parts.next() else {
                    continue;
                };
                let kind = match parts.next() {
                    Some("type") => ExportKind::Type,
                    Some("interface") => ExportKind::Interface,
                    Some("enum") => ExportKind::Enum,
                    Some("class") => ExportKind::Class,
                    Some("value") | None => ExportKind::Value,
                    _ => ExportKind::Other,
                };
                let is_public = parts.next() == Some("public");
                parsed.exports.push(ParsedExport {
                    name: name.trim().to_string(),
                    kind,
                    members: Vec::new(),
                    is_public,
                });
            }
        }

        Ok(parsed)
    }
}
