//! Module specifier classification.
//!
//! Classification is a pure function of the specifier string -- it never
//! touches the filesystem. The engine decides what to do with each class in
//! `engine::classify_and_resolve`.

/// The four mutually-exclusive specifier classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    /// Starts with `.` or `/`, or is otherwise rooted inside the project.
    InternalRelative,
    /// An absolute path containing a `node_modules` segment.
    NodeModulesAbsolute,
    /// `pkg`, `@scope/pkg`, or either with a subpath.
    BarePackage,
    /// Doesn't fit any of the above (e.g. empty string, data: URL).
    Unresolvable,
}

pub fn classify(specifier: &str) -> SpecifierKind {
    if specifier.is_empty() {
        return SpecifierKind::Unresolvable;
    }

    if specifier.starts_with('.') {
        return SpecifierKind::InternalRelative;
    }

    if specifier.starts_with('/') {
        return if contains_node_modules_segment(specifier) {
            SpecifierKind::NodeModulesAbsolute
        } else {
            SpecifierKind::InternalRelative
        };
    }

    if is_bare_package_like(specifier) {
        SpecifierKind::BarePackage
    } else {
        SpecifierKind::Unresolvable
    }
}

fn contains_node_modules_segment(path: &str) -> bool {
    path.split('/').any(|segment| segment == "node_modules")
}

fn is_bare_package_like(specifier: &str) -> bool {
    let first_segment = specifier.split('/').next().unwrap_or_default();
    if first_segment.is_empty() {
        return false;
    }
    if let Some(scope) = first_segment.strip_prefix('@') {
        return !scope.is_empty() && specifier.split('/').nth(1).is_some_and(|s| !s.is_empty());
    }
    true
}

/// Derives a package name from a specifier already classified as
/// `BarePackage` or `NodeModulesAbsolute`. Takes the first segment, plus the
/// scope segment if the first segment begins with `@`. The caller is
/// expected to have already stripped any `node_modules/` prefix for the
/// absolute case.
pub fn package_name(specifier: &str) -> Option<&str> {
    let specifier = specifier.trim_start_matches('/');
    if specifier.is_empty() {
        return None;
    }

    let mut segments = specifier.split('/');
    let first = segments.next()?;
    if first.is_empty() {
        return None;
    }

    if first.starts_with('@') {
        let second = segments.next()?;
        if second.is_empty() {
            return None;
        }
        let end = first.len() + 1 + second.len();
        Some(&specifier[..end])
    } else {
        Some(first)
    }
}

/// Given an absolute specifier known to contain a `node_modules` segment,
/// returns the suffix starting right after the last such segment -- this is
/// the part that names the package (and subpath).
pub fn after_last_node_modules(path: &str) -> Option<&str> {
    let idx = path.rfind("/node_modules/")?;
    Some(&path[idx + "/node_modules/".len()..])
}
