//! Package manifest parsing.
//!
//! Mirrors the field list a package manifest needs for dependency and entry
//! point accounting. Parse failures are Tier-1 fatal (`Error::ManifestParse`)
//! since a missing manifest means the workspace registry can't be built at
//! all.

use std::collections::BTreeMap;

use culler_errors::Spanned;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Either a single string or an array of strings -- `bin` and `main` both
/// show up in either shape across the ecosystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrMap {
    Single(String),
    Many(BTreeMap<String, String>),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub name: Option<Spanned<String>>,
    pub main: Option<Spanned<String>>,
    pub module: Option<Spanned<String>>,
    pub bin: Option<StringOrMap>,
    #[serde(default)]
    pub exports: Option<serde_json::Value>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub peer_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub optional_dependencies: BTreeMap<String, String>,
    /// Catch-all for the plugin-owned configuration section (e.g. a
    /// `"knip"` key); plugins interpret this themselves.
    #[serde(default)]
    pub plugin_config: serde_json::Value,
}

impl Manifest {
    pub fn parse(path: &culler_paths::AbsoluteSystemPath, text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|source| Error::ManifestParse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn package_name(&self) -> Option<&str> {
        self.name.as_ref().map(|n| n.as_str())
    }

    /// Resolves a subpath (e.g. `"./foo"`, or `""` for the package root)
    /// against the `exports` map, the way Node's subpath-exports resolution
    /// does for the common shapes: a single string (root export only), a
    /// flat subpath map (`{"./foo": "./dist/foo.js"}`), and conditional
    /// exports nested one level under a subpath key (picks the `"default"`
    /// or `"import"` condition, in that preference order). Returns `None`
    /// when `exports` is absent or the subpath has no matching entry, so the
    /// caller can fall back to a plain directory join.
    pub fn resolve_export_subpath(&self, subpath: &str) -> Option<String> {
        let exports = self.exports.as_ref()?;
        let owned_key = format!("./{subpath}");
        let key = if subpath.is_empty() { "." } else { owned_key.as_str() };

        match exports {
            serde_json::Value::String(root) if key == "." => Some(root.clone()),
            serde_json::Value::Object(map) => {
                let target = map.get(key)?;
                Self::resolve_export_target(target)
            }
            _ => None,
        }
    }

    fn resolve_export_target(target: &serde_json::Value) -> Option<String> {
        match target {
            serde_json::Value::String(path) => Some(path.clone()),
            serde_json::Value::Object(conditions) => ["default", "import", "require"]
                .iter()
                .find_map(|condition| conditions.get(*condition))
                .and_then(|value| value.as_str())
                .map(str::to_string),
            _ => None,
        }
    }

    /// Entry-bearing fields declared directly on the manifest: `main`,
    /// `module`, and every `bin` target. These seed the Principal's entry
    /// path set alongside whatever the plugin layer contributes.
    pub fn declared_entry_fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        if let Some(main) = &self.main {
            fields.push(main.as_str().to_string());
        }
        if let Some(module) = &self.module {
            fields.push(module.as_str().to_string());
        }
        match &self.bin {
            Some(StringOrMap::Single(path)) => fields.push(path.clone()),
            Some(StringOrMap::Many(map)) => fields.extend(map.values().cloned()),
            None => {}
        }
        fields
    }
}
