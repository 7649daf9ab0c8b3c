//! Read-only facade over the resolved tree.
//!
//! Consumers never see raw unresolved trees; a `ConfigView` is built
//! once per pipeline load and is immutable. Re-loading produces a new
//! instance.

use crate::error::{Error, Result};
use crate::keypath::Keypath;
use crate::tree::{self, Tree};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Section-addressable, typed access to a fully resolved tree.
#[derive(Debug, Clone)]
pub struct ConfigView {
    tree: Tree,
    default_section: Option<String>,
}

impl ConfigView {
    /// Wrap a resolved tree.
    ///
    /// A configured `default_section` absent from the tree is not an
    /// error here; only lookups against it fail.
    pub fn new(tree: Tree, default_section: Option<String>) -> Self {
        Self {
            tree,
            default_section,
        }
    }

    /// The whole resolved tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Sub-tree at the given section.
    ///
    /// Fallback precedence: explicit `name` argument, then the
    /// configured default section, then the whole tree.
    pub fn section(&self, name: Option<&str>) -> Result<&Tree> {
        let effective = name.or(self.default_section.as_deref());
        match effective {
            Some(section) => self
                .tree
                .as_object()
                .and_then(|map| map.get(section))
                .ok_or_else(|| Error::KeyNotFound {
                    keypath: section.to_string(),
                }),
            None => Ok(&self.tree),
        }
    }

    /// Sub-tree at a dotted keypath, relative to the tree root.
    pub fn get(&self, keypath: &str) -> Result<&Tree> {
        let normalized = Keypath::parse(keypath)?;
        tree::get_path(&self.tree, &normalized).ok_or_else(|| Error::KeyNotFound {
            keypath: normalized.to_string(),
        })
    }

    /// Read-only snapshot of the top-level mapping.
    ///
    /// Non-mapping roots yield an empty map. Mutating the snapshot
    /// never affects the view.
    pub fn as_mapping(&self) -> serde_json::Map<String, Value> {
        self.tree.as_object().cloned().unwrap_or_default()
    }

    /// Deserialize the value at `keypath` into a typed struct.
    pub fn extract<T: DeserializeOwned>(&self, keypath: &str) -> Result<T> {
        let value = self.get(keypath)?.clone();
        serde_json::from_value(value).map_err(|e| Error::InvalidValue {
            keypath: keypath.to_string(),
            expected: e.to_string(),
        })
    }

    /// Deserialize a whole section into a typed struct.
    pub fn section_as<T: DeserializeOwned>(&self, name: Option<&str>) -> Result<T> {
        let value = self.section(name)?.clone();
        serde_json::from_value(value).map_err(|e| Error::InvalidValue {
            keypath: name.or(self.default_section.as_deref()).unwrap_or("").to_string(),
            expected: e.to_string(),
        })
    }

    /// String at `keypath`.
    pub fn get_str(&self, keypath: &str) -> Result<&str> {
        self.get(keypath)?
            .as_str()
            .ok_or_else(|| Error::InvalidValue {
                keypath: keypath.to_string(),
                expected: "string".to_string(),
            })
    }

    /// Boolean at `keypath`.
    pub fn get_bool(&self, keypath: &str) -> Result<bool> {
        self.get(keypath)?
            .as_bool()
            .ok_or_else(|| Error::InvalidValue {
                keypath: keypath.to_string(),
                expected: "boolean".to_string(),
            })
    }

    /// Integer at `keypath`.
    pub fn get_i64(&self, keypath: &str) -> Result<i64> {
        self.get(keypath)?
            .as_i64()
            .ok_or_else(|| Error::InvalidValue {
                keypath: keypath.to_string(),
                expected: "integer".to_string(),
            })
    }

    /// Float at `keypath` (integers widen).
    pub fn get_f64(&self, keypath: &str) -> Result<f64> {
        self.get(keypath)?
            .as_f64()
            .ok_or_else(|| Error::InvalidValue {
                keypath: keypath.to_string(),
                expected: "number".to_string(),
            })
    }
}
