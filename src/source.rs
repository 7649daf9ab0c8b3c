//! Source descriptors and loading.
//!
//! A source names a filesystem location (or an inline tree) plus an
//! optional top-level section to select after parsing. Format is
//! inferred from the file extension; YAML is the fallback for unknown
//! extensions since it is a superset of what the engine needs.

use crate::error::{Error, Result};
use crate::tree::Tree;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Text format of a file source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Yaml,
    Json,
}

impl Format {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Format::Json,
            Some("yaml") | Some("yml") => Format::Yaml,
            _ => Format::Yaml,
        }
    }
}

/// One named configuration source.
///
/// Constructed once at load time and immutable thereafter. Precedence
/// is positional: the order sources are handed to the pipeline is
/// ascending precedence (last wins).
#[derive(Debug, Clone)]
pub enum SourceDescriptor {
    /// A file on disk, parsed per `format`.
    File {
        path: PathBuf,
        section: Option<String>,
        format: Format,
    },
    /// An already-materialized tree, e.g. embedded defaults.
    Inline {
        tree: Tree,
        section: Option<String>,
    },
}

impl SourceDescriptor {
    /// Describe a file source, inferring the format from its extension.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = Format::from_path(&path);
        Self::File {
            path,
            section: None,
            format,
        }
    }

    /// Describe an inline tree source.
    pub fn inline(tree: Tree) -> Self {
        Self::Inline {
            tree,
            section: None,
        }
    }

    /// Select a single top-level section from this source.
    pub fn with_section(self, section: impl Into<String>) -> Self {
        match self {
            Self::File { path, format, .. } => Self::File {
                path,
                section: Some(section.into()),
                format,
            },
            Self::Inline { tree, .. } => Self::Inline {
                tree,
                section: Some(section.into()),
            },
        }
    }

    /// Human-readable location for logs and errors.
    pub fn location(&self) -> String {
        match self {
            Self::File { path, .. } => path.display().to_string(),
            Self::Inline { .. } => "<inline>".to_string(),
        }
    }

    /// Read, decode, and parse this source into a tree.
    pub fn load(&self) -> Result<Tree> {
        let tree = match self {
            Self::File { path, format, .. } => {
                let bytes = std::fs::read(path).map_err(|source| Error::SourceNotFound {
                    location: path.clone(),
                    source,
                })?;
                let text = String::from_utf8(bytes).map_err(|_| Error::Decode {
                    location: path.clone(),
                })?;
                let tree = parse(&text, *format, path)?;
                debug!(location = %path.display(), ?format, "Loaded source");
                tree
            }
            Self::Inline { tree, .. } => tree.clone(),
        };

        match self.section() {
            Some(section) => select_section(tree, section, &self.location()),
            None => Ok(tree),
        }
    }

    fn section(&self) -> Option<&str> {
        match self {
            Self::File { section, .. } | Self::Inline { section, .. } => section.as_deref(),
        }
    }
}

impl From<&Path> for SourceDescriptor {
    fn from(path: &Path) -> Self {
        Self::file(path)
    }
}

impl From<PathBuf> for SourceDescriptor {
    fn from(path: PathBuf) -> Self {
        Self::file(path)
    }
}

fn parse(text: &str, format: Format, location: &Path) -> Result<Tree> {
    match format {
        Format::Yaml => serde_yaml::from_str::<Value>(text).map_err(|e| Error::Parse {
            location: location.to_path_buf(),
            message: e.to_string(),
        }),
        Format::Json => serde_json::from_str::<Value>(text).map_err(|e| Error::Parse {
            location: location.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

fn select_section(tree: Tree, section: &str, location: &str) -> Result<Tree> {
    tree.as_object()
        .and_then(|map| map.get(section))
        .cloned()
        .ok_or_else(|| Error::KeyNotFound {
            keypath: format!("{location}:{section}"),
        })
}
