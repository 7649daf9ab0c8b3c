//! Placeholder substitution from an environment-backed context.
//!
//! Rewrites `${NAME}`, `${NAME:default}`, and `{{name}}` tokens inside
//! string leaves. Substitution is single-pass per string: resolved
//! values are never re-scanned, so a placeholder value containing
//! another token stays literal.

use crate::error::{Error, OnError, Result};
use crate::keypath::Keypath;
use crate::tree::{self, Tree};
use regex_lite::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::warn;

/// Combined token pattern: `${NAME}` / `${NAME:default}` / `{{name}}`.
/// NAME is `[A-Za-z_][A-Za-z0-9_]*`.
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::([^}]*))?\}|\{\{([A-Za-z_][A-Za-z0-9_]*)\}\}")
        .unwrap()
});

/// Variable lookup for a resolution pass.
///
/// Snapshots the process environment at construction; caller-supplied
/// overrides win over environment values. Read-only during a pass.
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    vars: HashMap<String, String>,
}

impl ResolutionContext {
    /// Empty context with no variables.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot the process environment.
    ///
    /// Whitespace-only values are treated as unset.
    pub fn from_env() -> Self {
        let vars = std::env::vars()
            .filter(|(_, value)| !value.trim().is_empty())
            .collect();
        Self { vars }
    }

    /// Add a variable, overriding any environment value of the same name.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Look up a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

/// Substitute every placeholder token in every string leaf.
///
/// `${ref:..}` tokens are reserved for the reference stage and pass
/// through untouched. Returns a new tree; the input is not mutated.
pub fn resolve(tree: &Tree, context: &ResolutionContext, on_error: OnError) -> Result<Tree> {
    tree::transform_strings(tree, &mut |text, keypath| {
        resolve_string(text, keypath, context, on_error).map(Value::String)
    })
}

fn resolve_string(
    text: &str,
    keypath: &Keypath,
    context: &ResolutionContext,
    on_error: OnError,
) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut last_end = 0;

    for captures in TOKEN.captures_iter(text) {
        let token = captures.get(0).unwrap();
        out.push_str(&text[last_end..token.start()]);
        last_end = token.end();

        // `${NAME}` / `${NAME:default}` branch; group 3 is `{{name}}`.
        let (name, default) = match captures.get(1) {
            Some(name) => (name.as_str(), captures.get(2).map(|m| m.as_str())),
            None => (captures.get(3).unwrap().as_str(), None),
        };

        // Reference tokens belong to the reference stage.
        if name == "ref" && default.is_some() {
            out.push_str(token.as_str());
            continue;
        }

        match (context.get(name), default) {
            (Some(value), _) => out.push_str(value),
            (None, Some(default)) => out.push_str(default),
            (None, None) => match on_error {
                OnError::Raise => {
                    return Err(Error::UnresolvedPlaceholder {
                        name: name.to_string(),
                        keypath: keypath.to_string(),
                    });
                }
                OnError::Ignore => out.push_str(token.as_str()),
                OnError::Warn => {
                    warn!(
                        name = %name,
                        keypath = %keypath,
                        "Unresolved placeholder, substituting empty string"
                    );
                }
            },
        }
    }

    out.push_str(&text[last_end..]);
    Ok(out)
}
