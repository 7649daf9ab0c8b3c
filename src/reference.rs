//! Cross-key reference resolution.
//!
//! Rewrites `${ref:keypath}` tokens by looking up another location in
//! the same tree. All lookups go against the pre-pass snapshot, so the
//! result does not depend on traversal order. Chains are followed
//! transitively with cycle and depth detection; a post-pass scan fails
//! closed if any token survives.

use crate::error::{Error, Result};
use crate::keypath::Keypath;
use crate::tree::{self, Tree};
use regex_lite::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Default maximum number of transitive hops per reference chain.
pub const DEFAULT_MAX_DEPTH: usize = 32;

static REF_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{ref:([^}]*)\}").unwrap());

/// Resolve every `${ref:..}` token in the tree.
///
/// Runs after placeholder resolution. Returns a new tree with no
/// remaining reference tokens; the input is not mutated.
pub fn resolve(tree: &Tree, max_depth: usize) -> Result<Tree> {
    let resolved = tree::transform_strings(tree, &mut |text, keypath| {
        // The chain starts at the referencing leaf so cycle reports
        // name the full loop.
        let mut chain = vec![keypath.to_string()];
        resolve_string_leaf(text, keypath, tree, &mut chain, max_depth)
    })?;
    verify_no_tokens(&resolved)?;
    Ok(resolved)
}

/// Resolve one string leaf against the snapshot.
///
/// A string that is exactly one token may substitute a value of any
/// type; tokens embedded in a larger string must resolve to scalars.
fn resolve_string_leaf(
    text: &str,
    at: &Keypath,
    snapshot: &Tree,
    chain: &mut Vec<String>,
    max_depth: usize,
) -> Result<Tree> {
    // Whole-string token: type-changing substitution is allowed.
    if let Some(captures) = REF_TOKEN.captures(text) {
        let token = captures.get(0).unwrap();
        if token.start() == 0 && token.end() == text.len() {
            let target = captures.get(1).unwrap().as_str();
            return resolve_target(target, at, snapshot, chain, max_depth);
        }
    } else {
        return Ok(Value::String(text.to_string()));
    }

    // Embedded tokens: splice scalar renderings.
    let mut out = String::with_capacity(text.len());
    let mut last_end = 0;
    for captures in REF_TOKEN.captures_iter(text) {
        let token = captures.get(0).unwrap();
        let target = captures.get(1).unwrap().as_str();
        out.push_str(&text[last_end..token.start()]);
        last_end = token.end();

        let value = resolve_target(target, at, snapshot, chain, max_depth)?;
        match tree::scalar_to_string(&value) {
            Some(rendered) => out.push_str(&rendered),
            None => {
                return Err(Error::NonScalarReference {
                    target: target.to_string(),
                    keypath: at.to_string(),
                });
            }
        }
    }
    out.push_str(&text[last_end..]);
    Ok(Value::String(out))
}

/// Follow one reference hop, then resolve whatever it points at.
fn resolve_target(
    raw_target: &str,
    at: &Keypath,
    snapshot: &Tree,
    chain: &mut Vec<String>,
    max_depth: usize,
) -> Result<Tree> {
    let keypath = Keypath::parse(raw_target)?;
    let key = keypath.to_string();

    if chain.contains(&key) {
        let mut cycle = chain.clone();
        cycle.push(key);
        return Err(Error::CyclicReference { chain: cycle });
    }
    if chain.len() > max_depth {
        return Err(Error::ReferenceDepthExceeded {
            keypath: at.to_string(),
            max_depth,
        });
    }

    let value = tree::get_path(snapshot, &keypath)
        .ok_or_else(|| Error::UnresolvedReference {
            target: key.clone(),
            keypath: at.to_string(),
        })?
        .clone();

    chain.push(key);
    let resolved = resolve_value(&value, &keypath, snapshot, chain, max_depth);
    chain.pop();
    resolved
}

/// Resolve a looked-up value, recursing into mappings and sequences so
/// a substituted subtree carries no unresolved tokens of its own.
fn resolve_value(
    value: &Tree,
    at: &Keypath,
    snapshot: &Tree,
    chain: &mut Vec<String>,
    max_depth: usize,
) -> Result<Tree> {
    match value {
        Value::String(text) => resolve_string_leaf(text, at, snapshot, chain, max_depth),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, child) in map {
                let child_path = at.child(key);
                out.insert(
                    key.clone(),
                    resolve_value(child, &child_path, snapshot, chain, max_depth)?,
                );
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, child) in items.iter().enumerate() {
                let child_path = at.child(&index.to_string());
                out.push(resolve_value(child, &child_path, snapshot, chain, max_depth)?);
            }
            Ok(Value::Array(out))
        }
        other => Ok(other.clone()),
    }
}

/// Guard against resolver bugs leaking raw tokens to consumers.
fn verify_no_tokens(tree: &Tree) -> Result<()> {
    tree::transform_strings(tree, &mut |text, keypath| {
        if let Some(captures) = REF_TOKEN.captures(text) {
            return Err(Error::UnresolvedReference {
                target: captures.get(1).unwrap().as_str().to_string(),
                keypath: keypath.to_string(),
            });
        }
        Ok(Value::String(text.to_string()))
    })
    .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn resolve_default(tree: &Tree) -> Result<Tree> {
        resolve(tree, DEFAULT_MAX_DEPTH)
    }

    #[test]
    fn test_simple_reference() {
        let tree = json!({"a": 1, "b": "${ref:a}"});
        let resolved = resolve_default(&tree).unwrap();
        assert_eq!(resolved, json!({"a": 1, "b": 1}));
    }

    #[test]
    fn test_transitive_reference() {
        let tree = json!({"a": 1, "b": "${ref:a}", "c": "${ref:b}"});
        let resolved = resolve_default(&tree).unwrap();
        assert_eq!(resolved["c"], json!(1));
    }

    #[test]
    fn test_nested_target() {
        let tree = json!({"image": {"size": 100}, "thumb": "${ref:image.size}"});
        let resolved = resolve_default(&tree).unwrap();
        assert_eq!(resolved["thumb"], json!(100));
    }

    #[test]
    fn test_missing_target_is_loud() {
        let tree = json!({"a": "${ref:absent.key}"});
        let err = resolve_default(&tree).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnresolvedReference);
        assert!(err.to_string().contains("absent.key"));
    }

    #[test]
    fn test_two_node_cycle_names_both() {
        let tree = json!({"a": "${ref:b}", "b": "${ref:a}"});
        let err = resolve_default(&tree).unwrap_err();
        match err {
            Error::CyclicReference { chain } => {
                assert!(chain.contains(&"a".to_string()));
                assert!(chain.contains(&"b".to_string()));
            }
            other => panic!("expected CyclicReference, got {other:?}"),
        }
    }

    #[test]
    fn test_self_reference_cycle() {
        let tree = json!({"a": "${ref:a}"});
        let err = resolve_default(&tree).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CyclicReference);
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let tree = json!({
            "base": "x",
            "left": "${ref:base}",
            "right": "${ref:base}",
            "both": "${ref:left}-${ref:right}"
        });
        let resolved = resolve_default(&tree).unwrap();
        assert_eq!(resolved["both"], json!("x-x"));
    }

    #[test]
    fn test_whole_string_token_substitutes_mapping() {
        let tree = json!({"defaults": {"size": 100}, "image": "${ref:defaults}"});
        let resolved = resolve_default(&tree).unwrap();
        assert_eq!(resolved["image"], json!({"size": 100}));
    }

    #[test]
    fn test_embedded_non_scalar_target_fails() {
        let tree = json!({"defaults": {"size": 100}, "label": "using ${ref:defaults}"});
        let err = resolve_default(&tree).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NonScalarReference);
    }

    #[test]
    fn test_embedded_scalar_splice() {
        let tree = json!({"size": 100, "label": "size is ${ref:size}px"});
        let resolved = resolve_default(&tree).unwrap();
        assert_eq!(resolved["label"], json!("size is 100px"));
    }

    #[test]
    fn test_substituted_subtree_is_fully_resolved() {
        // The mapping pulled in via `${ref:group}` itself contains a
        // reference, which must not leak into the output.
        let tree = json!({
            "host": "localhost",
            "group": {"url": "${ref:host}"},
            "copy": "${ref:group}"
        });
        let resolved = resolve_default(&tree).unwrap();
        assert_eq!(resolved["copy"], json!({"url": "localhost"}));
    }

    #[test]
    fn test_depth_limit() {
        // a0 -> a1 -> ... -> a5, resolved with a max depth of 3.
        let mut map = serde_json::Map::new();
        map.insert("a5".to_string(), json!("end"));
        for i in (0..5).rev() {
            map.insert(format!("a{i}"), json!(format!("${{ref:a{}}}", i + 1)));
        }
        let tree = Value::Object(map);
        let err = resolve(&tree, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReferenceDepthExceeded);
        assert!(resolve(&tree, DEFAULT_MAX_DEPTH).is_ok());
    }

    #[test]
    fn test_empty_target_is_invalid_path() {
        let tree = json!({"a": "${ref:}"});
        let err = resolve_default(&tree).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPath);
    }

    #[test]
    fn test_idempotent_on_resolved_tree() {
        let tree = json!({"a": 1, "b": "plain", "c": {"d": [true, null]}});
        let resolved = resolve_default(&tree).unwrap();
        assert_eq!(resolved, tree);
    }

    #[test]
    fn test_order_independent_lookup_uses_snapshot() {
        // `z` sorts after `a` but references it; both directions work.
        let tree = json!({"z": "${ref:a}", "a": "${ref:b}", "b": 7});
        let resolved = resolve_default(&tree).unwrap();
        assert_eq!(resolved["z"], json!(7));
        assert_eq!(resolved["a"], json!(7));
    }
}
