//! Tree representation and traversal helpers.
//!
//! The universal in-memory form of any loaded source is
//! [`serde_json::Value`] with insertion-ordered mappings. YAML and JSON
//! sources both parse into it losslessly; this module adds the keypath
//! lookup and string-leaf traversal the resolution stages are built on.

use crate::error::Result;
use crate::keypath::Keypath;
use serde_json::Value;

/// The generic nested configuration value: mapping, sequence, or scalar.
pub type Tree = Value;

/// Look up the sub-tree at `keypath`, or `None` if any segment is missing.
///
/// The root keypath returns the tree itself. Sequence indexing is not
/// supported; keypaths address mapping keys only.
pub fn get_path<'a>(tree: &'a Tree, keypath: &Keypath) -> Option<&'a Tree> {
    let mut current = tree;
    for segment in keypath.segments() {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Render a scalar for splicing into a surrounding string.
///
/// Returns `None` for mappings and sequences.
pub fn scalar_to_string(value: &Tree) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Object(_) | Value::Array(_) => None,
    }
}

/// Rebuild a tree, passing every string leaf through `transform`.
///
/// The transform receives the leaf content and its keypath and may
/// return any value, so a string leaf can be replaced by a mapping or
/// sequence (type-changing substitution). Non-string leaves and
/// structural nodes are cloned unchanged.
pub fn transform_strings<F>(tree: &Tree, transform: &mut F) -> Result<Tree>
where
    F: FnMut(&str, &Keypath) -> Result<Tree>,
{
    let mut path = Vec::new();
    transform_at(tree, transform, &mut path)
}

fn transform_at<F>(tree: &Tree, transform: &mut F, path: &mut Vec<String>) -> Result<Tree>
where
    F: FnMut(&str, &Keypath) -> Result<Tree>,
{
    match tree {
        Value::String(s) => {
            let keypath = Keypath::from_segments(path.iter().cloned());
            transform(s, &keypath)
        }
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, child) in map {
                path.push(key.clone());
                let transformed = transform_at(child, transform, path);
                path.pop();
                out.insert(key.clone(), transformed?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, child) in items.iter().enumerate() {
                path.push(index.to_string());
                let transformed = transform_at(child, transform, path);
                path.pop();
                out.push(transformed?);
            }
            Ok(Value::Array(out))
        }
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_path_nested() {
        let tree = json!({"image": {"save": {"copy": true}}});
        let keypath = Keypath::parse("image.save.copy").unwrap();
        assert_eq!(get_path(&tree, &keypath), Some(&json!(true)));
    }

    #[test]
    fn test_get_path_missing_segment() {
        let tree = json!({"image": {"size": 100}});
        let keypath = Keypath::parse("image.missing").unwrap();
        assert_eq!(get_path(&tree, &keypath), None);
    }

    #[test]
    fn test_get_path_root() {
        let tree = json!({"a": 1});
        let root = Keypath::normalize_allow_root("", '.');
        assert_eq!(get_path(&tree, &root), Some(&tree));
    }

    #[test]
    fn test_scalar_rendering() {
        assert_eq!(scalar_to_string(&json!("x")), Some("x".to_string()));
        assert_eq!(scalar_to_string(&json!(42)), Some("42".to_string()));
        assert_eq!(scalar_to_string(&json!(true)), Some("true".to_string()));
        assert_eq!(scalar_to_string(&json!(null)), Some("null".to_string()));
        assert_eq!(scalar_to_string(&json!({})), None);
        assert_eq!(scalar_to_string(&json!([])), None);
    }

    #[test]
    fn test_transform_strings_sees_keypaths() {
        let tree = json!({"a": {"b": "x"}, "list": ["y"]});
        let mut seen = Vec::new();
        let result = transform_strings(&tree, &mut |s, keypath| {
            seen.push((s.to_string(), keypath.to_string()));
            Ok(Value::String(s.to_uppercase()))
        })
        .unwrap();
        assert_eq!(result, json!({"a": {"b": "X"}, "list": ["Y"]}));
        assert!(seen.contains(&("x".to_string(), "a.b".to_string())));
        assert!(seen.contains(&("y".to_string(), "list.0".to_string())));
    }

    #[test]
    fn test_transform_preserves_non_strings() {
        let tree = json!({"n": 1, "b": false, "z": null});
        let result = transform_strings(&tree, &mut |s, _| Ok(Value::String(s.to_string()))).unwrap();
        assert_eq!(result, tree);
    }
}
