//! Deep merge of source trees under a merge policy.
//!
//! Mappings merge recursively with later sources winning; sequences
//! combine per the configured list strategy; mixed-type conflicts are
//! resolved by later-wins replacement, never an error.

use crate::tree::Tree;
use serde_json::Value;

/// How two sequences at the same keypath combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListStrategy {
    /// Later sequence wins outright.
    #[default]
    Replace,
    /// Concatenate earlier then later.
    Append,
    /// Concatenate, then deduplicate preserving first occurrence order.
    UniqueAppend,
}

/// Deterministic rules for combining source trees.
///
/// Map merge is always deep; precedence is source order ascending
/// (last wins).
#[derive(Debug, Clone, Copy, Default)]
pub struct MergePolicy {
    pub list_strategy: ListStrategy,
}

impl MergePolicy {
    pub fn with_list_strategy(list_strategy: ListStrategy) -> Self {
        Self { list_strategy }
    }
}

/// Deep merge two trees, with `overlay` taking precedence over `base`.
///
/// - Mappings merge key-by-key, recursing where a key exists in both
/// - Sequences combine per `policy.list_strategy`
/// - Everything else (scalars, mixed-type conflicts) is replaced by
///   the overlay value, including explicit nulls
pub fn deep_merge(base: Tree, overlay: Tree, policy: &MergePolicy) -> Tree {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                // Taking in place keeps the base key's position; new keys append.
                let merged_value = if let Some(base_value) = base_map.get_mut(&key) {
                    deep_merge(base_value.take(), overlay_value, policy)
                } else {
                    overlay_value
                };
                base_map.insert(key, merged_value);
            }
            Value::Object(base_map)
        }
        (Value::Array(base_items), Value::Array(overlay_items)) => {
            merge_sequences(base_items, overlay_items, policy.list_strategy)
        }
        (_, overlay) => overlay,
    }
}

fn merge_sequences(base: Vec<Tree>, overlay: Vec<Tree>, strategy: ListStrategy) -> Tree {
    match strategy {
        ListStrategy::Replace => Value::Array(overlay),
        ListStrategy::Append => {
            let mut items = base;
            items.extend(overlay);
            Value::Array(items)
        }
        ListStrategy::UniqueAppend => {
            let mut items = base;
            for candidate in overlay {
                if !items.contains(&candidate) {
                    items.push(candidate);
                }
            }
            Value::Array(items)
        }
    }
}

/// Merge trees in ascending precedence order (later wins).
///
/// Equivalent to folding `deep_merge` over the list. An empty input
/// yields an empty mapping.
pub fn merge_all(trees: impl IntoIterator<Item = Tree>, policy: &MergePolicy) -> Tree {
    trees
        .into_iter()
        .fold(Value::Object(serde_json::Map::new()), |base, overlay| {
            deep_merge(base, overlay, policy)
        })
}
