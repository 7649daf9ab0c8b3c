//! Keypath normalization.
//!
//! A keypath addresses a location inside a tree as an ordered sequence
//! of non-empty segments. Normalization splits on a separator and
//! drops empty segments, so `"a..b"`, `".a.b"`, and `"a.b."` all
//! normalize to the same keypath as `"a.b"`.

use crate::error::{Error, Result};

/// Default segment separator.
pub const DEFAULT_SEPARATOR: char = '.';

/// A normalized keypath: ordered non-empty segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Keypath(Vec<String>);

impl Keypath {
    /// Normalize a path string, requiring at least one segment.
    pub fn normalize(path: &str, separator: char) -> Result<Self> {
        let keypath = Self::normalize_allow_root(path, separator);
        if keypath.is_root() {
            return Err(Error::InvalidPath {
                path: path.to_string(),
            });
        }
        Ok(keypath)
    }

    /// Normalize a path string, accepting the empty (root) path.
    ///
    /// A backslash escapes the next character, so `a\.b` is a single
    /// segment containing a literal separator.
    pub fn normalize_allow_root(path: &str, separator: char) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = path.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                current.push(chars.next().unwrap_or('\\'));
            } else if c == separator {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            } else {
                current.push(c);
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        Self(segments)
    }

    /// Normalize with the default `.` separator.
    pub fn parse(path: &str) -> Result<Self> {
        Self::normalize(path, DEFAULT_SEPARATOR)
    }

    /// Build a keypath from segments already known to be non-empty.
    pub fn from_segments(segments: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// The ordered segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether this keypath addresses the root of a tree.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Inverse of normalization. Separators and backslashes inside
    /// segments are re-escaped.
    pub fn join(&self, separator: char) -> String {
        let escaped: Vec<String> = self
            .0
            .iter()
            .map(|segment| {
                let mut out = String::with_capacity(segment.len());
                for c in segment.chars() {
                    if c == '\\' || c == separator {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out
            })
            .collect();
        escaped.join(&separator.to_string())
    }

    /// Extend with one more segment, returning a new keypath.
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }
}

impl std::fmt::Display for Keypath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.join(DEFAULT_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_normalize_drops_empty_segments() {
        let a = Keypath::parse("a..b").unwrap();
        let b = Keypath::parse("a.b").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.segments(), ["a", "b"]);
    }

    #[test]
    fn test_leading_and_trailing_separators_ignored() {
        let path = Keypath::parse(".a.b.").unwrap();
        assert_eq!(path.segments(), ["a", "b"]);
    }

    #[test]
    fn test_empty_path_is_invalid() {
        let err = Keypath::parse("...").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPath);
    }

    #[test]
    fn test_root_allowed_when_requested() {
        let root = Keypath::normalize_allow_root("", '.');
        assert!(root.is_root());
    }

    #[test]
    fn test_custom_separator() {
        let path = Keypath::normalize("a/b/c", '/').unwrap();
        assert_eq!(path.segments(), ["a", "b", "c"]);
    }

    #[test]
    fn test_join_round_trip() {
        for input in ["a.b.c", "a..b", ".x.", "single"] {
            let normalized = Keypath::parse(input).unwrap();
            let rejoined = Keypath::parse(&normalized.join('.')).unwrap();
            assert_eq!(normalized, rejoined);
        }
    }

    #[test]
    fn test_escaped_separator_stays_in_segment() {
        let path = Keypath::parse(r"a\.b.c").unwrap();
        assert_eq!(path.segments(), ["a.b", "c"]);
    }

    #[test]
    fn test_escaped_segments_round_trip_through_join() {
        let path = Keypath::from_segments(["a.b", "c\\d"]);
        let rejoined = Keypath::parse(&path.join('.')).unwrap();
        assert_eq!(path, rejoined);
    }

    #[test]
    fn test_child_extends() {
        let path = Keypath::parse("a").unwrap().child("b");
        assert_eq!(path.to_string(), "a.b");
    }
}
