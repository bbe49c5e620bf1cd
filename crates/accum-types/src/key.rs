//! Hierarchical path keys.
//!
//! A [`PathKey`] is an ordered list of non-empty segments rendered with a
//! leading and trailing separator, e.g. `/DIGITS/chamber1/`. The root key has
//! no segments and renders as `/`.
//!
//! Keys are kept in their rendered form so that ordering matches the byte
//! order of the key strings, which is the order used for sorted enumeration
//! and printing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KeyError;

/// The path separator.
pub const SEPARATOR: char = '/';

/// Segment index conventionally denoting the last segment (the object name
/// when a full identifier encodes `.../name`).
pub const LAST: isize = -1;

/// A normalized hierarchical key such as `/a/b/`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathKey(String);

impl PathKey {
    /// The root key `/` (no segments).
    pub fn root() -> Self {
        Self(SEPARATOR.to_string())
    }

    /// Normalize a raw key: exactly one leading and trailing separator, and
    /// repeated separators collapsed. An empty input yields the root key.
    ///
    /// Normalization is idempotent.
    ///
    /// ```
    /// use accum_types::PathKey;
    ///
    /// assert_eq!(PathKey::normalize("a//b").as_str(), "/a/b/");
    /// assert_eq!(PathKey::normalize("/a/b/").as_str(), "/a/b/");
    /// assert!(PathKey::normalize("").is_root());
    /// ```
    pub fn normalize(raw: &str) -> Self {
        let mut repr = String::with_capacity(raw.len() + 2);
        repr.push(SEPARATOR);
        for segment in raw.split(SEPARATOR).filter(|s| !s.is_empty()) {
            repr.push_str(segment);
            repr.push(SEPARATOR);
        }
        Self(repr)
    }

    /// Parse a key in strict form: it must be empty (root) or start with the
    /// separator. Anything else is a [`KeyError::Format`].
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        if !raw.is_empty() && !raw.starts_with(SEPARATOR) {
            return Err(KeyError::Format {
                key: raw.to_string(),
                reason: "should start with '/'".into(),
            });
        }
        Ok(Self::normalize(raw))
    }

    /// Build a key from individual segments.
    ///
    /// Segments must be non-empty and must not contain the separator.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, KeyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut repr = SEPARATOR.to_string();
        for segment in segments {
            let segment = segment.as_ref();
            if segment.is_empty() || segment.contains(SEPARATOR) {
                return Err(KeyError::Format {
                    key: segment.to_string(),
                    reason: "segments must be non-empty and must not contain '/'".into(),
                });
            }
            repr.push_str(segment);
            repr.push(SEPARATOR);
        }
        Ok(Self(repr))
    }

    /// Normalize a key written by older producers, which could leave `./`
    /// fragments in the stored keys.
    pub fn from_legacy(raw: &str) -> Self {
        Self::normalize(&raw.replace("./", ""))
    }

    /// Split a full identifier `/k1/.../kN/name` into its key and object name.
    ///
    /// An identifier without any separator names a top-level object under the
    /// root key.
    pub fn split_full(full: &str) -> Result<(Self, String), KeyError> {
        if !full.contains(SEPARATOR) {
            if full.is_empty() {
                return Err(KeyError::Format {
                    key: full.to_string(),
                    reason: "empty identifier".into(),
                });
            }
            return Ok((Self::root(), full.to_string()));
        }
        if !full.starts_with(SEPARATOR) {
            return Err(KeyError::Format {
                key: full.to_string(),
                reason: "should start with '/'".into(),
            });
        }
        let split = full.rfind(SEPARATOR).unwrap_or(0);
        let name = &full[split + 1..];
        if name.is_empty() {
            return Err(KeyError::Format {
                key: full.to_string(),
                reason: "missing object name after the last '/'".into(),
            });
        }
        Ok((Self::normalize(&full[..split]), name.to_string()))
    }

    /// The rendered key, e.g. `/a/b/`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Returns `true` for the root key `/`.
    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// The `index`-th segment. `-1` denotes the last segment.
    pub fn segment(&self, index: isize) -> Result<&str, KeyError> {
        let count = self.depth();
        let resolved = match index {
            LAST if count > 0 => Some(count - 1),
            i if i >= 0 && (i as usize) < count => Some(i as usize),
            _ => None,
        };
        resolved
            .and_then(|i| self.segments().nth(i))
            .ok_or_else(|| KeyError::Index {
                key: self.0.clone(),
                index,
                count,
            })
    }

    /// All segments except the last. The parent of the root key is the root.
    pub fn parent(&self) -> Self {
        let trimmed = &self.0[..self.0.len() - 1];
        match trimmed.rfind(SEPARATOR) {
            Some(pos) => Self(self.0[..=pos].to_string()),
            None => Self::root(),
        }
    }

    /// Concatenate a relative key onto this one.
    pub fn join(&self, relative: &PathKey) -> Self {
        Self(format!("{}{}", self.0, &relative.0[1..]))
    }

    /// Render the full identifier of an object named `name` under this key.
    pub fn full_identifier(&self, name: &str) -> String {
        format!("{}{}", self.0, name)
    }

    /// String-prefix test on the rendered key, as used by pruning.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Returns `true` if `ancestor` equals this key or is one of its ancestors.
    pub fn is_under(&self, ancestor: &PathKey) -> bool {
        self.0.starts_with(&ancestor.0)
    }

    /// Strip a segment-aligned prefix, returning the remaining relative key.
    pub fn strip_prefix(&self, prefix: &PathKey) -> Option<Self> {
        self.0
            .strip_prefix(&prefix.0)
            .map(Self::normalize)
    }
}

impl Default for PathKey {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Debug for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathKey({})", self.0)
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PathKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PathKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PathKey> for String {
    fn from(key: PathKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // -----------------------------------------------------------------------
    // Normalization
    // -----------------------------------------------------------------------

    #[test]
    fn normalize_adds_separators() {
        assert_eq!(PathKey::normalize("a/b").as_str(), "/a/b/");
        assert_eq!(PathKey::normalize("a").as_str(), "/a/");
    }

    #[test]
    fn normalize_collapses_repeated_separators() {
        assert_eq!(PathKey::normalize("//a///b//").as_str(), "/a/b/");
    }

    #[test]
    fn normalize_empty_is_root() {
        let key = PathKey::normalize("");
        assert!(key.is_root());
        assert_eq!(key.depth(), 0);
        assert_eq!(key.to_string(), "/");
    }

    #[test]
    fn parse_rejects_unprefixed_key() {
        let err = PathKey::parse("a/b/").unwrap_err();
        assert!(matches!(err, KeyError::Format { .. }));
        assert!(PathKey::parse("/a/b").is_ok());
        assert!(PathKey::parse("").unwrap().is_root());
    }

    #[test]
    fn from_segments_validates() {
        let key = PathKey::from_segments(["A", "B"]).unwrap();
        assert_eq!(key.as_str(), "/A/B/");
        assert!(PathKey::from_segments(["A", ""]).is_err());
        assert!(PathKey::from_segments(["A/B"]).is_err());
    }

    #[test]
    fn legacy_keys_drop_dot_slash() {
        assert_eq!(PathKey::from_legacy("./DIGITS/./h/").as_str(), "/DIGITS/h/");
    }

    // -----------------------------------------------------------------------
    // Slicing
    // -----------------------------------------------------------------------

    #[test]
    fn segment_by_index() {
        let key = PathKey::normalize("/a/b/c/");
        assert_eq!(key.segment(0).unwrap(), "a");
        assert_eq!(key.segment(2).unwrap(), "c");
        assert_eq!(key.segment(LAST).unwrap(), "c");
    }

    #[test]
    fn segment_out_of_range() {
        let key = PathKey::normalize("/a/b/");
        assert!(matches!(key.segment(2), Err(KeyError::Index { count: 2, .. })));
        assert!(matches!(key.segment(-2), Err(KeyError::Index { .. })));
        assert!(PathKey::root().segment(LAST).is_err());
    }

    #[test]
    fn parent_drops_last_segment() {
        assert_eq!(PathKey::normalize("/a/b/c/").parent().as_str(), "/a/b/");
        assert_eq!(PathKey::normalize("/a/").parent(), PathKey::root());
        assert_eq!(PathKey::root().parent(), PathKey::root());
    }

    #[test]
    fn split_full_identifier() {
        let (key, name) = PathKey::split_full("/DIGITS/ChargePerTimeBin").unwrap();
        assert_eq!(key.as_str(), "/DIGITS/");
        assert_eq!(name, "ChargePerTimeBin");

        let (key, name) = PathKey::split_full("/h1").unwrap();
        assert!(key.is_root());
        assert_eq!(name, "h1");

        let (key, name) = PathKey::split_full("h1").unwrap();
        assert!(key.is_root());
        assert_eq!(name, "h1");
    }

    #[test]
    fn split_full_rejects_malformed() {
        assert!(matches!(
            PathKey::split_full("DIGITS/h1"),
            Err(KeyError::Format { .. })
        ));
        assert!(PathKey::split_full("/DIGITS/").is_err());
        assert!(PathKey::split_full("").is_err());
    }

    #[test]
    fn join_and_strip() {
        let base = PathKey::normalize("/SUB/");
        let rel = PathKey::normalize("/x/y/");
        let joined = base.join(&rel);
        assert_eq!(joined.as_str(), "/SUB/x/y/");
        assert_eq!(joined.strip_prefix(&base).unwrap(), rel);
        assert_eq!(base.strip_prefix(&base).unwrap(), PathKey::root());
        assert!(rel.strip_prefix(&base).is_none());
        assert_eq!(base.join(&PathKey::root()), base);
    }

    #[test]
    fn ordering_follows_rendered_string() {
        let a = PathKey::normalize("/a/");
        let ab = PathKey::normalize("/a-b/");
        // '-' sorts before '/' in byte order.
        assert!(ab < a);
    }

    #[test]
    fn serde_uses_rendered_form() {
        let key = PathKey::normalize("/a/b/");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"/a/b/\"");
        let back: PathKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<PathKey>("\"a/b\"").is_err());
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    proptest! {
        #[test]
        fn normalize_is_idempotent(raw in "[a-z/]{0,24}") {
            let once = PathKey::normalize(&raw);
            let twice = PathKey::normalize(once.as_str());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn equality_is_segment_equality(segs in proptest::collection::vec("[a-z]{1,4}", 0..5)) {
            let from_segments = PathKey::from_segments(&segs).unwrap();
            let from_raw = PathKey::normalize(&segs.join("//"));
            prop_assert_eq!(from_segments.depth(), segs.len());
            prop_assert_eq!(from_segments, from_raw);
        }
    }
}
