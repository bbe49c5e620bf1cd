//! Selection patterns.
//!
//! A pattern reads `/seg1/.../segK/object[:class]`. Every part is a
//! comma-separated alternation. In glob mode each alternative may use `*`
//! (any sequence) and `?` (any one character); in exact mode alternatives
//! are compared literally. Alternatives are anchored: `a*` matches `abc`
//! but not `xabc`.
//!
//! A pattern with K path segments only ever matches keys of depth K. A
//! pattern without any `/` is an object pattern alone and applies at every
//! key.

use accum_types::{Artifact, PathKey, SEPARATOR};
use regex::Regex;

use crate::error::{QueryError, QueryResult};

/// Object pattern that suppresses artifact names in reports.
pub const HIDE_NAMES: &str = "-";

/// Pattern that matches everything.
pub const ANY: &str = "*";

/// How alternatives are compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchMode {
    Glob,
    Exact,
}

/// A compiled comma-separated alternation.
#[derive(Clone, Debug)]
pub struct Alternation {
    source: String,
    regex: Regex,
}

impl Alternation {
    pub fn compile(source: &str, mode: MatchMode) -> QueryResult<Self> {
        let branches: Vec<String> = source
            .split(',')
            .map(|alt| match mode {
                MatchMode::Glob => glob_to_regex(alt),
                MatchMode::Exact => regex::escape(alt),
            })
            .collect();
        let anchored = format!("^(?:{})$", branches.join("|"));
        let regex = Regex::new(&anchored).map_err(|e| QueryError::InvalidPattern {
            pattern: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() + 8);
    let mut buf = [0; 4];
    for c in glob.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            c => out.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }
    out
}

/// What the object part of a pattern selects.
#[derive(Clone, Debug)]
pub enum ObjectPattern {
    /// `*`: every artifact.
    Any,
    /// `-`: no artifact; only keys are of interest.
    Hidden,
    Names(Alternation),
}

/// A parsed `/seg1/.../segK/object[:class]` pattern.
#[derive(Clone, Debug)]
pub struct SelectPattern {
    source: String,
    /// `None` for an object-only pattern.
    segments: Option<Vec<Alternation>>,
    object: ObjectPattern,
    class: Option<Alternation>,
}

impl SelectPattern {
    /// Parse a glob pattern with an optional `:class` suffix.
    pub fn parse(pattern: &str) -> QueryResult<Self> {
        let (path, class) = match pattern.split_once(':') {
            Some((path, class)) => (path, Some(Alternation::compile(class, MatchMode::Glob)?)),
            None => (pattern, None),
        };
        Self::build(pattern, path, class, MatchMode::Glob)
    }

    /// Parse an exact alternation pattern, as used for summation. No class
    /// suffix is recognized.
    pub fn parse_exact(pattern: &str) -> QueryResult<Self> {
        Self::build(pattern, pattern, None, MatchMode::Exact)
    }

    fn build(
        source: &str,
        path: &str,
        class: Option<Alternation>,
        mode: MatchMode,
    ) -> QueryResult<Self> {
        let invalid = |reason: &str| QueryError::InvalidPattern {
            pattern: source.to_string(),
            reason: reason.to_string(),
        };

        if !path.contains(SEPARATOR) {
            if path.is_empty() {
                return Err(invalid("empty object pattern"));
            }
            return Ok(Self {
                source: source.to_string(),
                segments: None,
                object: object_pattern(path, mode)?,
                class,
            });
        }
        if !path.starts_with(SEPARATOR) {
            return Err(invalid("should start with '/'"));
        }

        let mut parts: Vec<&str> = path.split(SEPARATOR).filter(|s| !s.is_empty()).collect();
        let Some(object) = parts.pop() else {
            return Err(invalid("missing object pattern"));
        };
        let segments = parts
            .into_iter()
            .map(|seg| Alternation::compile(seg, mode))
            .collect::<QueryResult<Vec<_>>>()?;

        Ok(Self {
            source: source.to_string(),
            segments: Some(segments),
            object: object_pattern(object, mode)?,
            class,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn object(&self) -> &ObjectPattern {
        &self.object
    }

    pub fn has_class_filter(&self) -> bool {
        self.class.is_some()
    }

    /// Number of path segments, `None` for an object-only pattern.
    pub fn depth(&self) -> Option<usize> {
        self.segments.as_ref().map(Vec::len)
    }

    /// Whether `key` satisfies the path part: same depth, every segment
    /// matching positionally.
    pub fn matches_key(&self, key: &PathKey) -> bool {
        let Some(segments) = &self.segments else {
            return true;
        };
        key.depth() == segments.len()
            && key
                .segments()
                .zip(segments)
                .all(|(segment, alt)| alt.is_match(segment))
    }

    /// Whether `artifact` satisfies the object and class parts.
    pub fn matches_artifact(&self, artifact: &Artifact) -> bool {
        let name_ok = match &self.object {
            ObjectPattern::Any => true,
            ObjectPattern::Hidden => false,
            ObjectPattern::Names(alt) => alt.is_match(artifact.name()),
        };
        name_ok
            && self
                .class
                .as_ref()
                .map_or(true, |alt| alt.is_match(&artifact.class_tag()))
    }
}

fn object_pattern(object: &str, mode: MatchMode) -> QueryResult<ObjectPattern> {
    Ok(match (object, mode) {
        (ANY, MatchMode::Glob) => ObjectPattern::Any,
        (HIDE_NAMES, MatchMode::Glob) => ObjectPattern::Hidden,
        _ => ObjectPattern::Names(Alternation::compile(object, mode)?),
    })
}
