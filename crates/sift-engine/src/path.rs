//! Dotted / indexed / wildcard paths and their resolution.
//!
//! Resolution never fails: a missing field, a wrongly-typed intermediate or an
//! out-of-range index all yield `None`, and `None` propagates through the
//! remaining segments.

use std::fmt;

use bson::{Bson, Document};

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Named(String),
    Index(usize),
    Wildcard,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("unclosed '[' at byte {0}")]
    UnclosedBracket(usize),
    #[error("unexpected '{ch}' at byte {pos}")]
    UnexpectedBracket { ch: char, pos: usize },
    #[error("bracket segment must be '*' or a non-negative integer, got {0:?}")]
    InvalidIndex(String),
}

/// A parsed path. Keeps the source string for diagnostics and output keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    raw: String,
    segments: Vec<Segment>,
}

impl Path {
    /// Parse `a.b[0].c[*]` style paths.
    ///
    /// Splits on `.` outside brackets; empty parts are skipped.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut bracket_start: Option<usize> = None;
        let mut after_close = false;

        for (pos, ch) in raw.char_indices() {
            // A closed bracket must be followed by '.', '[' or the end.
            if after_close && !matches!(ch, '.' | '[') {
                return Err(PathError::UnexpectedBracket { ch, pos });
            }
            after_close = false;
            match (ch, bracket_start) {
                ('.', None) => flush_named(&mut current, &mut segments),
                ('[', None) => {
                    flush_named(&mut current, &mut segments);
                    bracket_start = Some(pos);
                }
                ('[', Some(_)) | (']', None) => {
                    return Err(PathError::UnexpectedBracket { ch, pos });
                }
                (']', Some(_)) => {
                    segments.push(bracket_segment(&current)?);
                    current.clear();
                    bracket_start = None;
                    after_close = true;
                }
                _ => current.push(ch),
            }
        }

        if let Some(pos) = bracket_start {
            return Err(PathError::UnclosedBracket(pos));
        }
        flush_named(&mut current, &mut segments);

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn flush_named(current: &mut String, segments: &mut Vec<Segment>) {
    if !current.is_empty() {
        segments.push(Segment::Named(std::mem::take(current)));
    }
}

fn bracket_segment(content: &str) -> Result<Segment, PathError> {
    if content == "*" {
        return Ok(Segment::Wildcard);
    }
    content
        .parse::<usize>()
        .map(Segment::Index)
        .map_err(|_| PathError::InvalidIndex(content.to_string()))
}

/// A resolution root: a whole document or a value inside one.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Document(&'a Document),
    Value(&'a Bson),
}

impl<'a> Node<'a> {
    /// The document behind this node, if it is one.
    pub fn as_document(self) -> Option<&'a Document> {
        match self {
            Node::Document(doc) => Some(doc),
            Node::Value(Bson::Document(doc)) => Some(doc),
            Node::Value(_) => None,
        }
    }

    /// The value behind this node. A bare root document has no `Bson` of its
    /// own and yields `None`.
    pub fn as_value(self) -> Option<&'a Bson> {
        match self {
            Node::Document(_) => None,
            Node::Value(v) => Some(v),
        }
    }

    /// Apply one segment.
    pub fn step(self, segment: &Segment) -> Option<&'a Bson> {
        match segment {
            Segment::Named(name) => self.as_document()?.get(name),
            Segment::Index(i) => match self.as_value()? {
                Bson::Array(items) => items.get(*i),
                _ => None,
            },
            Segment::Wildcard => match self.as_value()? {
                arr @ Bson::Array(_) => Some(arr),
                _ => None,
            },
        }
    }

    /// Fold every segment of `path` over this node. An empty path is absent.
    pub fn resolve(self, path: &Path) -> Option<&'a Bson> {
        let (first, rest) = path.segments.split_first()?;
        let mut current = self.step(first)?;
        for segment in rest {
            current = Node::Value(current).step(segment)?;
        }
        Some(current)
    }
}

/// Resolve `path` against a document.
pub fn resolve<'a>(doc: &'a Document, path: &Path) -> Option<&'a Bson> {
    Node::Document(doc).resolve(path)
}

/// Resolve `path` against an arbitrary value (e.g. an array element).
pub fn resolve_value<'a>(value: &'a Bson, path: &Path) -> Option<&'a Bson> {
    Node::Value(value).resolve(path)
}

/// Split on `.` outside brackets, dropping empty parts.
///
/// `a[0].b` → `["a[0]", "b"]`. Used to mirror a path's shape in
/// field-list projections.
pub fn split_dotted(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (pos, ch) in raw.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => {
                if pos > start {
                    parts.push(&raw[start..pos]);
                }
                start = pos + 1;
            }
            _ => {}
        }
    }
    if raw.len() > start {
        parts.push(&raw[start..]);
    }
    parts
}

/// Every key of `doc`, plus the dotted keys of nested (non-array) documents,
/// down to `depth` levels.
pub fn flat_keys(doc: &Document, depth: usize) -> Vec<String> {
    let mut keys = Vec::new();
    collect_flat_keys(doc, "", depth, &mut keys);
    keys
}

fn collect_flat_keys(doc: &Document, prefix: &str, depth: usize, out: &mut Vec<String>) {
    if depth == 0 {
        return;
    }
    for (key, value) in doc {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if let Bson::Document(sub) = value {
            out.push(full.clone());
            collect_flat_keys(sub, &full, depth - 1, out);
        } else {
            out.push(full);
        }
    }
}

#[cfg(test)]
mod tests {
    use bson::{bson, doc};

    use super::*;

    fn named(s: &str) -> Segment {
        Segment::Named(s.into())
    }

    #[test]
    fn parse_dotted() {
        let path = Path::parse("address.city").unwrap();
        assert_eq!(path.segments(), &[named("address"), named("city")]);
        assert_eq!(path.as_str(), "address.city");
    }

    #[test]
    fn parse_index_and_wildcard() {
        let path = Path::parse("posts[1].tags[*]").unwrap();
        assert_eq!(
            path.segments(),
            &[
                named("posts"),
                Segment::Index(1),
                named("tags"),
                Segment::Wildcard
            ]
        );
    }

    #[test]
    fn parse_skips_empty_parts() {
        let path = Path::parse(".a..b.").unwrap();
        assert_eq!(path.segments(), &[named("a"), named("b")]);
        assert!(Path::parse("").unwrap().is_empty());
    }

    #[test]
    fn parse_dot_inside_brackets_is_not_a_separator() {
        let err = Path::parse("a[1.5]").unwrap_err();
        assert_eq!(err, PathError::InvalidIndex("1.5".into()));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            Path::parse("a[0").unwrap_err(),
            PathError::UnclosedBracket(1)
        );
        assert_eq!(
            Path::parse("a]").unwrap_err(),
            PathError::UnexpectedBracket { ch: ']', pos: 1 }
        );
        assert_eq!(
            Path::parse("a[[0]]").unwrap_err(),
            PathError::UnexpectedBracket { ch: '[', pos: 2 }
        );
        assert_eq!(
            Path::parse("a[-1]").unwrap_err(),
            PathError::InvalidIndex("-1".into())
        );
        assert_eq!(
            Path::parse("a[0]b").unwrap_err(),
            PathError::UnexpectedBracket { ch: 'b', pos: 4 }
        );
        assert_eq!(
            Path::parse("a[0]]").unwrap_err(),
            PathError::UnexpectedBracket { ch: ']', pos: 4 }
        );
        assert!(Path::parse("a[0][1].b").is_ok());
    }

    #[test]
    fn resolve_nested() {
        let doc = doc! { "address": { "city": "Austin" } };
        let path = Path::parse("address.city").unwrap();
        assert_eq!(resolve(&doc, &path), Some(&Bson::String("Austin".into())));
    }

    #[test]
    fn resolve_missing_propagates() {
        let doc = doc! { "address": { "city": "Austin" } };
        for raw in ["missing.city", "address.zip", "address.city.more", "address[0]"] {
            let path = Path::parse(raw).unwrap();
            assert_eq!(resolve(&doc, &path), None, "{raw}");
        }
    }

    #[test]
    fn resolve_index() {
        let doc = doc! { "posts": [{ "title": "a" }, { "title": "b" }] };
        let path = Path::parse("posts[1].title").unwrap();
        assert_eq!(resolve(&doc, &path), Some(&Bson::String("b".into())));

        let out_of_range = Path::parse("posts[5].title").unwrap();
        assert_eq!(resolve(&doc, &out_of_range), None);
    }

    #[test]
    fn wildcard_returns_array_unchanged() {
        let doc = doc! { "tags": ["a", "b"], "name": "x" };
        let path = Path::parse("tags[*]").unwrap();
        assert_eq!(resolve(&doc, &path), Some(&bson!(["a", "b"])));

        let not_array = Path::parse("name[*]").unwrap();
        assert_eq!(resolve(&doc, &not_array), None);
    }

    #[test]
    fn wildcard_does_not_broadcast() {
        let doc = doc! { "posts": [{ "title": "a" }] };
        let path = Path::parse("posts[*].title").unwrap();
        assert_eq!(resolve(&doc, &path), None);
    }

    #[test]
    fn named_segment_on_array_is_absent() {
        let doc = doc! { "posts": [{ "title": "a" }] };
        let path = Path::parse("posts.title").unwrap();
        assert_eq!(resolve(&doc, &path), None);
    }

    #[test]
    fn empty_path_is_absent() {
        let doc = doc! { "a": 1 };
        assert_eq!(resolve(&doc, &Path::parse("").unwrap()), None);
    }

    #[test]
    fn resolve_value_on_element() {
        let elem = bson!({ "t": { "x": 1 } });
        let path = Path::parse("t.x").unwrap();
        assert_eq!(resolve_value(&elem, &path), Some(&Bson::Int32(1)));
        assert_eq!(resolve_value(&Bson::Int32(3), &path), None);
    }

    #[test]
    fn split_dotted_respects_brackets() {
        assert_eq!(split_dotted("a.b"), vec!["a", "b"]);
        assert_eq!(split_dotted("a[0].b"), vec!["a[0]", "b"]);
        assert_eq!(split_dotted("a..b."), vec!["a", "b"]);
        assert_eq!(split_dotted("name"), vec!["name"]);
    }

    #[test]
    fn flat_keys_descends_into_documents_only() {
        let doc = doc! {
            "name": "x",
            "address": { "city": "c", "geo": { "lat": 1, "deep": { "z": 1 } } },
            "tags": [{ "a": 1 }]
        };
        assert_eq!(
            flat_keys(&doc, 3),
            vec![
                "name",
                "address",
                "address.city",
                "address.geo",
                "address.geo.lat",
                "address.geo.deep",
                "tags",
            ]
        );
        assert!(flat_keys(&doc, 0).is_empty());
    }
}
