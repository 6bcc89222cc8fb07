use std::fmt;
use std::sync::Arc;

use bson::{Bson, Document};

use crate::operator::Operator;

/// A user-supplied predicate attached to a [`LogicalNode`].
///
/// Cloning is cheap: the closure lives behind an `Arc` so compiled matchers
/// can hold it without keeping the owning query alive.
#[derive(Clone)]
pub struct CustomPredicate(Arc<dyn Fn(&Document) -> bool + Send + Sync>);

impl CustomPredicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Document) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, doc: &Document) -> bool {
        (self.0)(doc)
    }
}

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomPredicate(..)")
    }
}

/// A declarative description of which documents match.
///
/// Sub-queries are held as `Arc<Query>` so each one has an identity of its
/// own: the engine caches compiled matchers per instance, not per content.
#[derive(Debug, Clone)]
pub enum Query {
    Logical(LogicalNode),
    Fields(FieldMap),
}

impl Query {
    /// The identity filter: an empty field map.
    pub fn all() -> Self {
        Query::Fields(FieldMap::default())
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Query::Logical(_))
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::all()
    }
}

impl From<FieldMap> for Query {
    fn from(fields: FieldMap) -> Self {
        Query::Fields(fields)
    }
}

impl From<LogicalNode> for Query {
    fn from(node: LogicalNode) -> Self {
        Query::Logical(node)
    }
}

/// `$and` / `$or` / `$where` combinator. Empty groups are vacuously true.
#[derive(Debug, Clone, Default)]
pub struct LogicalNode {
    pub and: Vec<Arc<Query>>,
    pub or: Vec<Arc<Query>>,
    pub custom: Option<CustomPredicate>,
}

/// Path → condition entries, implicitly conjoined.
///
/// Entries keep insertion order; inserting a path twice replaces the earlier
/// condition, the way a plain object key would.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    entries: Vec<(String, FieldCondition)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, condition: impl Into<FieldCondition>) {
        let path = path.into();
        let condition = condition.into();
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some((_, existing)) => *existing = condition,
            None => self.entries.push((path, condition)),
        }
    }

    pub fn with(mut self, path: impl Into<String>, condition: impl Into<FieldCondition>) -> Self {
        self.insert(path, condition);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldCondition)> {
        self.entries.iter().map(|(p, c)| (p.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The per-field test: a literal (implicit `$eq`) or an operator map.
#[derive(Debug, Clone)]
pub enum FieldCondition {
    Literal(Bson),
    /// Every operator must accept. An empty list accepts everything.
    Operators(Vec<Operator>),
}

impl From<Operator> for FieldCondition {
    fn from(op: Operator) -> Self {
        FieldCondition::Operators(vec![op])
    }
}

impl From<Vec<Operator>> for FieldCondition {
    fn from(ops: Vec<Operator>) -> Self {
        FieldCondition::Operators(ops)
    }
}

impl From<Bson> for FieldCondition {
    fn from(value: Bson) -> Self {
        FieldCondition::Literal(value)
    }
}

impl From<&str> for FieldCondition {
    fn from(value: &str) -> Self {
        FieldCondition::Literal(Bson::String(value.to_string()))
    }
}

impl From<String> for FieldCondition {
    fn from(value: String) -> Self {
        FieldCondition::Literal(Bson::String(value))
    }
}

impl From<i32> for FieldCondition {
    fn from(value: i32) -> Self {
        FieldCondition::Literal(Bson::Int32(value))
    }
}

impl From<i64> for FieldCondition {
    fn from(value: i64) -> Self {
        FieldCondition::Literal(Bson::Int64(value))
    }
}

impl From<f64> for FieldCondition {
    fn from(value: f64) -> Self {
        FieldCondition::Literal(Bson::Double(value))
    }
}

impl From<bool> for FieldCondition {
    fn from(value: bool) -> Self {
        FieldCondition::Literal(Bson::Boolean(value))
    }
}
