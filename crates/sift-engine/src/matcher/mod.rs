mod compile;
mod operator;

use std::fmt;
use std::sync::Arc;

use bson::{Bson, Document};
use sift_query::CustomPredicate;

use crate::path::{Node, Path, Segment};

pub(crate) use compile::Compiler;
use operator::Condition;

/// A compiled query. Cheap to clone, `Send + Sync`, and pure: the same
/// document always gets the same answer.
#[derive(Clone)]
pub struct Matcher(Arc<Compiled>);

pub(crate) enum Compiled {
    /// `(AND-group) AND (OR-group) AND (custom)`.
    Logical {
        and: Vec<Matcher>,
        or: Vec<Matcher>,
        custom: Option<CustomPredicate>,
    },
    /// Conjunction over every field test.
    Fields(Vec<FieldTest>),
}

pub(crate) struct FieldTest {
    path: Path,
    condition: Condition,
}

impl Matcher {
    pub(crate) fn new(compiled: Compiled) -> Self {
        Self(Arc::new(compiled))
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.matches_node(Node::Document(doc))
    }

    /// Evaluate against an arbitrary value, as `$elemMatch` does for each
    /// array element. Custom predicates reject non-document values.
    pub fn matches_value(&self, value: &Bson) -> bool {
        self.matches_node(Node::Value(value))
    }

    pub(crate) fn matches_node(&self, node: Node<'_>) -> bool {
        match &*self.0 {
            Compiled::Logical { and, or, custom } => {
                and.iter().all(|m| m.matches_node(node))
                    && (or.is_empty() || or.iter().any(|m| m.matches_node(node)))
                    && custom.as_ref().is_none_or(|f| match node.as_document() {
                        Some(doc) => f.call(doc),
                        None => false,
                    })
            }
            Compiled::Fields(tests) => tests
                .iter()
                .all(|t| quantify(Some(node), t.path.segments(), &t.condition)),
        }
    }

    /// Whether both handles share the same compiled query.
    pub fn ptr_eq(a: &Matcher, b: &Matcher) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            Compiled::Logical { and, or, custom } => f
                .debug_struct("Matcher::Logical")
                .field("and", &and.len())
                .field("or", &or.len())
                .field("custom", &custom.is_some())
                .finish(),
            Compiled::Fields(tests) => f
                .debug_list()
                .entries(tests.iter().map(|t| t.path.as_str()))
                .finish(),
        }
    }
}

/// Resolve `segments` from `node` and test the condition, descending into
/// arrays whenever a named segment meets one: the array satisfies the
/// condition if any element does for the same remaining path.
fn quantify(node: Option<Node<'_>>, segments: &[Segment], condition: &Condition) -> bool {
    let Some(node) = node else {
        return condition.test(None);
    };
    let Some((first, rest)) = segments.split_first() else {
        return condition.test(node.as_value());
    };
    if let (Segment::Named(_), Node::Value(Bson::Array(items))) = (first, node) {
        return items
            .iter()
            .any(|item| quantify(Some(Node::Value(item)), segments, condition));
    }
    quantify(node.step(first).map(Node::Value), rest, condition)
}
