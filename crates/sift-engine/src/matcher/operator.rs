use std::cmp::Ordering;

use bson::Bson;
use regex::Regex;

use crate::compare::{compare_values, contains, values_eq};
use crate::path::Node;

use super::Matcher;

/// A compiled field condition, evaluated against one resolved value
/// (`None` when the path is absent).
#[derive(Debug)]
pub(crate) enum Condition {
    Literal(Bson),
    /// All operators must accept. Empty accepts everything.
    Ops(Vec<Op>),
}

#[derive(Debug)]
pub(crate) enum Op {
    Eq(Bson),
    Ne(Bson),
    Compare {
        operand: Bson,
        accept: fn(Ordering) -> bool,
    },
    In(Vec<Bson>),
    Nin(Vec<Bson>),
    Exists(bool),
    Regex(Regex),
    Not(Box<Condition>),
    All(Vec<Bson>),
    Some(Vec<Bson>),
    Size(usize),
    ElemMatch(Matcher),
    /// Unknown operator tag: fail closed.
    Never,
}

impl Condition {
    pub(crate) fn test(&self, value: Option<&Bson>) -> bool {
        match self {
            Condition::Literal(expected) => value.is_some_and(|v| values_eq(v, expected)),
            Condition::Ops(ops) => ops.iter().all(|op| op.test(value)),
        }
    }
}

impl Op {
    fn test(&self, value: Option<&Bson>) -> bool {
        match self {
            Op::Eq(expected) => value.is_some_and(|v| values_eq(v, expected)),
            Op::Ne(expected) => !value.is_some_and(|v| values_eq(v, expected)),
            Op::Compare { operand, accept } => value
                .and_then(|v| compare_values(v, operand))
                .is_some_and(accept),
            Op::In(set) => value.is_some_and(|v| member_of(set, v)),
            Op::Nin(set) => !value.is_some_and(|v| member_of(set, v)),
            Op::Exists(expected) => value.is_some() == *expected,
            Op::Regex(re) => matches!(value, Some(Bson::String(s)) if re.is_match(s)),
            Op::Not(inner) => !inner.test(value),
            Op::All(set) => {
                array(value).is_some_and(|items| set.iter().all(|entry| contains(items, entry)))
            }
            Op::Some(set) => {
                array(value).is_some_and(|items| items.iter().any(|item| contains(set, item)))
            }
            Op::Size(n) => array(value).is_some_and(|items| items.len() == *n),
            Op::ElemMatch(matcher) => array(value).is_some_and(|items| {
                items
                    .iter()
                    .any(|item| matcher.matches_node(Node::Value(item)))
            }),
            Op::Never => false,
        }
    }
}

/// `$in` membership: the value itself, or any element of an array value.
fn member_of(set: &[Bson], value: &Bson) -> bool {
    if contains(set, value) {
        return true;
    }
    match value {
        Bson::Array(items) => items.iter().any(|item| contains(set, item)),
        _ => false,
    }
}

fn array(value: Option<&Bson>) -> Option<&[Bson]> {
    match value {
        Some(Bson::Array(items)) => Some(items.as_slice()),
        _ => None,
    }
}
