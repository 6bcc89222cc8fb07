use std::sync::Arc;

use bson::Bson;

use crate::query::{FieldCondition, Query};

/// Field operators. Closed set: evaluation matches exhaustively.
#[derive(Debug, Clone)]
pub enum Operator {
    Eq(Bson),
    Ne(Bson),
    Gt(Bson),
    Gte(Bson),
    Lt(Bson),
    Lte(Bson),
    In(Vec<Bson>),
    Nin(Vec<Bson>),
    Exists(bool),
    /// Pattern plus flag letters (`i`, `m`, `s`, `x`). Compiled by the engine.
    Regex {
        pattern: String,
        options: String,
    },
    Not(Box<FieldCondition>),
    All(Vec<Bson>),
    Some(Vec<Bson>),
    Size(usize),
    ElemMatch(Arc<Query>),
    /// A tag the bson boundary did not recognise. Never matches.
    Unknown(String),
}

impl Operator {
    /// The `$`-prefixed tag this operator is spelled with in query documents.
    pub fn tag(&self) -> &str {
        match self {
            Operator::Eq(_) => "$eq",
            Operator::Ne(_) => "$ne",
            Operator::Gt(_) => "$gt",
            Operator::Gte(_) => "$gte",
            Operator::Lt(_) => "$lt",
            Operator::Lte(_) => "$lte",
            Operator::In(_) => "$in",
            Operator::Nin(_) => "$nin",
            Operator::Exists(_) => "$exists",
            Operator::Regex { .. } => "$regex",
            Operator::Not(_) => "$not",
            Operator::All(_) => "$all",
            Operator::Some(_) => "$some",
            Operator::Size(_) => "$size",
            Operator::ElemMatch(_) => "$elemMatch",
            Operator::Unknown(tag) => tag,
        }
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Operator::Regex {
            pattern: pattern.into(),
            options: String::new(),
        }
    }

    pub fn not(condition: impl Into<FieldCondition>) -> Self {
        Operator::Not(Box::new(condition.into()))
    }

    pub fn elem_match(query: impl Into<Arc<Query>>) -> Self {
        Operator::ElemMatch(query.into())
    }
}
