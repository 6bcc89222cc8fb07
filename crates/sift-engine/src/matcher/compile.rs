use std::cmp::Ordering;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use sift_query::{FieldCondition, FieldMap, LogicalNode, Operator, Query};
use tracing::{debug, trace, warn};

use crate::cache::MatcherCache;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::path::Path;

use super::operator::{Condition, Op};
use super::{Compiled, FieldTest, Matcher};

/// Turns queries into [`Matcher`]s, going through the cache (when there is
/// one) for the root query and every nested `Arc<Query>`.
pub(crate) struct Compiler<'e> {
    config: &'e EngineConfig,
    cache: Option<&'e MatcherCache>,
}

impl<'e> Compiler<'e> {
    pub(crate) fn new(config: &'e EngineConfig, cache: Option<&'e MatcherCache>) -> Self {
        Self { config, cache }
    }

    pub(crate) fn compile(&self, query: &Arc<Query>) -> Result<Matcher, EngineError> {
        if let Some(hit) = self.cache.and_then(|cache| cache.get(query)) {
            trace!("matcher cache hit");
            return Ok(hit);
        }

        // The cache lock is not held here; nested queries re-enter it.
        let matcher = Matcher::new(self.build(query)?);
        Ok(match self.cache {
            Some(cache) => cache.insert(query, matcher),
            None => matcher,
        })
    }

    fn build(&self, query: &Query) -> Result<Compiled, EngineError> {
        match query {
            Query::Logical(node) => self.build_logical(node),
            Query::Fields(fields) => self.build_fields(fields),
        }
    }

    fn build_logical(&self, node: &LogicalNode) -> Result<Compiled, EngineError> {
        let and = node
            .and
            .iter()
            .map(|q| self.compile(q))
            .collect::<Result<Vec<_>, _>>()?;
        let or = node
            .or
            .iter()
            .map(|q| self.compile(q))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            and = and.len(),
            or = or.len(),
            custom = node.custom.is_some(),
            "compiled logical query"
        );
        Ok(Compiled::Logical {
            and,
            or,
            custom: node.custom.clone(),
        })
    }

    fn build_fields(&self, fields: &FieldMap) -> Result<Compiled, EngineError> {
        let tests = fields
            .iter()
            .map(|(raw, condition)| {
                let path = Path::parse(raw).map_err(|e| EngineError::path(raw, e))?;
                let condition = self.condition(raw, condition)?;
                Ok(FieldTest { path, condition })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;
        debug!(fields = tests.len(), "compiled field query");
        Ok(Compiled::Fields(tests))
    }

    fn condition(&self, path: &str, condition: &FieldCondition) -> Result<Condition, EngineError> {
        match condition {
            FieldCondition::Literal(value) => Ok(Condition::Literal(value.clone())),
            FieldCondition::Operators(ops) => ops
                .iter()
                .map(|op| self.operator(path, op))
                .collect::<Result<Vec<_>, _>>()
                .map(Condition::Ops),
        }
    }

    fn operator(&self, path: &str, op: &Operator) -> Result<Op, EngineError> {
        Ok(match op {
            Operator::Eq(v) => Op::Eq(v.clone()),
            Operator::Ne(v) => Op::Ne(v.clone()),
            Operator::Gt(v) => compare(v, Ordering::is_gt),
            Operator::Gte(v) => compare(v, Ordering::is_ge),
            Operator::Lt(v) => compare(v, Ordering::is_lt),
            Operator::Lte(v) => compare(v, Ordering::is_le),
            Operator::In(set) => Op::In(set.clone()),
            Operator::Nin(set) => Op::Nin(set.clone()),
            Operator::Exists(b) => Op::Exists(*b),
            Operator::Regex { pattern, options } => Op::Regex(self.regex(pattern, options)?),
            Operator::Not(inner) => Op::Not(Box::new(self.condition(path, inner)?)),
            Operator::All(set) => Op::All(set.clone()),
            Operator::Some(set) => Op::Some(set.clone()),
            Operator::Size(n) => Op::Size(*n),
            Operator::ElemMatch(query) => Op::ElemMatch(self.compile(query)?),
            Operator::Unknown(tag) => {
                warn!(path, tag = tag.as_str(), "unknown operator never matches");
                Op::Never
            }
        })
    }

    fn regex(&self, pattern: &str, options: &str) -> Result<Regex, EngineError> {
        let mut builder = RegexBuilder::new(pattern);
        builder.size_limit(self.config.regex_size_limit);
        for flag in options.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                // Global and unicode flags have no effect on a single test.
                'g' | 'u' => &mut builder,
                other => {
                    return Err(EngineError::InvalidQuery(format!(
                        "unsupported regex flag {other:?} for pattern {pattern:?}"
                    )));
                }
            };
        }
        builder.build().map_err(|source| EngineError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })
    }
}

fn compare(operand: &bson::Bson, accept: fn(Ordering) -> bool) -> Op {
    Op::Compare {
        operand: operand.clone(),
        accept,
    }
}
