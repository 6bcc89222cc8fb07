use std::sync::Arc;

use bson::{Bson, Document};
use tracing::warn;

use crate::error::QueryParseError;
use crate::operator::Operator;
use crate::query::{FieldCondition, FieldMap, LogicalNode, Query};

/// Parse a bson query document into a [`Query`].
///
/// Follows the query grammar of the engine:
/// - `{ "field": value }` is implicit `$eq`
/// - `{ "field": { "$gt": v } }` uses operator sub-documents
/// - `{ "$and": [...] }` / `{ "$or": [...] }` make a logical node
/// - entries of a field map are implicitly conjoined
///
/// An object carrying `$and` or `$or` is a logical node; any ordinary field
/// keys next to them are parsed (so malformed ones still error) and then
/// ignored. Unknown operator tags inside an operator document are kept as
/// [`Operator::Unknown`] and never match.
pub fn parse_query(doc: &Document) -> Result<Query, QueryParseError> {
    let mut logical = LogicalNode::default();
    let mut is_logical = false;
    let mut fields = FieldMap::new();

    for (key, value) in doc {
        match key.as_str() {
            "$and" => {
                logical.and = parse_logical_array(key, value)?;
                is_logical = true;
            }
            "$or" => {
                logical.or = parse_logical_array(key, value)?;
                is_logical = true;
            }
            "$where" => {
                return Err(QueryParseError::new(
                    "$where cannot be deserialized; attach a custom predicate with QueryBuilder::custom",
                ));
            }
            k if k.starts_with('$') => {
                return Err(QueryParseError(format!("unknown top-level operator: {k}")));
            }
            _ => fields.insert(key.clone(), parse_field_condition(value)?),
        }
    }

    if is_logical {
        if !fields.is_empty() {
            warn!(
                ignored = fields.len(),
                "query mixes logical and field keys; field keys are ignored"
            );
        }
        return Ok(Query::Logical(logical));
    }
    Ok(Query::Fields(fields))
}

/// Parse a `$and` or `$or` array value. An empty array is allowed and is
/// vacuously true at evaluation time.
fn parse_logical_array(key: &str, value: &Bson) -> Result<Vec<Arc<Query>>, QueryParseError> {
    let arr = match value {
        Bson::Array(a) => a,
        _ => return Err(QueryParseError(format!("{key} value must be an array"))),
    };

    let mut children = Vec::with_capacity(arr.len());
    for elem in arr {
        match elem {
            Bson::Document(sub_doc) => children.push(Arc::new(parse_query(sub_doc)?)),
            _ => {
                return Err(QueryParseError(format!(
                    "{key} array elements must be documents"
                )));
            }
        }
    }
    Ok(children)
}

/// Parse a field condition: either implicit $eq or an operator sub-document.
pub fn parse_field_condition(value: &Bson) -> Result<FieldCondition, QueryParseError> {
    // If value is a document whose first key starts with $, it's an operator doc
    if let Bson::Document(sub_doc) = value {
        if let Some(first_key) = sub_doc.keys().next() {
            if first_key.starts_with('$') {
                return parse_operator_doc(sub_doc).map(FieldCondition::Operators);
            }
        }
    }

    Ok(FieldCondition::Literal(value.clone()))
}

/// Parse an operator sub-document like `{ "$gt": 21, "$lte": 100 }`.
fn parse_operator_doc(doc: &Document) -> Result<Vec<Operator>, QueryParseError> {
    let mut ops = Vec::with_capacity(doc.len());

    for (op_key, op_value) in doc {
        let op = match op_key.as_str() {
            "$eq" => Operator::Eq(op_value.clone()),
            "$ne" => Operator::Ne(op_value.clone()),
            "$gt" => Operator::Gt(op_value.clone()),
            "$gte" => Operator::Gte(op_value.clone()),
            "$lt" => Operator::Lt(op_value.clone()),
            "$lte" => Operator::Lte(op_value.clone()),
            "$in" => Operator::In(expect_array(op_key, op_value)?),
            "$nin" => Operator::Nin(expect_array(op_key, op_value)?),
            "$all" => Operator::All(expect_array(op_key, op_value)?),
            "$some" | "$hasSome" => Operator::Some(expect_array(op_key, op_value)?),
            "$exists" => match op_value {
                Bson::Boolean(b) => Operator::Exists(*b),
                _ => return Err(QueryParseError::new("$exists value must be a boolean")),
            },
            "$size" => Operator::Size(parse_size(op_value)?),
            "$not" => Operator::Not(Box::new(parse_field_condition(op_value)?)),
            "$elemMatch" => match op_value {
                Bson::Document(sub_doc) => Operator::ElemMatch(Arc::new(parse_query(sub_doc)?)),
                _ => return Err(QueryParseError::new("$elemMatch value must be a document")),
            },
            "$regex" => parse_regex(op_value, doc.get("$options"))?,
            "$options" => {
                if !doc.contains_key("$regex") {
                    return Err(QueryParseError::new("$options without $regex"));
                }
                // consumed by $regex
                continue;
            }
            other => Operator::Unknown(other.to_string()),
        };
        ops.push(op);
    }

    Ok(ops)
}

fn expect_array(key: &str, value: &Bson) -> Result<Vec<Bson>, QueryParseError> {
    match value {
        Bson::Array(items) => Ok(items.clone()),
        _ => Err(QueryParseError(format!("{key} value must be an array"))),
    }
}

fn parse_size(value: &Bson) -> Result<usize, QueryParseError> {
    let n = match value {
        Bson::Int32(n) => i64::from(*n),
        Bson::Int64(n) => *n,
        Bson::Double(f) if f.fract() == 0.0 => *f as i64,
        _ => return Err(QueryParseError::new("$size value must be an integer")),
    };
    usize::try_from(n).map_err(|_| QueryParseError::new("$size value must not be negative"))
}

/// Parse a `$regex` operand plus its optional `$options` sibling.
///
/// Accepts a string pattern or a bson regular expression literal; an explicit
/// `$options` string takes precedence over the literal's own flags.
fn parse_regex(value: &Bson, options: Option<&Bson>) -> Result<Operator, QueryParseError> {
    let explicit = match options {
        None => None,
        Some(Bson::String(s)) => Some(s.clone()),
        Some(_) => return Err(QueryParseError::new("$options value must be a string")),
    };

    match value {
        Bson::String(pattern) => Ok(Operator::Regex {
            pattern: pattern.clone(),
            options: explicit.unwrap_or_default(),
        }),
        Bson::RegularExpression(re) => Ok(Operator::Regex {
            pattern: re.pattern.clone(),
            options: explicit.unwrap_or_else(|| re.options.clone()),
        }),
        _ => Err(QueryParseError::new(
            "$regex value must be a string or regular expression",
        )),
    }
}
