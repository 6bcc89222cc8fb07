use std::sync::Arc;

use bson::Document;
use tracing::warn;

use crate::query::{CustomPredicate, FieldCondition, FieldMap, LogicalNode, Query};

/// Fluent assembly of a [`Query`].
///
/// Mirrors what a hand-written query object would look like: `where_field`
/// adds field-map entries while `and` / `or` / `custom` turn the result into
/// a logical node. Like the object form, a query that has both keeps only the
/// logical part.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    fields: FieldMap,
    logical: Option<LogicalNode>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_field(
        mut self,
        path: impl Into<String>,
        condition: impl Into<FieldCondition>,
    ) -> Self {
        self.fields.insert(path, condition);
        self
    }

    pub fn and<I, Q>(mut self, queries: I) -> Self
    where
        I: IntoIterator<Item = Q>,
        Q: Into<Arc<Query>>,
    {
        self.logical.get_or_insert_with(LogicalNode::default).and =
            queries.into_iter().map(Into::into).collect();
        self
    }

    pub fn or<I, Q>(mut self, queries: I) -> Self
    where
        I: IntoIterator<Item = Q>,
        Q: Into<Arc<Query>>,
    {
        self.logical.get_or_insert_with(LogicalNode::default).or =
            queries.into_iter().map(Into::into).collect();
        self
    }

    pub fn custom<F>(mut self, f: F) -> Self
    where
        F: Fn(&Document) -> bool + Send + Sync + 'static,
    {
        self.logical.get_or_insert_with(LogicalNode::default).custom =
            Some(CustomPredicate::new(f));
        self
    }

    pub fn build(self) -> Arc<Query> {
        match self.logical {
            Some(node) => {
                if !self.fields.is_empty() {
                    warn!(
                        ignored = self.fields.len(),
                        "query mixes logical and field keys; field keys are ignored"
                    );
                }
                Arc::new(Query::Logical(node))
            }
            None => Arc::new(Query::Fields(self.fields)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::Operator;

    #[test]
    fn where_field_builds_field_map() {
        let query = QueryBuilder::new()
            .where_field("age", Operator::Gte(25.into()))
            .where_field("name", "Alice")
            .build();
        match &*query {
            Query::Fields(fields) => assert_eq!(fields.len(), 2),
            other => panic!("expected Fields, got {other:?}"),
        }
    }

    #[test]
    fn logical_parts_win_over_fields() {
        let query = QueryBuilder::new()
            .where_field("age", 30)
            .or([Query::all()])
            .custom(|_| true)
            .build();
        match &*query {
            Query::Logical(node) => {
                assert_eq!(node.or.len(), 1);
                assert!(node.and.is_empty());
                assert!(node.custom.is_some());
            }
            other => panic!("expected Logical, got {other:?}"),
        }
    }

    #[test]
    fn and_accepts_shared_sub_queries() {
        let shared = QueryBuilder::new().where_field("a", 1).build();
        let query = QueryBuilder::new()
            .and([Arc::clone(&shared), Arc::clone(&shared)])
            .build();
        match &*query {
            Query::Logical(node) => assert!(Arc::ptr_eq(&node.and[0], &shared)),
            other => panic!("expected Logical, got {other:?}"),
        }
    }
}
