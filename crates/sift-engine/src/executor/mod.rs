mod nodes;

use bson::{Bson, Document};

use crate::config::EngineConfig;
use crate::planner::Plan;

/// Borrowed documents flowing between nodes. `'p` is the plan borrow,
/// `'a` the document source.
pub(crate) type DocIter<'p, 'a> = Box<dyn Iterator<Item = &'a Document> + 'p>;

/// Runs a [`Plan`] over a borrowed document source.
pub(crate) struct Executor<'e> {
    config: &'e EngineConfig,
}

impl<'e> Executor<'e> {
    pub(crate) fn new(config: &'e EngineConfig) -> Self {
        Self { config }
    }

    /// Execute a plan, yielding output values. A projection stage, when
    /// present, must be the root of the plan.
    pub(crate) fn execute<'p, 'a: 'p>(&self, plan: &'p Plan, docs: DocIter<'p, 'a>) -> Vec<Bson> {
        match plan {
            Plan::Projection { projector, source } => {
                let source = self.execute_node(source, docs);
                nodes::projection::execute(projector, source).collect()
            }
            _ => self
                .execute_node(plan, docs)
                .map(|doc| Bson::Document(doc.clone()))
                .collect(),
        }
    }

    /// Execute the document-preserving part of a plan.
    pub(crate) fn execute_node<'p, 'a: 'p>(
        &self,
        plan: &'p Plan,
        docs: DocIter<'p, 'a>,
    ) -> DocIter<'p, 'a> {
        match plan {
            Plan::Scan => docs,
            Plan::Filter { matcher, source } => {
                let source = self.execute_node(source, docs);
                nodes::filter::execute(matcher, source)
            }
            Plan::Sort { keys, source } => {
                let source = self.execute_node(source, docs);
                nodes::sort::execute(keys, self.config.string_ordering, source)
            }
            Plan::Limit { take, source } => {
                let source = self.execute_node(source, docs);
                nodes::limit::execute(*take, source)
            }
            // Projection changes the item type; only valid at the root.
            Plan::Projection { source, .. } => self.execute_node(source, docs),
        }
    }
}
