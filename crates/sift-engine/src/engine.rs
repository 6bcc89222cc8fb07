use std::sync::Arc;

use bson::{Bson, Document};
use sift_query::{FindOptions, Query};
use tracing::debug;

use crate::cache::MatcherCache;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::executor::Executor;
use crate::matcher::{Compiler, Matcher};
use crate::planner::Planner;

/// Owns configuration and the matcher cache.
///
/// `Engine` is `Send + Sync`; share one across threads to share its cache.
pub struct Engine {
    config: EngineConfig,
    cache: MatcherCache,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            cache: MatcherCache::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn compiler(&self) -> Compiler<'_> {
        let cache = self.config.cache_matchers.then_some(&self.cache);
        Compiler::new(&self.config, cache)
    }

    /// Compile a query. Compiling the same `Arc<Query>` again returns the
    /// same matcher while the query is alive.
    pub fn compile(&self, query: &Arc<Query>) -> Result<Matcher, EngineError> {
        self.compiler().compile(query)
    }

    /// Keep the documents `query` accepts, in input order.
    pub fn filter<'a, I>(
        &self,
        docs: I,
        query: &Arc<Query>,
    ) -> Result<Vec<&'a Document>, EngineError>
    where
        I: IntoIterator<Item = &'a Document>,
        I::IntoIter: 'a,
    {
        let plan = Planner::new(self.compiler()).plan_filter(query)?;
        let out: Vec<&'a Document> = Executor::new(&self.config)
            .execute_node(&plan, Box::new(docs.into_iter()))
            .collect();
        debug!(matched = out.len(), "filter complete");
        Ok(out)
    }

    /// Filter, then sort, limit and project per `options`.
    pub fn find<'a, I>(
        &self,
        docs: I,
        query: &Arc<Query>,
        options: &FindOptions,
    ) -> Result<Vec<Bson>, EngineError>
    where
        I: IntoIterator<Item = &'a Document>,
        I::IntoIter: 'a,
    {
        let plan = Planner::new(self.compiler()).plan_find(query, options)?;
        let out = Executor::new(&self.config).execute(&plan, Box::new(docs.into_iter()));
        debug!(
            returned = out.len(),
            sorted = !options.sort.is_empty(),
            limit = ?options.limit,
            projected = options.projection.is_some(),
            "find complete"
        );
        Ok(out)
    }

    /// Number of cached matchers whose query is still alive.
    pub fn cached_matchers(&self) -> usize {
        self.cache.len()
    }
}
