//! In-memory query evaluation over bson documents: path resolution,
//! compiled predicates with array-aware matching, sorting, limiting and
//! output reshaping.

mod cache;
mod collation;
mod compare;
mod config;
mod engine;
mod error;
mod executor;
mod field_tree;
mod matcher;
pub mod path;
mod planner;
mod projection;

use std::sync::{Arc, LazyLock};

pub use bson::{Bson, Document};
pub use config::{EngineConfig, StringOrdering};
pub use engine::Engine;
pub use error::EngineError;
pub use matcher::Matcher;
pub use path::{Path, PathError, Segment, flat_keys};
pub use sift_query::*;

static DEFAULT_ENGINE: LazyLock<Engine> = LazyLock::new(Engine::default);

/// The process-wide engine behind [`compile`], [`filter`] and [`find`].
pub fn default_engine() -> &'static Engine {
    &DEFAULT_ENGINE
}

/// Compile `query` with the default engine.
pub fn compile(query: &Arc<Query>) -> Result<Matcher, EngineError> {
    DEFAULT_ENGINE.compile(query)
}

/// Filter `docs` with the default engine.
pub fn filter<'a, I>(docs: I, query: &Arc<Query>) -> Result<Vec<&'a Document>, EngineError>
where
    I: IntoIterator<Item = &'a Document>,
    I::IntoIter: 'a,
{
    DEFAULT_ENGINE.filter(docs, query)
}

/// Run the full find pipeline with the default engine.
pub fn find<'a, I>(
    docs: I,
    query: &Arc<Query>,
    options: &FindOptions,
) -> Result<Vec<Bson>, EngineError>
where
    I: IntoIterator<Item = &'a Document>,
    I::IntoIter: 'a,
{
    DEFAULT_ENGINE.find(docs, query, options)
}
