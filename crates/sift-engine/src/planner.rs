use std::sync::Arc;

use sift_query::{FindOptions, Query, SortDirection};

use crate::error::EngineError;
use crate::matcher::{Compiler, Matcher};
use crate::path::Path;
use crate::projection::Projector;

/// A sort key with its path already parsed.
#[derive(Debug)]
pub(crate) struct SortKey {
    pub(crate) path: Path,
    pub(crate) direction: SortDirection,
}

/// The find pipeline, leaves first: scan → filter → sort → limit → project.
///
/// Everything that can be wrong with a query (paths, regexes, projection
/// shape) is caught while planning, before any document is read.
#[derive(Debug)]
pub(crate) enum Plan {
    Scan,
    Filter {
        matcher: Matcher,
        source: Box<Plan>,
    },
    Sort {
        keys: Vec<SortKey>,
        source: Box<Plan>,
    },
    Limit {
        take: usize,
        source: Box<Plan>,
    },
    Projection {
        projector: Projector,
        source: Box<Plan>,
    },
}

pub(crate) struct Planner<'e> {
    compiler: Compiler<'e>,
}

impl<'e> Planner<'e> {
    pub(crate) fn new(compiler: Compiler<'e>) -> Self {
        Self { compiler }
    }

    /// Scan and filter only.
    pub(crate) fn plan_filter(&self, query: &Arc<Query>) -> Result<Plan, EngineError> {
        let matcher = self.compiler.compile(query)?;
        Ok(Plan::Filter {
            matcher,
            source: Box::new(Plan::Scan),
        })
    }

    pub(crate) fn plan_find(
        &self,
        query: &Arc<Query>,
        options: &FindOptions,
    ) -> Result<Plan, EngineError> {
        let mut plan = self.plan_filter(query)?;

        if !options.sort.is_empty() {
            let keys = options
                .sort
                .iter()
                .map(|s| {
                    let path =
                        Path::parse(&s.field).map_err(|e| EngineError::path(&s.field, e))?;
                    Ok(SortKey {
                        path,
                        direction: s.direction,
                    })
                })
                .collect::<Result<Vec<_>, EngineError>>()?;
            plan = Plan::Sort {
                keys,
                source: Box::new(plan),
            };
        }

        if let Some(take) = options.limit {
            plan = Plan::Limit {
                take,
                source: Box::new(plan),
            };
        }

        if let Some(projection) = &options.projection {
            plan = Plan::Projection {
                projector: Projector::compile(projection)?,
                source: Box::new(plan),
            };
        }

        Ok(plan)
    }
}
