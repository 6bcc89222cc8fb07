use bson::{Bson, Document};

use crate::projection::{Projection, Template};
use crate::sort::{Sort, SortDirection};

/// Everything that happens after filtering: sort, limit, project.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub sort: Vec<Sort>,
    pub limit: Option<usize>,
    pub projection: Option<Projection>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sort key. The first key added is the primary one.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort.push(Sort {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn select_fields<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(Projection::fields(paths));
        self
    }

    pub fn select_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Document) -> Bson + Send + Sync + 'static,
    {
        self.projection = Some(Projection::transform(f));
        self
    }

    pub fn select_template(mut self, template: Template) -> Self {
        self.projection = Some(Projection::Template(template));
        self
    }
}
