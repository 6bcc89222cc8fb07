use std::fmt;
use std::sync::Arc;

use bson::{Bson, Document};

/// Output shape description, evaluated per matched document.
#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    /// Copy the value at this path.
    Path(String),
    /// Copy this value verbatim.
    Const(Bson),
    /// Build a nested document entry by entry.
    Object(Vec<(String, Template)>),
    /// Resolve `path` to an array and apply `element` to each item.
    Array { path: String, element: Box<Template> },
}

impl Template {
    pub fn path(path: impl Into<String>) -> Self {
        Template::Path(path.into())
    }

    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Template)>,
    {
        Template::Object(entries.into_iter().map(|(k, t)| (k.into(), t)).collect())
    }

    pub fn array(path: impl Into<String>, element: Template) -> Self {
        Template::Array {
            path: path.into(),
            element: Box::new(element),
        }
    }
}

/// A total function from a matched document to an arbitrary output value.
#[derive(Clone)]
pub struct TransformFn(Arc<dyn Fn(&Document) -> Bson + Send + Sync>);

impl TransformFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Document) -> Bson + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, doc: &Document) -> Bson {
        (self.0)(doc)
    }
}

impl fmt::Debug for TransformFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TransformFn(..)")
    }
}

/// The three mutually exclusive projection modes.
#[derive(Debug, Clone)]
pub enum Projection {
    Fields(Vec<String>),
    Transform(TransformFn),
    Template(Template),
}

impl Projection {
    pub fn fields<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection::Fields(paths.into_iter().map(Into::into).collect())
    }

    pub fn transform<F>(f: F) -> Self
    where
        F: Fn(&Document) -> Bson + Send + Sync + 'static,
    {
        Projection::Transform(TransformFn::new(f))
    }
}
