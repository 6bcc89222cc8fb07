//! Output reshaping: field lists, transform functions and templates.
//!
//! Every path in a projection is parsed when the projection is compiled, so
//! a malformed path is reported before any document is read.

use bson::{Bson, Document};
use sift_query::{Projection, Template, TransformFn};

use crate::error::EngineError;
use crate::field_tree::{self, FieldForest, FieldTree};
use crate::path::{Node, Path};

#[derive(Debug)]
pub(crate) enum Projector {
    /// Empty field list.
    Identity,
    Fields(FieldForest),
    Transform(TransformFn),
    Template(Vec<(String, CompiledTemplate)>),
}

#[derive(Debug)]
pub(crate) enum CompiledTemplate {
    Path(Path),
    Const(Bson),
    Object(Vec<(String, CompiledTemplate)>),
    Array {
        path: Path,
        element: Box<CompiledTemplate>,
    },
}

impl Projector {
    pub(crate) fn compile(projection: &Projection) -> Result<Self, EngineError> {
        match projection {
            Projection::Fields(paths) if paths.is_empty() => Ok(Projector::Identity),
            Projection::Fields(paths) => FieldTree::from_paths(paths).map(Projector::Fields),
            Projection::Transform(f) => Ok(Projector::Transform(f.clone())),
            Projection::Template(Template::Object(entries)) => {
                compile_entries(entries).map(Projector::Template)
            }
            Projection::Template(_) => Err(EngineError::InvalidQuery(
                "template projection must be an object".into(),
            )),
        }
    }

    pub(crate) fn apply(&self, doc: &Document) -> Bson {
        match self {
            Projector::Identity => Bson::Document(doc.clone()),
            Projector::Fields(forest) => Bson::Document(field_tree::project(doc, forest)),
            Projector::Transform(f) => f.call(doc),
            Projector::Template(entries) => {
                Bson::Document(render_entries(Node::Document(doc), entries))
            }
        }
    }
}

fn compile_entries(
    entries: &[(String, Template)],
) -> Result<Vec<(String, CompiledTemplate)>, EngineError> {
    entries
        .iter()
        .map(|(key, t)| Ok((key.clone(), compile_template(t)?)))
        .collect()
}

fn compile_template(template: &Template) -> Result<CompiledTemplate, EngineError> {
    Ok(match template {
        Template::Path(raw) => CompiledTemplate::Path(parse(raw)?),
        Template::Const(value) => CompiledTemplate::Const(value.clone()),
        Template::Object(entries) => CompiledTemplate::Object(compile_entries(entries)?),
        Template::Array { path, element } => CompiledTemplate::Array {
            path: parse(path)?,
            element: Box::new(compile_template(element)?),
        },
    })
}

fn parse(raw: &str) -> Result<Path, EngineError> {
    Path::parse(raw).map_err(|e| EngineError::path(raw, e))
}

fn render_entries(root: Node<'_>, entries: &[(String, CompiledTemplate)]) -> Document {
    let mut out = Document::new();
    for (key, template) in entries {
        if let Some(value) = render(root, template) {
            out.insert(key.clone(), value);
        }
    }
    out
}

/// `None` means "omit this key".
fn render(root: Node<'_>, template: &CompiledTemplate) -> Option<Bson> {
    match template {
        CompiledTemplate::Path(path) => root.resolve(path).cloned(),
        CompiledTemplate::Const(value) => Some(value.clone()),
        CompiledTemplate::Object(entries) => Some(Bson::Document(render_entries(root, entries))),
        CompiledTemplate::Array { path, element } => {
            let items = match root.resolve(path) {
                Some(Bson::Array(items)) => items
                    .iter()
                    .map(|item| render(Node::Value(item), element).unwrap_or(Bson::Null))
                    .collect(),
                _ => Vec::new(),
            };
            Some(Bson::Array(items))
        }
    }
}
