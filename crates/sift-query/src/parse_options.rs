use bson::{Bson, Document};

use crate::error::QueryParseError;
use crate::projection::{Projection, Template};
use crate::sort::{Sort, SortDirection};

/// Parse `{ "field": 1 | -1 | "asc" | "desc", ... }` into sort keys, in
/// document order.
pub fn parse_sort(doc: &Document) -> Result<Vec<Sort>, QueryParseError> {
    doc.iter()
        .map(|(field, value)| {
            let direction = match value {
                Bson::Int32(1) | Bson::Int64(1) => SortDirection::Asc,
                Bson::Int32(-1) | Bson::Int64(-1) => SortDirection::Desc,
                Bson::Double(f) if *f == 1.0 => SortDirection::Asc,
                Bson::Double(f) if *f == -1.0 => SortDirection::Desc,
                Bson::String(s) if s.eq_ignore_ascii_case("asc") => SortDirection::Asc,
                Bson::String(s) if s.eq_ignore_ascii_case("desc") => SortDirection::Desc,
                other => {
                    return Err(QueryParseError(format!(
                        "sort direction for {field} must be 1, -1, \"asc\" or \"desc\", got {other}"
                    )));
                }
            };
            Ok(Sort {
                field: field.clone(),
                direction,
            })
        })
        .collect()
}

/// Parse a projection value.
///
/// - an array of strings is a field list
/// - a document is a template
///
/// Transform functions cannot come from bson; build them with
/// [`Projection::transform`].
pub fn parse_projection(value: &Bson) -> Result<Projection, QueryParseError> {
    match value {
        Bson::Array(items) => items
            .iter()
            .map(|item| match item {
                Bson::String(path) => Ok(path.clone()),
                other => Err(QueryParseError(format!(
                    "field-list projection entries must be strings, got {other}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Projection::Fields),
        Bson::Document(doc) => Ok(Projection::Template(parse_template(doc))),
        other => Err(QueryParseError(format!(
            "projection must be an array of paths or a template document, got {other}"
        ))),
    }
}

/// Parse a template document. Never fails: anything that is not a path, a
/// nested document or an `[arrayPath, {..}]` pair is a constant.
pub fn parse_template(doc: &Document) -> Template {
    Template::Object(
        doc.iter()
            .map(|(key, value)| (key.clone(), parse_template_value(value)))
            .collect(),
    )
}

fn parse_template_value(value: &Bson) -> Template {
    match value {
        Bson::String(path) => Template::Path(path.clone()),
        Bson::Document(doc) => parse_template(doc),
        Bson::Array(pair) => match pair.as_slice() {
            [Bson::String(path), Bson::Document(element)] => Template::Array {
                path: path.clone(),
                element: Box::new(parse_template(element)),
            },
            _ => Template::Const(value.clone()),
        },
        other => Template::Const(other.clone()),
    }
}
