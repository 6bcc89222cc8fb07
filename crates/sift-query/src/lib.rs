mod builder;
mod error;
mod operator;
mod options;
mod parse_options;
mod parse_query;
mod projection;
mod query;
mod sort;

pub use builder::QueryBuilder;
pub use error::QueryParseError;
pub use operator::Operator;
pub use options::FindOptions;
pub use parse_options::{parse_projection, parse_sort, parse_template};
pub use parse_query::{parse_field_condition, parse_query};
pub use projection::{Projection, Template, TransformFn};
pub use query::{CustomPredicate, FieldCondition, FieldMap, LogicalNode, Query};
pub use sort::{Sort, SortDirection};
