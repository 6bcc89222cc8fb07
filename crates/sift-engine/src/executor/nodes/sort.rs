use std::cmp::Ordering;

use bson::Document;
use sift_query::SortDirection;

use crate::compare::compare_sort_keys;
use crate::config::StringOrdering;
use crate::executor::DocIter;
use crate::path;
use crate::planner::SortKey;

/// Stable multi-key sort. The first key is primary; later keys break ties.
pub(crate) fn execute<'p, 'a: 'p>(
    keys: &'p [SortKey],
    strings: StringOrdering,
    source: DocIter<'p, 'a>,
) -> DocIter<'p, 'a> {
    let mut records: Vec<&'a Document> = source.collect();
    if keys.is_empty() {
        return Box::new(records.into_iter());
    }

    // Resolve at comparison time; no key allocations.
    records.sort_by(|a, b| {
        for key in keys {
            let ord = compare_sort_keys(
                path::resolve(a, &key.path),
                path::resolve(b, &key.path),
                strings,
            );
            let ord = match key.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    Box::new(records.into_iter())
}
