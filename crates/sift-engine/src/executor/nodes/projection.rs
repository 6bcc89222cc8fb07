use bson::Bson;

use crate::executor::DocIter;
use crate::projection::Projector;

pub(crate) fn execute<'p, 'a: 'p>(
    projector: &'p Projector,
    source: DocIter<'p, 'a>,
) -> impl Iterator<Item = Bson> + 'p {
    source.map(move |doc| projector.apply(doc))
}
