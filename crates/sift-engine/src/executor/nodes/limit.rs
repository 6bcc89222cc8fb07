use crate::executor::DocIter;

pub(crate) fn execute<'p, 'a: 'p>(take: usize, source: DocIter<'p, 'a>) -> DocIter<'p, 'a> {
    Box::new(source.take(take))
}
