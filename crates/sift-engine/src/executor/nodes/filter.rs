use crate::executor::DocIter;
use crate::matcher::Matcher;

pub(crate) fn execute<'p, 'a: 'p>(
    matcher: &'p Matcher,
    source: DocIter<'p, 'a>,
) -> DocIter<'p, 'a> {
    Box::new(source.filter(move |doc| matcher.matches(doc)))
}
