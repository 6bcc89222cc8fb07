use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::config::StringOrdering;

pub(crate) fn compare_strings(a: &str, b: &str, ordering: StringOrdering) -> Ordering {
    match ordering {
        StringOrdering::Binary => a.cmp(b),
        StringOrdering::Locale => locale_cmp(a, b),
    }
}

/// Three-level comparison over the canonical decomposition: base letters
/// ignoring case, then accents, then case (lowercase first). Falls back to
/// bytes so distinct strings never compare equal.
fn locale_cmp(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| accented(a).cmp(accented(b)))
        .then_with(|| cased(a).cmp(cased(b)))
        .then_with(|| a.cmp(b))
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn accented(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

fn cased(s: &str) -> impl Iterator<Item = (bool, char)> + '_ {
    s.nfd().map(|c| (c.is_uppercase(), c))
}
