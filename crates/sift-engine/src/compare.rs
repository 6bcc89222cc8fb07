use std::cmp::Ordering;

use bson::Bson;

use crate::collation::compare_strings;
use crate::config::StringOrdering;

// ── Equality ────────────────────────────────────────────────────

/// Structural equality between a document value and a query literal.
///
/// Numbers compare by value across Int32 / Int64 / Double, dates by instant,
/// documents field-by-field in order, arrays element-wise. Everything else
/// falls back to bson equality.
pub(crate) fn values_eq(a: &Bson, b: &Bson) -> bool {
    match (a, b) {
        // ── Numeric coercion ────────────────────────────────────
        (Bson::Int32(x), Bson::Int32(y)) => x == y,
        (Bson::Int64(x), Bson::Int64(y)) => x == y,
        (Bson::Int32(x), Bson::Int64(y)) => i64::from(*x) == *y,
        (Bson::Int64(x), Bson::Int32(y)) => *x == i64::from(*y),
        (Bson::Double(x), Bson::Double(y)) => x == y,
        (Bson::Double(x), Bson::Int32(y)) | (Bson::Int32(y), Bson::Double(x)) => {
            *x == f64::from(*y)
        }
        (Bson::Double(x), Bson::Int64(y)) | (Bson::Int64(y), Bson::Double(x)) => *x == *y as f64,
        (Bson::DateTime(x), Bson::DateTime(y)) => x.timestamp_millis() == y.timestamp_millis(),

        // ── Containers ──────────────────────────────────────────
        (Bson::Array(x), Bson::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_eq(a, b))
        }
        (Bson::Document(x), Bson::Document(y)) => {
            x.len() == y.len()
                && x.iter()
                    .zip(y)
                    .all(|((ka, va), (kb, vb))| ka == kb && values_eq(va, vb))
        }

        _ => a == b,
    }
}

/// `needle` equals some element of `set`.
pub(crate) fn contains(set: &[Bson], needle: &Bson) -> bool {
    set.iter().any(|item| values_eq(item, needle))
}

// ── Ordering for $gt / $gte / $lt / $lte ────────────────────────

/// Order two values if they are mutually orderable: number/number,
/// string/string or date/date. Anything else is `None` and the comparison
/// operator rejects.
pub(crate) fn compare_values(a: &Bson, b: &Bson) -> Option<Ordering> {
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.as_str().cmp(y.as_str())),
        (Bson::DateTime(x), Bson::DateTime(y)) => {
            Some(x.timestamp_millis().cmp(&y.timestamp_millis()))
        }
        _ => match (as_number(a)?, as_number(b)?) {
            (Number::Int(x), Number::Int(y)) => Some(x.cmp(&y)),
            (x, y) => x.as_f64().partial_cmp(&y.as_f64()),
        },
    }
}

#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

fn as_number(value: &Bson) -> Option<Number> {
    match value {
        Bson::Int32(i) => Some(Number::Int(i64::from(*i))),
        Bson::Int64(i) => Some(Number::Int(*i)),
        Bson::Double(f) => Some(Number::Float(*f)),
        _ => None,
    }
}

// ── Total ordering for sort keys ────────────────────────────────

/// Compare two resolved sort keys (ascending).
///
/// Absent and null sort first. Values of different kinds are ordered by a
/// fixed kind rank so the comparator is total.
pub(crate) fn compare_sort_keys(
    a: Option<&Bson>,
    b: Option<&Bson>,
    strings: StringOrdering,
) -> Ordering {
    match (non_null(a), non_null(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_present(a, b, strings),
    }
}

fn non_null(value: Option<&Bson>) -> Option<&Bson> {
    value.filter(|v| !matches!(v, Bson::Null | Bson::Undefined))
}

fn compare_present(a: &Bson, b: &Bson, strings: StringOrdering) -> Ordering {
    let rank = kind_rank(a).cmp(&kind_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => compare_strings(x, y, strings),
        (Bson::Symbol(x), Bson::Symbol(y)) => compare_strings(x, y, strings),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::DateTime(x), Bson::DateTime(y)) => x.timestamp_millis().cmp(&y.timestamp_millis()),
        (Bson::Timestamp(x), Bson::Timestamp(y)) => {
            (x.time, x.increment).cmp(&(y.time, y.increment))
        }
        (Bson::ObjectId(x), Bson::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
        (Bson::Binary(x), Bson::Binary(y)) => x.bytes.cmp(&y.bytes),
        (Bson::Decimal128(x), Bson::Decimal128(y)) => x.bytes().cmp(&y.bytes()),
        (Bson::Array(x), Bson::Array(y)) => compare_seq(
            x.iter().map(Some),
            y.iter().map(Some),
            |a, b| compare_sort_keys(a, b, strings),
        ),
        (Bson::Document(x), Bson::Document(y)) => compare_seq(x.iter(), y.iter(), |a, b| {
            compare_strings(a.0, b.0, StringOrdering::Binary)
                .then_with(|| compare_sort_keys(Some(a.1), Some(b.1), strings))
        }),
        _ => match (as_number(a), as_number(b)) {
            (Some(Number::Int(x)), Some(Number::Int(y))) => x.cmp(&y),
            (Some(x), Some(y)) => x.as_f64().total_cmp(&y.as_f64()),
            _ => Ordering::Equal,
        },
    }
}

fn compare_seq<T, I, F>(mut a: I, mut b: I, mut cmp: F) -> Ordering
where
    I: Iterator<Item = T>,
    F: FnMut(T, T) -> Ordering,
{
    loop {
        match (a.next(), b.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = cmp(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn kind_rank(value: &Bson) -> u8 {
    match value {
        Bson::Null | Bson::Undefined => 0,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => 1,
        // No numeric view; ordered by raw bytes after the other numbers.
        Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        _ => 12,
    }
}

#[cfg(test)]
mod tests {
    use bson::{bson, doc};

    use super::*;

    #[test]
    fn eq_cross_numeric() {
        assert!(values_eq(&Bson::Int32(5), &Bson::Int64(5)));
        assert!(values_eq(&Bson::Double(5.0), &Bson::Int32(5)));
        assert!(values_eq(&Bson::Int64(5), &Bson::Double(5.0)));
        assert!(!values_eq(&Bson::Double(5.5), &Bson::Int32(5)));
    }

    #[test]
    fn eq_is_strict_across_kinds() {
        assert!(!values_eq(&Bson::String("5".into()), &Bson::Int32(5)));
        assert!(!values_eq(&Bson::Boolean(true), &Bson::Int32(1)));
        assert!(!values_eq(&Bson::Null, &Bson::Int32(0)));
    }

    #[test]
    fn eq_structural_containers() {
        assert!(values_eq(&bson!([1, 2.0]), &bson!([1_i64, 2])));
        assert!(!values_eq(&bson!([1, 2]), &bson!([2, 1])));
        assert!(values_eq(
            &Bson::Document(doc! { "a": 1, "b": "x" }),
            &Bson::Document(doc! { "a": 1.0, "b": "x" })
        ));
        assert!(!values_eq(
            &Bson::Document(doc! { "a": 1, "b": "x" }),
            &Bson::Document(doc! { "b": "x", "a": 1 })
        ));
    }

    #[test]
    fn compare_orderable_pairs() {
        assert_eq!(
            compare_values(&Bson::Int32(3), &Bson::Double(2.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            compare_values(&Bson::String("a".into()), &Bson::String("b".into())),
            Some(Ordering::Less)
        );
        let early = Bson::DateTime(bson::DateTime::from_millis(1_000));
        let late = Bson::DateTime(bson::DateTime::from_millis(2_000));
        assert_eq!(compare_values(&early, &late), Some(Ordering::Less));
    }

    #[test]
    fn compare_non_orderable_is_none() {
        assert_eq!(compare_values(&Bson::String("5".into()), &Bson::Int32(5)), None);
        assert_eq!(compare_values(&Bson::Boolean(true), &Bson::Boolean(false)), None);
        assert_eq!(compare_values(&Bson::Null, &Bson::Int32(0)), None);
        assert_eq!(compare_values(&Bson::Double(f64::NAN), &Bson::Int32(0)), None);
    }

    #[test]
    fn sort_keys_absent_and_null_first() {
        let one = Bson::Int32(1);
        let s = StringOrdering::Locale;
        assert_eq!(compare_sort_keys(None, Some(&one), s), Ordering::Less);
        assert_eq!(compare_sort_keys(Some(&Bson::Null), Some(&one), s), Ordering::Less);
        assert_eq!(compare_sort_keys(None, Some(&Bson::Null), s), Ordering::Equal);
        assert_eq!(compare_sort_keys(Some(&one), None, s), Ordering::Greater);
    }

    #[test]
    fn sort_keys_mixed_kinds_use_rank() {
        let s = StringOrdering::Binary;
        let num = Bson::Int32(100);
        let text = Bson::String("1".into());
        assert_eq!(compare_sort_keys(Some(&num), Some(&text), s), Ordering::Less);
        assert_eq!(compare_sort_keys(Some(&text), Some(&num), s), Ordering::Greater);
    }

    #[test]
    fn decimal_never_ties_with_other_numbers() {
        let s = StringOrdering::Binary;
        let dec = Bson::Decimal128(bson::Decimal128::from_bytes([0; 16]));
        for n in [Bson::Int32(1), Bson::Int64(3), Bson::Double(-2.5)] {
            assert_eq!(compare_sort_keys(Some(&n), Some(&dec), s), Ordering::Less);
            assert_eq!(compare_sort_keys(Some(&dec), Some(&n), s), Ordering::Greater);
        }
        assert_eq!(compare_sort_keys(Some(&dec), Some(&dec.clone()), s), Ordering::Equal);
    }

    #[test]
    fn sort_keys_arrays_lexicographic() {
        let s = StringOrdering::Binary;
        assert_eq!(
            compare_sort_keys(Some(&bson!([1, 2])), Some(&bson!([1, 3])), s),
            Ordering::Less
        );
        assert_eq!(
            compare_sort_keys(Some(&bson!([1])), Some(&bson!([1, 0])), s),
            Ordering::Less
        );
    }
}
