//! Order-preserving term encodings for numeric and date values
//!
//! Each value becomes a single term of lowercase hex digits: 16 for a
//! number, 24 for a date (seconds, then subsecond nanoseconds). Byte-wise
//! comparison of two encoded terms agrees with numeric comparison of the
//! values, so a range query is a bounded scan of the sorted dictionary.

use chrono::{DateTime, TimeZone, Utc};

const SIGN_BIT: u64 = 1 << 63;
const TERM_LEN: usize = 16;
const NANOS_LEN: usize = 8;

/// Map an f64 onto a u64 whose unsigned order matches the float order
pub fn f64_to_sortable_u64(value: f64) -> u64 {
    // -0.0 and 0.0 compare equal, keep them on one term
    let value = if value == 0.0 { 0.0 } else { value };
    let bits = value.to_bits();
    if bits & SIGN_BIT != 0 {
        !bits
    } else {
        bits ^ SIGN_BIT
    }
}

pub fn sortable_u64_to_f64(sortable: u64) -> f64 {
    if sortable & SIGN_BIT != 0 {
        f64::from_bits(sortable ^ SIGN_BIT)
    } else {
        f64::from_bits(!sortable)
    }
}

pub fn i64_to_sortable_u64(value: i64) -> u64 {
    (value as u64) ^ SIGN_BIT
}

pub fn sortable_u64_to_i64(sortable: u64) -> i64 {
    (sortable ^ SIGN_BIT) as i64
}

fn encode(sortable: u64) -> String {
    format!("{:016x}", sortable)
}

fn decode(term: &[u8]) -> Option<u64> {
    if term.len() != TERM_LEN {
        return None;
    }
    let term = std::str::from_utf8(term).ok()?;
    u64::from_str_radix(term, 16).ok()
}

/// Term for a numeric field value
pub fn numeric_term(value: f64) -> String {
    encode(f64_to_sortable_u64(value))
}

pub fn decode_numeric_term(term: &[u8]) -> Option<f64> {
    decode(term).map(sortable_u64_to_f64)
}

/// Term for a date field value
///
/// Whole seconds are encoded like an i64 and followed by the subsecond
/// nanoseconds, so every date chrono can represent keeps its order.
pub fn date_term(value: &DateTime<Utc>) -> String {
    format!(
        "{}{:08x}",
        encode(i64_to_sortable_u64(value.timestamp())),
        value.timestamp_subsec_nanos()
    )
}

pub fn decode_date_term(term: &[u8]) -> Option<DateTime<Utc>> {
    if term.len() != TERM_LEN + NANOS_LEN {
        return None;
    }
    let (secs, nanos) = term.split_at(TERM_LEN);
    let secs = sortable_u64_to_i64(decode(secs)?);
    let nanos = u32::from_str_radix(std::str::from_utf8(nanos).ok()?, 16).ok()?;
    Utc.timestamp_opt(secs, nanos).single()
}

/// Smallest term that sorts strictly after `term`
pub fn term_successor(term: &str) -> String {
    let mut next = String::with_capacity(term.len() + 1);
    next.push_str(term);
    next.push('\0');
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_terms_sort_like_numbers() {
        let values = [-1e10, -42.5, -1.0, 0.0, 0.25, 1.0, 10.0, 11.0, 1e12];
        let terms: Vec<String> = values.iter().map(|v| numeric_term(*v)).collect();

        let mut sorted = terms.clone();
        sorted.sort();
        assert_eq!(terms, sorted);
    }

    #[test]
    fn test_numeric_term_decoding() {
        for value in [-3.5, 0.0, 10.0, f64::MAX] {
            let term = numeric_term(value);
            assert_eq!(term.len(), 16);
            assert_eq!(decode_numeric_term(term.as_bytes()), Some(value));
        }
        assert_eq!(numeric_term(-0.0), numeric_term(0.0));
        assert_eq!(decode_numeric_term(b"marty"), None);
    }

    #[test]
    fn test_date_terms() {
        let earlier = Utc.with_ymd_and_hms(1969, 7, 20, 20, 17, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();

        assert!(date_term(&earlier) < date_term(&later));
        assert_eq!(date_term(&later).len(), 24);
        assert_eq!(decode_date_term(date_term(&later).as_bytes()), Some(later));
        assert_eq!(decode_date_term(numeric_term(1.0).as_bytes()), None);
    }

    #[test]
    fn test_date_terms_outside_nanosecond_range() {
        let dates = [
            Utc.with_ymd_and_hms(1200, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(1600, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap(),
            Utc.with_ymd_and_hms(2400, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2500, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2500, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::nanoseconds(1),
        ];
        let terms: Vec<String> = dates.iter().map(date_term).collect();
        assert!(terms.windows(2).all(|pair| pair[0] < pair[1]));
        for (date, term) in dates.iter().zip(&terms) {
            assert_eq!(decode_date_term(term.as_bytes()), Some(*date));
        }
    }

    #[test]
    fn test_term_successor() {
        let term = numeric_term(10.0);
        let next = term_successor(&term);
        assert!(next > term);
        assert!(next < numeric_term(10.000001));
    }
}
