//! Posting iteration over a single document
//!
//! A term occurs at most once per document, and there is only one document,
//! so each postings list holds at most one posting.

use crate::models::TokenFreq;
use crate::Result;

use super::types::{Posting, PostingsOptions, INTERNAL_DOC_NUMBER};

/// Forward-only iterator over the documents containing one term
///
/// The returned posting borrows the iterator: it is only valid until the
/// next call, since implementations may reuse a single record.
pub trait PostingsIterator {
    /// Next posting, or `None` once exhausted
    fn next(&mut self) -> Result<Option<&Posting>>;

    /// First posting with document number `>= number`, or `None`
    fn advance(&mut self, number: u64) -> Result<Option<&Posting>>;

    /// Number of documents in this postings list
    fn count(&self) -> u64;

    fn is_empty(&self) -> bool;
}

/// Length normalization for a field of `len` tokens.
///
/// Computed through f32 so scores line up with engines storing norms at
/// single precision.
pub fn norm_for_len(len: usize) -> f64 {
    f64::from((1.0 / (len as f64).sqrt()) as f32)
}

/// Posting reader for one term of one field of the current document
pub struct TermFieldReader<'a> {
    tf: Option<&'a TokenFreq>,
    len: usize,
    done: bool,
    options: PostingsOptions,
    posting: Posting,
}

impl<'a> TermFieldReader<'a> {
    pub fn new(tf: &'a TokenFreq, len: usize, options: PostingsOptions) -> Self {
        Self {
            tf: Some(tf),
            len,
            done: false,
            options,
            posting: Posting::new(),
        }
    }

    /// Reader over an absent term: exhausted from the start
    pub const fn empty() -> Self {
        Self {
            tf: None,
            len: 0,
            done: true,
            options: PostingsOptions::NONE,
            posting: Posting::new(),
        }
    }
}

impl PostingsIterator for TermFieldReader<'_> {
    fn next(&mut self) -> Result<Option<&Posting>> {
        let tf = match (self.done, self.tf) {
            (false, Some(tf)) => tf,
            _ => {
                self.done = true;
                return Ok(None);
            }
        };

        let posting = &mut self.posting;
        posting.term.clone_from(&tf.term);
        posting.number = INTERNAL_DOC_NUMBER;
        if self.options.frequency {
            posting.frequency = tf.frequency as u64;
        }
        if self.options.norm {
            posting.norm = norm_for_len(self.len);
        }
        if self.options.locations {
            // reuses the location buffer and its strings across calls
            posting.locations.clone_from(&tf.locations);
        }

        self.done = true;
        Ok(Some(&self.posting))
    }

    fn advance(&mut self, number: u64) -> Result<Option<&Posting>> {
        if self.done {
            return Ok(None);
        }
        if number > INTERNAL_DOC_NUMBER {
            // seek lands past the only document
            self.done = true;
            return Ok(None);
        }
        self.next()
    }

    fn count(&self) -> u64 {
        if self.tf.is_some() {
            1
        } else {
            0
        }
    }

    fn is_empty(&self) -> bool {
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Location;

    fn token_freq() -> TokenFreq {
        TokenFreq {
            term: "code".to_string(),
            frequency: 2,
            locations: vec![
                Location::new("slogan", 0, 4, 1),
                Location::new("slogan", 9, 13, 3),
            ],
        }
    }

    #[test]
    fn test_next_yields_once() {
        let tf = token_freq();
        let mut reader = TermFieldReader::new(&tf, 4, PostingsOptions::ALL);

        assert_eq!(reader.count(), 1);
        assert!(!reader.is_empty());

        let posting = reader.next().unwrap().unwrap();
        assert_eq!(posting.term, "code");
        assert_eq!(posting.number, INTERNAL_DOC_NUMBER);
        assert_eq!(posting.frequency, 2);
        assert_eq!(posting.norm, 0.5);
        assert_eq!(posting.locations, tf.locations);

        assert!(reader.is_empty());
        assert!(reader.next().unwrap().is_none());
        assert!(reader.next().unwrap().is_none());
    }

    #[test]
    fn test_options_control_fields() {
        let tf = token_freq();
        let mut reader = TermFieldReader::new(&tf, 4, PostingsOptions::NONE);

        let posting = reader.next().unwrap().unwrap();
        assert_eq!(posting.frequency, 0);
        assert_eq!(posting.norm, 0.0);
        assert!(posting.locations.is_empty());
    }

    #[test]
    fn test_advance() {
        let tf = token_freq();

        let mut reader = TermFieldReader::new(&tf, 1, PostingsOptions::SCORING);
        assert!(reader.advance(INTERNAL_DOC_NUMBER).unwrap().is_some());
        assert!(reader.advance(INTERNAL_DOC_NUMBER).unwrap().is_none());

        let mut reader = TermFieldReader::new(&tf, 1, PostingsOptions::SCORING);
        assert!(reader.advance(INTERNAL_DOC_NUMBER + 1).unwrap().is_none());
        assert!(reader.is_empty());
        assert!(reader.next().unwrap().is_none());
    }

    #[test]
    fn test_empty_reader() {
        let mut reader = TermFieldReader::empty();
        assert_eq!(reader.count(), 0);
        assert!(reader.is_empty());
        assert!(reader.next().unwrap().is_none());
        assert!(reader.advance(0).unwrap().is_none());
    }

    #[test]
    fn test_norm_for_len() {
        assert_eq!(norm_for_len(4), 0.5);
        assert_eq!(norm_for_len(1), 1.0);
        assert_eq!(norm_for_len(3), f64::from((1.0 / 3f64.sqrt()) as f32));
        assert_ne!(norm_for_len(3), 1.0 / 3f64.sqrt());
    }
}
