//! Core types for the single-document segment

use serde::{Deserialize, Serialize};

/// The only document number a single-document segment ever hands out
pub const INTERNAL_DOC_NUMBER: u64 = 0;

/// One occurrence of a term in a field's analyzed text
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Field the occurrence came from (differs from the owning field for composites)
    pub field: String,
    /// Byte offset of the first byte
    pub start: usize,
    /// Byte offset one past the last byte
    pub end: usize,
    /// 1-based token position
    pub pos: usize,
}

impl Location {
    pub fn new(field: impl Into<String>, start: usize, end: usize, pos: usize) -> Self {
        Self {
            field: field.into(),
            start,
            end,
            pos,
        }
    }
}

/// A single posting entry: one term's occurrence record in one document
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Posting {
    pub term: String,
    /// Document number within the segment
    pub number: u64,
    /// Term frequency in this document (0 unless requested)
    pub frequency: u64,
    /// Length normalization factor (0 unless requested)
    pub norm: f64,
    /// Occurrences in position order (empty unless requested)
    pub locations: Vec<Location>,
}

impl Posting {
    pub const fn new() -> Self {
        Self {
            term: String::new(),
            number: INTERNAL_DOC_NUMBER,
            frequency: 0,
            norm: 0.0,
            locations: Vec::new(),
        }
    }
}

/// Term dictionary entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DictEntry<'a> {
    pub term: &'a str,
    /// Number of documents containing the term
    pub count: u64,
}

/// Which parts of a posting the consumer wants filled in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PostingsOptions {
    pub frequency: bool,
    pub norm: bool,
    pub locations: bool,
}

impl PostingsOptions {
    /// Document numbers only
    pub const NONE: PostingsOptions = PostingsOptions {
        frequency: false,
        norm: false,
        locations: false,
    };

    /// Frequency and norm, as needed for scoring
    pub const SCORING: PostingsOptions = PostingsOptions {
        frequency: true,
        norm: true,
        locations: false,
    };

    pub const ALL: PostingsOptions = PostingsOptions {
        frequency: true,
        norm: true,
        locations: true,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posting_defaults_to_internal_doc() {
        let posting = Posting::new();
        assert_eq!(posting.number, INTERNAL_DOC_NUMBER);
        assert_eq!(posting.frequency, 0);
        assert!(posting.locations.is_empty());
        assert_eq!(posting, Posting::default());
    }

    #[test]
    fn test_postings_options() {
        assert!(!PostingsOptions::default().frequency);
        assert!(PostingsOptions::SCORING.norm);
        assert!(!PostingsOptions::SCORING.locations);
        assert!(PostingsOptions::ALL.locations);
    }
}
