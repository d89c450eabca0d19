//! Virtual segment contract for full-text search
//!
//! A [`Segment`] is whatever the search pipeline reads from: term
//! dictionaries, postings, collection statistics and doc values. The
//! [`Sour`](crate::Sour) adapter implements it for exactly one in-memory
//! document, numbered [`INTERNAL_DOC_NUMBER`].
//!
//! # Architecture
//!
//! - `PostingsIterator`: forward-only postings for one term
//! - `DictionaryLookup` / `DictionaryIterator`: term existence and sorted scans
//! - `CollectionStats`: aggregate statistics for scoring
//! - `DocumentValueReader`: per-document field values

mod docvalues;
mod postings;
mod statistics;
mod term_dict;
mod types;

pub use docvalues::*;
pub use postings::*;
pub use statistics::*;
pub use term_dict::*;
pub use types::*;

use fst::Automaton;

use crate::Result;

/// Read-side contract of an index segment
///
/// Iterators borrow the segment, so they cannot outlive a change to the
/// data they read.
pub trait Segment {
    fn collection_stats(&self, field: &str) -> Result<Box<dyn CollectionStats>>;

    fn dictionary_lookup<'a>(&'a self, field: &str) -> Result<Box<dyn DictionaryLookup + 'a>>;

    /// Sorted terms of `field` accepted by `automaton`, within
    /// `[start, end)` when bounds are given
    fn dictionary_iterator<'a, A: Automaton + 'a>(
        &'a self,
        field: &str,
        automaton: A,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
    ) -> Result<Box<dyn DictionaryIterator + 'a>>;

    fn postings_iterator<'a>(
        &'a self,
        term: &[u8],
        field: &str,
        options: PostingsOptions,
    ) -> Result<Box<dyn PostingsIterator + 'a>>;

    fn document_value_reader<'a>(
        &'a self,
        fields: &[String],
    ) -> Result<Box<dyn DocumentValueReader + 'a>>;

    /// Visit stored field values of a document until `visitor` returns false
    fn visit_stored_fields(
        &self,
        number: u64,
        visitor: &mut dyn FnMut(&str, &[u8]) -> bool,
    ) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}
