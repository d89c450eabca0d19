//! Term dictionary access for the current document
//!
//! Two read paths: existence lookups against a field's term map, and sorted
//! enumeration optionally filtered by an automaton and term bounds.

use std::sync::Arc;

use fst::Automaton;

use crate::models::TokenFrequencies;
use crate::Result;

use super::types::DictEntry;

/// Term existence lookups for one field
pub trait DictionaryLookup {
    fn contains(&self, term: &[u8]) -> Result<bool>;
}

/// Sorted, forward-only enumeration of a field's terms
pub trait DictionaryIterator {
    /// Next matching entry; the entry borrows the iterator
    fn next(&mut self) -> Result<Option<DictEntry<'_>>>;
}

/// Existence lookups against one field's term map
pub struct FieldDictionary<'a> {
    terms: Option<&'a TokenFrequencies>,
}

impl<'a> FieldDictionary<'a> {
    pub fn new(terms: &'a TokenFrequencies) -> Self {
        Self { terms: Some(terms) }
    }

    /// Dictionary of a field the document does not have
    pub const fn empty() -> Self {
        Self { terms: None }
    }
}

impl DictionaryLookup for FieldDictionary<'_> {
    fn contains(&self, term: &[u8]) -> Result<bool> {
        let Some(terms) = self.terms else {
            return Ok(false);
        };
        Ok(std::str::from_utf8(term).map_or(false, |term| terms.contains(term)))
    }
}

/// Drive `automaton` over `term` byte by byte, giving up as soon as no
/// match is reachable
pub fn automaton_match<A: Automaton>(automaton: &A, term: &str) -> bool {
    let mut state = automaton.start();
    for &byte in term.as_bytes() {
        state = automaton.accept(&state, byte);
        if !automaton.can_match(&state) {
            return false;
        }
    }
    automaton.is_match(&state)
}

/// Enumerates a sorted term list, skipping terms the automaton rejects
pub struct SortedTermIterator<A> {
    terms: Arc<Vec<String>>,
    index: usize,
    end: usize,
    automaton: Option<A>,
}

impl<A: Automaton> SortedTermIterator<A> {
    /// Iterate `terms` within `[start, end)`; either bound may be open
    pub fn new(
        terms: Arc<Vec<String>>,
        automaton: A,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
    ) -> Self {
        let first = start.map_or(0, |start| terms.partition_point(|t| t.as_bytes() < start));
        let last = end.map_or(terms.len(), |end| terms.partition_point(|t| t.as_bytes() < end));
        Self {
            index: first,
            end: last.max(first),
            terms,
            automaton: Some(automaton),
        }
    }

    /// Iterator over a field the document does not have
    pub fn empty() -> Self {
        Self {
            terms: Arc::default(),
            index: 0,
            end: 0,
            automaton: None,
        }
    }
}

impl<A: Automaton> DictionaryIterator for SortedTermIterator<A> {
    fn next(&mut self) -> Result<Option<DictEntry<'_>>> {
        while self.index < self.end {
            let index = self.index;
            self.index += 1;
            let term = &self.terms[index];
            if let Some(automaton) = &self.automaton {
                if !automaton_match(automaton, term) {
                    continue;
                }
            }
            return Ok(Some(DictEntry {
                term: &self.terms[index],
                count: 1,
            }));
        }
        Ok(None)
    }
}
