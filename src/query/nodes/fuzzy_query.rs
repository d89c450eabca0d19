//! Fuzzy query - matches terms within an edit distance
//!
//! A Levenshtein automaton is intersected with a required prefix and run
//! over the term dictionary.
//!
//! # Example
//!
//! ```rust
//! use sour::query::FuzzyQuery;
//!
//! // Find terms within edit distance 2 of "roust" (matches "rust")
//! let query = FuzzyQuery::new("content", "roust").with_fuzziness(2);
//! ```

use fst::automaton::Str;
use fst::Automaton;
use serde::{Deserialize, Serialize};

use crate::query::ast::QueryNode;
use crate::query::automaton::{levenshtein_distance, LevenshteinAutomaton};
use crate::query::context::QueryContext;
use crate::query::types::Matches;
use crate::segment::Segment;
use crate::Result;

use super::default_boost;

/// Query that matches terms within an edit distance of the query term
///
/// Distances are counted in bytes while matching, so a multibyte
/// character that differs costs more than one edit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FuzzyQuery {
    /// Field to search in
    pub field: String,
    /// Term to match approximately
    pub term: String,
    /// Maximum edit distance (default: 2)
    #[serde(default = "default_fuzziness")]
    pub fuzziness: u32,
    /// Number of initial characters that must match exactly (default: 0)
    #[serde(default)]
    pub prefix_length: usize,
    /// Maximum number of terms to consider (default: 50)
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,
    /// Boost factor for scoring
    #[serde(default = "default_boost")]
    pub boost: f32,
}

fn default_fuzziness() -> u32 {
    2
}

fn default_max_expansions() -> usize {
    50
}

impl FuzzyQuery {
    /// Create a new fuzzy query with default fuzziness of 2
    pub fn new(field: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            term: term.into(),
            fuzziness: 2,
            prefix_length: 0,
            max_expansions: 50,
            boost: 1.0,
        }
    }

    /// Set the maximum edit distance
    pub fn with_fuzziness(mut self, fuzziness: u32) -> Self {
        self.fuzziness = fuzziness;
        self
    }

    /// Set the number of initial characters that must match exactly
    pub fn with_prefix_length(mut self, prefix_length: usize) -> Self {
        self.prefix_length = prefix_length;
        self
    }

    /// Set the maximum number of terms to consider
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    /// Set the boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Get the prefix that must match exactly
    pub fn required_prefix(&self) -> &str {
        let end = self
            .term
            .char_indices()
            .nth(self.prefix_length)
            .map_or(self.term.len(), |(i, _)| i);
        &self.term[..end]
    }
}

impl QueryNode for FuzzyQuery {
    fn execute<S: Segment>(&self, ctx: &QueryContext<'_, S>) -> Result<Matches> {
        let prefix = self.required_prefix();
        let automaton = Str::new(prefix)
            .starts_with()
            .intersection(LevenshteinAutomaton::new(&self.term, self.fuzziness as usize));
        let start = (!prefix.is_empty()).then(|| prefix.as_bytes());

        let mut candidates: Vec<(usize, String)> = ctx
            .expand_terms(&self.field, automaton, start, None)?
            .into_iter()
            .map(|term| (levenshtein_distance(&self.term, &term), term))
            .collect();
        // closest first when expansions are capped
        candidates.sort();
        candidates.truncate(self.max_expansions);

        let term_len = self.term.chars().count().max(1) as f32;
        let mut matches = Matches::new();
        for (distance, term) in &candidates {
            let mut term_matches = ctx.term_matches(&self.field, term.as_bytes())?;
            term_matches.boost((1.0 - *distance as f32 / term_len).max(0.0));
            matches = matches.union(term_matches);
        }
        matches.boost(self.boost);
        Ok(matches)
    }

    fn query_type(&self) -> &'static str {
        "fuzzy"
    }

    fn boost(&self) -> f32 {
        self.boost
    }
}
