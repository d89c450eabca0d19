//! Phrase query - matches exact phrases with optional proximity/slop
//!
//! A phrase query matches documents containing the sequence of terms at
//! the same relative positions they have in the query text, optionally
//! allowing each term to drift by up to `slop` positions.
//!
//! # Example
//!
//! ```rust
//! use sour::query::PhraseQuery;
//!
//! // Exact phrase match
//! let query = PhraseQuery::new("content", "rust programming");
//!
//! // Phrase with slop (allows 2 terms between)
//! let query = PhraseQuery::new("content", "rust programming").with_slop(2);
//! ```

use std::collections::HashMap;

use roaring::RoaringTreemap;
use serde::{Deserialize, Serialize};

use crate::query::ast::QueryNode;
use crate::query::context::QueryContext;
use crate::query::types::Matches;
use crate::segment::Segment;
use crate::Result;

use super::default_boost;

/// Query that matches an exact phrase of terms
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhraseQuery {
    /// Field to search in
    pub field: String,
    /// The phrase to match (will be tokenized)
    pub phrase: String,
    /// Maximum position drift per term (default: 0 for exact phrase)
    #[serde(default)]
    pub slop: u32,
    /// Boost factor for scoring
    #[serde(default = "default_boost")]
    pub boost: f32,
}

/// Positions of one phrase term, by document
struct TermPositions {
    offset: usize,
    by_doc: HashMap<u64, Vec<usize>>,
}

impl PhraseQuery {
    /// Create a new phrase query with exact matching (slop=0)
    pub fn new(field: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            phrase: phrase.into(),
            slop: 0,
            boost: 1.0,
        }
    }

    /// Set the slop
    pub fn with_slop(mut self, slop: u32) -> Self {
        self.slop = slop;
        self
    }

    /// Set the boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    fn positions_match(&self, number: u64, terms: &[TermPositions]) -> bool {
        let Some(first) = terms.first().and_then(|t| t.by_doc.get(&number)) else {
            return false;
        };
        let slop = self.slop as i64;

        first.iter().any(|&anchor| {
            terms.iter().skip(1).all(|term| {
                let expected = (anchor + term.offset) as i64;
                term.by_doc.get(&number).map_or(false, |positions| {
                    positions
                        .iter()
                        .any(|&pos| (pos as i64 - expected).abs() <= slop)
                })
            })
        })
    }
}

impl QueryNode for PhraseQuery {
    fn execute<S: Segment>(&self, ctx: &QueryContext<'_, S>) -> Result<Matches> {
        let tokens = ctx.tokenizer().tokens(&self.phrase);
        let Some(base) = tokens.first().map(|token| token.position) else {
            return Ok(Matches::new());
        };

        // Intersection first, positions second
        let mut result: Option<Matches> = None;
        let mut terms = Vec::with_capacity(tokens.len());
        for token in &tokens {
            let matches = ctx.term_matches(&self.field, token.term.as_bytes())?;
            let combined = match result {
                Some(r) => r.intersect(&matches),
                None => matches,
            };
            if combined.is_empty() {
                return Ok(Matches::new());
            }
            result = Some(combined);

            terms.push(TermPositions {
                offset: token.position - base,
                by_doc: ctx
                    .term_positions(&self.field, token.term.as_bytes())?
                    .into_iter()
                    .collect(),
            });
        }

        let result = result.unwrap_or_default();
        let rejected: RoaringTreemap = result
            .docs()
            .iter()
            .filter(|&number| !self.positions_match(number, &terms))
            .collect();
        let mut result = result.difference(&Matches::from_docs(rejected, 0.0));
        result.boost(self.boost);
        Ok(result)
    }

    fn query_type(&self) -> &'static str {
        "phrase"
    }

    fn boost(&self) -> f32 {
        self.boost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::nodes::testing;

    #[test]
    fn test_phrase_query_creation() {
        let query = PhraseQuery::new("content", "rust programming").with_slop(2);
        assert_eq!(query.slop, 2);
        assert_eq!(query.query_type(), "phrase");
    }

    #[test]
    fn test_phrase_query_checks_positions() {
        let sour = testing::sour();
        let ctx = testing::ctx(&sour);

        let hits = |query: PhraseQuery| query.execute(&ctx).unwrap().len();
        assert_eq!(hits(PhraseQuery::new("title", "software developer")), 1);
        assert_eq!(hits(PhraseQuery::new("title", "developer software")), 0);
        assert_eq!(hits(PhraseQuery::new("title", "developer software").with_slop(2)), 1);
        assert_eq!(hits(PhraseQuery::new("title", "Developer")), 1);
        assert_eq!(hits(PhraseQuery::new("title", "")), 0);
        assert_eq!(hits(PhraseQuery::new("nope", "software developer")), 0);
    }

    #[test]
    fn test_phrase_across_composite_field() {
        let sour = testing::sour();
        let ctx = testing::ctx(&sour);

        assert_eq!(
            PhraseQuery::new("_all", "code match")
                .execute(&ctx)
                .unwrap()
                .len(),
            1
        );
    }
}
