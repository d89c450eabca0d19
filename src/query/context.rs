//! Query execution context
//!
//! The `QueryContext` gives query nodes access to the segment being
//! searched, the tokenizer for analyzing query text, and the similarity
//! parameters used for scoring.

use std::sync::Arc;

use fst::Automaton;

use crate::config::Bm25Params;
use crate::models::ID_FIELD;
use crate::segment::{bm25_score, CollectionStats, Posting, PostingsOptions, Segment};
use crate::tokenizer::Tokenizer;
use crate::Result;

use super::types::Matches;

/// Query execution context over one segment
pub struct QueryContext<'a, S: Segment> {
    segment: &'a S,
    tokenizer: Arc<Tokenizer>,
    similarity: Bm25Params,
}

impl<'a, S: Segment> QueryContext<'a, S> {
    pub fn new(segment: &'a S, tokenizer: Arc<Tokenizer>, similarity: Bm25Params) -> Self {
        Self {
            segment,
            tokenizer,
            similarity,
        }
    }

    pub fn segment(&self) -> &'a S {
        self.segment
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn similarity(&self) -> &Bm25Params {
        &self.similarity
    }

    /// Number of documents in the segment
    pub fn total_docs(&self) -> Result<u64> {
        Ok(self.segment.collection_stats(ID_FIELD)?.total_document_count())
    }

    /// Documents containing `term` in `field`, scored with BM25
    pub fn term_matches(&self, field: &str, term: &[u8]) -> Result<Matches> {
        let stats = self.segment.collection_stats(field)?;
        let mut postings = self
            .segment
            .postings_iterator(term, field, PostingsOptions::SCORING)?;
        let doc_freq = postings.count();

        let mut matches = Matches::new();
        while let Some(posting) = postings.next()? {
            let score = self.score_posting(posting, doc_freq, stats.as_ref());
            matches.insert(posting.number, score);
        }
        Ok(matches)
    }

    /// Union of the matches of every listed term
    pub fn terms_matches(&self, field: &str, terms: &[String]) -> Result<Matches> {
        let mut matches = Matches::new();
        for term in terms {
            matches = matches.union(self.term_matches(field, term.as_bytes())?);
        }
        Ok(matches)
    }

    /// Dictionary terms of `field` accepted by `automaton` within `[start, end)`
    pub fn expand_terms<A: Automaton>(
        &self,
        field: &str,
        automaton: A,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
    ) -> Result<Vec<String>> {
        let mut iter = self.segment.dictionary_iterator(field, automaton, start, end)?;
        let mut terms = Vec::new();
        while let Some(entry) = iter.next()? {
            terms.push(entry.term.to_string());
        }
        Ok(terms)
    }

    /// Positions of `term` in `field`, one entry per occurrence, by document
    pub fn term_positions(&self, field: &str, term: &[u8]) -> Result<Vec<(u64, Vec<usize>)>> {
        let mut postings = self
            .segment
            .postings_iterator(term, field, PostingsOptions::ALL)?;
        let mut out = Vec::new();
        while let Some(posting) = postings.next()? {
            let positions = posting.locations.iter().map(|loc| loc.pos).collect();
            out.push((posting.number, positions));
        }
        Ok(out)
    }

    fn score_posting(&self, posting: &Posting, doc_freq: u64, stats: &dyn CollectionStats) -> f32 {
        // norm is 1/sqrt(len)
        let doc_len = if posting.norm > 0.0 {
            (1.0 / (posting.norm * posting.norm)) as f32
        } else {
            0.0
        };
        bm25_score(
            posting.frequency as f32,
            doc_freq,
            stats.document_count(),
            doc_len,
            stats.average_field_length() as f32,
            &self.similarity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourConfig;
    use crate::models::{Document, Field};
    use crate::Sour;
    use fst::automaton::{AlwaysMatch, Str};

    fn sour() -> Sour {
        Sour::with_document(
            SourConfig::default(),
            Document::new("A").add_field(Field::text("slogan", "code match code")),
        )
    }

    fn ctx(sour: &Sour) -> QueryContext<'_, Sour> {
        QueryContext::new(sour, sour.tokenizer().clone(), Bm25Params::default())
    }

    #[test]
    fn test_term_matches() {
        let sour = sour();
        let ctx = ctx(&sour);

        let matches = ctx.term_matches("slogan", b"code").unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches.score(0).unwrap() > 0.0);

        assert!(ctx.term_matches("slogan", b"nope").unwrap().is_empty());
        assert!(ctx.term_matches("missing", b"code").unwrap().is_empty());
    }

    #[test]
    fn test_higher_frequency_scores_higher() {
        let sour = sour();
        let ctx = ctx(&sour);

        let code = ctx.term_matches("slogan", b"code").unwrap().score(0).unwrap();
        let once = ctx.term_matches("slogan", b"match").unwrap().score(0).unwrap();
        assert!(code > once);
    }

    #[test]
    fn test_expand_terms() {
        let sour = sour();
        let ctx = ctx(&sour);

        assert_eq!(
            ctx.expand_terms("slogan", AlwaysMatch, None, None).unwrap(),
            vec!["code", "match"]
        );
        assert_eq!(
            ctx.expand_terms("slogan", Str::new("m").starts_with(), None, None)
                .unwrap(),
            vec!["match"]
        );
    }

    #[test]
    fn test_term_positions() {
        let sour = sour();
        let ctx = ctx(&sour);

        assert_eq!(
            ctx.term_positions("slogan", b"code").unwrap(),
            vec![(0, vec![1, 3])]
        );
        assert_eq!(ctx.total_docs().unwrap(), 1);
    }
}
