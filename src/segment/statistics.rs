//! Collection statistics for scoring
//!
//! A single-document segment reports a universe of exactly one document.

use crate::config::Bm25Params;

/// Aggregate statistics of one field across a segment's documents
pub trait CollectionStats {
    fn total_document_count(&self) -> u64;

    /// Number of documents with at least one term in the field
    fn document_count(&self) -> u64;

    /// Total number of tokens in the field across all documents
    fn sum_total_term_frequency(&self) -> u64;

    /// Fold in the statistics of another segment
    fn merge(&mut self, other: &dyn CollectionStats);

    /// Average field length in tokens
    fn average_field_length(&self) -> f64 {
        let docs = self.document_count();
        if docs == 0 {
            0.0
        } else {
            self.sum_total_term_frequency() as f64 / docs as f64
        }
    }
}

/// Fixed statistics of a one-document segment
///
/// `sum_total_term_frequency` is pinned at 1 rather than the field's real
/// token count, so length-based similarity scores are approximate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SingleDocumentStats;

impl CollectionStats for SingleDocumentStats {
    fn total_document_count(&self) -> u64 {
        1
    }

    fn document_count(&self) -> u64 {
        1
    }

    fn sum_total_term_frequency(&self) -> u64 {
        1
    }

    fn merge(&mut self, _other: &dyn CollectionStats) {}
}

/// Compute BM25 score for a term occurrence
pub fn bm25_score(
    tf: f32,
    df: u64,
    total_docs: u64,
    doc_len: f32,
    avgdl: f32,
    params: &Bm25Params,
) -> f32 {
    if total_docs == 0 || tf <= 0.0 {
        return 0.0;
    }

    // IDF with Robertson-Sparck-Jones formula
    let n = total_docs as f32;
    let df = df as f32;
    let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

    let norm = if avgdl > 0.0 {
        1.0 - params.b + params.b * (doc_len / avgdl)
    } else {
        1.0
    };

    idf * (tf * (params.k1 + 1.0)) / (tf + params.k1 * norm)
}
