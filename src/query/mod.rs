//! Query DSL and execution engine
//!
//! Queries run against any [`Segment`](crate::segment::Segment), reading
//! only through its dictionary, postings and statistics. Supported:
//! - Boolean queries (must, should, must_not, filter)
//! - Term queries (exact match)
//! - Match and phrase queries (analyzed full-text search)
//! - Numeric and date range queries
//! - Prefix, wildcard, regexp and fuzzy queries (automaton driven)
//!
//! # Example
//!
//! ```json
//! {
//!   "query": {
//!     "bool": {
//!       "must": [
//!         { "match": { "content": "rust programming" } }
//!       ],
//!       "filter": [
//!         { "range": { "created_at": { "gte": "2024-01-01T00:00:00Z" } } }
//!       ]
//!     }
//!   }
//! }
//! ```

pub mod ast;
pub mod automaton;
pub mod context;
pub mod nodes;
pub mod parser;
pub mod types;

pub use ast::{MatchAllQuery, MatchNoneQuery, Query, QueryNode};
pub use automaton::{LevenshteinAutomaton, RegexAutomaton};
pub use context::QueryContext;
pub use nodes::{
    BoolQuery, DateRangeQuery, FuzzyQuery, MatchQuery, NumericRangeQuery, PhraseQuery,
    PrefixQuery, RegexpQuery, TermQuery, WildcardQuery,
};
pub use parser::QueryParser;
pub use types::*;
