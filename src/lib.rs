//! Single-document virtual index segment
//!
//! [`Sour`] analyzes one document at a time and exposes it through the
//! [`Segment`] read contract, so the regular query pipeline can decide
//! whether that document matches a query and how well it scores.

pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod search;
pub mod segment;
pub mod sour;
pub mod tokenizer;

pub use config::{Bm25Params, SourConfig, TokenizerConfig};
pub use error::{Result, SourError};
pub use models::{Document, Field, FieldValue, ID_FIELD};
pub use query::{Query, QueryNode, QueryParser};
pub use search::{Aggregation, Aggregations, DocumentMatch, DocumentMatchIterator, SearchRequest};
pub use segment::{Segment, INTERNAL_DOC_NUMBER};
pub use sour::Sour;
pub use tokenizer::Tokenizer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
