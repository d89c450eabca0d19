//! Search requests over a segment
//!
//! A [`SearchRequest`] pairs a query with result windowing and
//! aggregations. Executing it scores every match, feeds the aggregations,
//! and keeps the top hits in score order.

mod collector;
mod request;

pub use collector::{
    AggregationValue, Aggregations, DocumentMatch, DocumentMatchIterator, TermBucket,
    TopNCollector,
};
pub use request::{Aggregation, SearchRequest};
