//! Abstract Syntax Tree for query representation
//!
//! This module defines the `QueryNode` trait that all query types implement
//! and the `Query` tree that the parser and search requests pass around.

use std::fmt::Debug;

use roaring::RoaringTreemap;

use crate::segment::Segment;
use crate::Result;

use super::context::QueryContext;
use super::nodes::{
    BoolQuery, DateRangeQuery, FuzzyQuery, MatchQuery, NumericRangeQuery, PhraseQuery,
    PrefixQuery, RegexpQuery, TermQuery, WildcardQuery,
};
use super::types::Matches;

/// Core trait for all query nodes in the AST
///
/// Execution is generic over the segment, so a node runs unchanged against
/// any `Segment` implementation.
pub trait QueryNode: Debug {
    /// Execute the query and return matching document numbers with scores
    ///
    /// A field the segment does not have contributes no matches; it is
    /// never an error.
    fn execute<S: Segment>(&self, ctx: &QueryContext<'_, S>) -> Result<Matches>;

    /// Get the query type name for debugging and logging
    fn query_type(&self) -> &'static str;

    /// Get the boost factor for this query
    fn boost(&self) -> f32 {
        1.0
    }
}

/// A query tree
#[derive(Clone, Debug)]
pub enum Query {
    Term(TermQuery),
    Match(MatchQuery),
    MatchPhrase(PhraseQuery),
    NumericRange(NumericRangeQuery),
    DateRange(DateRangeQuery),
    Prefix(PrefixQuery),
    Wildcard(WildcardQuery),
    Regexp(RegexpQuery),
    Fuzzy(FuzzyQuery),
    Bool(BoolQuery),
    MatchAll(MatchAllQuery),
    MatchNone(MatchNoneQuery),
}

macro_rules! query_variants {
    ($($variant:ident($node:ty)),* $(,)?) => {
        $(
            impl From<$node> for Query {
                fn from(node: $node) -> Self {
                    Query::$variant(node)
                }
            }
        )*

        impl QueryNode for Query {
            fn execute<S: Segment>(&self, ctx: &QueryContext<'_, S>) -> Result<Matches> {
                match self {
                    $(Query::$variant(node) => node.execute(ctx),)*
                }
            }

            fn query_type(&self) -> &'static str {
                match self {
                    $(Query::$variant(node) => node.query_type(),)*
                }
            }

            fn boost(&self) -> f32 {
                match self {
                    $(Query::$variant(node) => node.boost(),)*
                }
            }
        }
    };
}

query_variants!(
    Term(TermQuery),
    Match(MatchQuery),
    MatchPhrase(PhraseQuery),
    NumericRange(NumericRangeQuery),
    DateRange(DateRangeQuery),
    Prefix(PrefixQuery),
    Wildcard(WildcardQuery),
    Regexp(RegexpQuery),
    Fuzzy(FuzzyQuery),
    Bool(BoolQuery),
    MatchAll(MatchAllQuery),
    MatchNone(MatchNoneQuery),
);

/// A query that matches all documents
#[derive(Clone, Debug)]
pub struct MatchAllQuery {
    pub boost: f32,
}

impl Default for MatchAllQuery {
    fn default() -> Self {
        Self { boost: 1.0 }
    }
}

impl QueryNode for MatchAllQuery {
    fn execute<S: Segment>(&self, ctx: &QueryContext<'_, S>) -> Result<Matches> {
        let docs: RoaringTreemap = (0..ctx.total_docs()?).collect();
        Ok(Matches::from_docs(docs, self.boost))
    }

    fn query_type(&self) -> &'static str {
        "match_all"
    }

    fn boost(&self) -> f32 {
        self.boost
    }
}

/// A query that matches no documents
#[derive(Clone, Debug, Default)]
pub struct MatchNoneQuery;

impl QueryNode for MatchNoneQuery {
    fn execute<S: Segment>(&self, _ctx: &QueryContext<'_, S>) -> Result<Matches> {
        Ok(Matches::new())
    }

    fn query_type(&self) -> &'static str {
        "match_none"
    }
}
