//! Term query - exact match on a field

use serde::{Deserialize, Serialize};

use crate::query::ast::QueryNode;
use crate::query::context::QueryContext;
use crate::query::types::Matches;
use crate::segment::Segment;
use crate::Result;

use super::default_boost;

/// Query that matches documents containing an exact term in a field
///
/// The term is not analyzed: it must equal an indexed term byte for byte.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TermQuery {
    /// Field to search in
    pub field: String,
    /// Exact term to match
    pub term: String,
    /// Boost factor for scoring
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl TermQuery {
    /// Create a new term query
    pub fn new(field: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            term: term.into(),
            boost: 1.0,
        }
    }

    /// Set the boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl QueryNode for TermQuery {
    fn execute<S: Segment>(&self, ctx: &QueryContext<'_, S>) -> Result<Matches> {
        let mut matches = ctx.term_matches(&self.field, self.term.as_bytes())?;
        matches.boost(self.boost);
        Ok(matches)
    }

    fn query_type(&self) -> &'static str {
        "term"
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
    fn test_term_query_creation() {
        let query = TermQuery::new("title", "rust").with_boost(2.5);
        assert_eq!(query.field, "title");
        assert_eq!(query.term, "rust");
        assert_eq!(query.boost, 2.5);
        assert_eq!(query.query_type(), "term");
    }

    #[test]
    fn test_term_query_execute() {
        let sour = testing::sour();
        let ctx = testing::ctx(&sour);

        assert_eq!(TermQuery::new("_id", "A").execute(&ctx).unwrap().len(), 1);
        assert_eq!(TermQuery::new("name", "marty").execute(&ctx).unwrap().len(), 1);
        assert!(TermQuery::new("name", "bob").execute(&ctx).unwrap().is_empty());
        assert!(TermQuery::new("nope", "marty").execute(&ctx).unwrap().is_empty());
    }

    #[test]
    fn test_term_query_is_not_analyzed() {
        let sour = testing::sour();
        let ctx = testing::ctx(&sour);

        assert!(TermQuery::new("title", "Developer")
            .execute(&ctx)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_boost_scales_score() {
        let sour = testing::sour();
        let ctx = testing::ctx(&sour);

        let plain = TermQuery::new("name", "marty").execute(&ctx).unwrap();
        let boosted = TermQuery::new("name", "marty")
            .with_boost(2.0)
            .execute(&ctx)
            .unwrap();
        assert_eq!(boosted.score(0).unwrap(), plain.score(0).unwrap() * 2.0);
    }
}
