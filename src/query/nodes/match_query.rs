//! Match query - full-text search with analysis

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::query::ast::QueryNode;
use crate::query::context::QueryContext;
use crate::query::types::{Matches, MatchOperator, MinimumShouldMatch};
use crate::segment::Segment;
use crate::Result;

use super::default_boost;

/// Query that performs full-text search on a field
///
/// The input text goes through the same tokenizer as indexed text and the
/// resulting terms are combined with the specified operator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchQuery {
    /// Field to search in
    pub field: String,
    /// Text to search for (will be analyzed)
    pub text: String,
    /// How to combine terms (AND/OR)
    #[serde(default)]
    pub operator: MatchOperator,
    /// Boost factor for scoring
    #[serde(default = "default_boost")]
    pub boost: f32,
    /// Minimum number of terms that should match (for OR operator)
    #[serde(default)]
    pub minimum_should_match: Option<MinimumShouldMatch>,
}

impl MatchQuery {
    /// Create a new match query
    pub fn new(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            text: text.into(),
            operator: MatchOperator::default(),
            boost: 1.0,
            minimum_should_match: None,
        }
    }

    /// Set the operator to AND (all terms must match)
    pub fn with_and_operator(mut self) -> Self {
        self.operator = MatchOperator::And;
        self
    }

    /// Set the operator to OR (at least one term must match)
    pub fn with_or_operator(mut self) -> Self {
        self.operator = MatchOperator::Or;
        self
    }

    /// Set the boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Set minimum should match
    pub fn with_minimum_should_match(mut self, msm: MinimumShouldMatch) -> Self {
        self.minimum_should_match = Some(msm);
        self
    }
}

impl QueryNode for MatchQuery {
    fn execute<S: Segment>(&self, ctx: &QueryContext<'_, S>) -> Result<Matches> {
        let mut terms = ctx.tokenizer().tokenize(&self.text);
        terms.sort_unstable();
        terms.dedup();

        if terms.is_empty() {
            return Ok(Matches::new());
        }

        let mut result = match self.operator {
            MatchOperator::And => {
                let mut result: Option<Matches> = None;
                for term in &terms {
                    let matches = ctx.term_matches(&self.field, term.as_bytes())?;
                    let combined = match result {
                        Some(r) => r.intersect(&matches),
                        None => matches,
                    };
                    if combined.is_empty() {
                        return Ok(Matches::new());
                    }
                    result = Some(combined);
                }
                result.unwrap_or_default()
            }
            MatchOperator::Or => {
                let mut result = Matches::new();
                let mut match_counts: HashMap<u64, usize> = HashMap::new();
                for term in &terms {
                    let matches = ctx.term_matches(&self.field, term.as_bytes())?;
                    for number in matches.docs().iter() {
                        *match_counts.entry(number).or_insert(0) += 1;
                    }
                    result = result.union(matches);
                }

                if let Some(msm) = &self.minimum_should_match {
                    let min_match = msm.calculate(terms.len());
                    if min_match > 1 {
                        result.retain_counts(&match_counts, min_match);
                    }
                }
                result
            }
        };

        result.boost(self.boost);
        Ok(result)
    }

    fn query_type(&self) -> &'static str {
        "match"
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
    fn test_match_query_creation() {
        let query = MatchQuery::new("content", "rust programming").with_and_operator();
        assert_eq!(query.operator, MatchOperator::And);
        assert_eq!(query.query_type(), "match");
    }

    #[test]
    fn test_match_query_is_analyzed() {
        let sour = testing::sour();
        let ctx = testing::ctx(&sour);

        let matches = MatchQuery::new("title", "DeVeLoPeR").execute(&ctx).unwrap();
        assert_eq!(matches.len(), 1);

        let matches = MatchQuery::new("title", "developers").execute(&ctx).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_match_operators() {
        let sour = testing::sour();
        let ctx = testing::ctx(&sour);

        let or = MatchQuery::new("title", "software engineer");
        assert_eq!(or.execute(&ctx).unwrap().len(), 1);

        let and = MatchQuery::new("title", "software engineer").with_and_operator();
        assert!(and.execute(&ctx).unwrap().is_empty());

        let and = MatchQuery::new("title", "developer software").with_and_operator();
        assert_eq!(and.execute(&ctx).unwrap().len(), 1);
    }

    #[test]
    fn test_minimum_should_match() {
        let sour = testing::sour();
        let ctx = testing::ctx(&sour);

        let query = MatchQuery::new("title", "software engineer")
            .with_minimum_should_match(MinimumShouldMatch::Count(2));
        assert!(query.execute(&ctx).unwrap().is_empty());

        let query = MatchQuery::new("title", "software developer engineer")
            .with_minimum_should_match(MinimumShouldMatch::Percentage("60%".to_string()));
        assert_eq!(query.execute(&ctx).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_text_matches_nothing() {
        let sour = testing::sour();
        let ctx = testing::ctx(&sour);

        assert!(MatchQuery::new("title", "  ").execute(&ctx).unwrap().is_empty());
    }
}
