//! Boolean query - combines multiple clauses with AND, OR, NOT semantics

use std::collections::HashMap;

use crate::query::ast::{MatchAllQuery, Query, QueryNode};
use crate::query::context::QueryContext;
use crate::query::types::{Matches, MinimumShouldMatch};
use crate::segment::Segment;
use crate::Result;

/// Boolean query combining multiple clauses
///
/// The boolean query supports four types of clauses:
/// - `must`: All clauses must match (AND). Contributes to score.
/// - `should`: At least one clause should match (OR). Contributes to score.
/// - `must_not`: No clause must match (NOT). Does not contribute to score.
/// - `filter`: All clauses must match (AND). Does not contribute to score.
///
/// When `must` or `filter` clauses are present, `should` clauses only add
/// to the score unless `minimum_should_match` is set explicitly.
///
/// # Example
///
/// ```json
/// {
///   "bool": {
///     "must": [
///       { "match": { "content": "rust programming" } }
///     ],
///     "should": [
///       { "term": { "tags": "tutorial" } }
///     ],
///     "must_not": [
///       { "term": { "status": "draft" } }
///     ]
///   }
/// }
/// ```
#[derive(Clone, Debug)]
pub struct BoolQuery {
    /// Clauses that must match (AND, scoring)
    pub must: Vec<Query>,
    /// Clauses where at least one should match (OR, scoring)
    pub should: Vec<Query>,
    /// Clauses that must not match (NOT, no scoring)
    pub must_not: Vec<Query>,
    /// Clauses that must match (AND, no scoring)
    pub filter: Vec<Query>,
    /// Minimum number of should clauses that must match
    pub minimum_should_match: Option<MinimumShouldMatch>,
    /// Boost factor for scoring
    pub boost: f32,
}

impl Default for BoolQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl BoolQuery {
    /// Create a new empty boolean query
    pub fn new() -> Self {
        Self {
            must: Vec::new(),
            should: Vec::new(),
            must_not: Vec::new(),
            filter: Vec::new(),
            minimum_should_match: None,
            boost: 1.0,
        }
    }

    /// Add a must clause
    pub fn must(mut self, query: impl Into<Query>) -> Self {
        self.must.push(query.into());
        self
    }

    /// Add a should clause
    pub fn should(mut self, query: impl Into<Query>) -> Self {
        self.should.push(query.into());
        self
    }

    /// Add a must_not clause
    pub fn must_not(mut self, query: impl Into<Query>) -> Self {
        self.must_not.push(query.into());
        self
    }

    /// Add a filter clause
    pub fn filter(mut self, query: impl Into<Query>) -> Self {
        self.filter.push(query.into());
        self
    }

    /// Set minimum should match
    pub fn with_minimum_should_match(mut self, msm: MinimumShouldMatch) -> Self {
        self.minimum_should_match = Some(msm);
        self
    }

    /// Set boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Check if this is an empty query
    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
            && self.should.is_empty()
            && self.must_not.is_empty()
            && self.filter.is_empty()
    }

    /// Get total number of clauses
    pub fn clause_count(&self) -> usize {
        self.must.len() + self.should.len() + self.must_not.len() + self.filter.len()
    }

    fn execute_should<S: Segment>(
        &self,
        ctx: &QueryContext<'_, S>,
    ) -> Result<(Matches, HashMap<u64, usize>)> {
        let mut should_matches = Matches::new();
        let mut match_counts: HashMap<u64, usize> = HashMap::new();
        for query in &self.should {
            let matches = query.execute(ctx)?;
            for number in matches.docs().iter() {
                *match_counts.entry(number).or_insert(0) += 1;
            }
            should_matches = should_matches.union(matches);
        }
        Ok((should_matches, match_counts))
    }
}

impl QueryNode for BoolQuery {
    fn execute<S: Segment>(&self, ctx: &QueryContext<'_, S>) -> Result<Matches> {
        // Empty bool query matches all documents
        if self.is_empty() {
            return MatchAllQuery { boost: self.boost }.execute(ctx);
        }

        let mut result: Option<Matches> = None;

        // Execute FILTER clauses first (non-scoring)
        for query in &self.filter {
            let matches = query.execute(ctx)?;
            let unscored = Matches::from_docs(matches.docs().clone(), 0.0);
            let combined = match result {
                Some(r) => r.intersect(&unscored),
                None => unscored,
            };
            if combined.is_empty() {
                return Ok(Matches::new());
            }
            result = Some(combined);
        }

        // Execute MUST clauses (all required, scoring)
        for query in &self.must {
            let matches = query.execute(ctx)?;
            let combined = match result {
                Some(r) => r.intersect(&matches),
                None => matches,
            };
            if combined.is_empty() {
                return Ok(Matches::new());
            }
            result = Some(combined);
        }

        // Execute SHOULD clauses
        if !self.should.is_empty() {
            let (mut should_matches, match_counts) = self.execute_should(ctx)?;

            let required = result.is_some();
            let min_match = match &self.minimum_should_match {
                Some(msm) => msm.calculate(self.should.len()),
                None if required => 0,
                None => 1,
            };
            if min_match > 1 {
                should_matches.retain_counts(&match_counts, min_match);
            }

            result = Some(match result {
                // should clauses determine matches
                None => should_matches,
                Some(r) if min_match > 0 => r.intersect(&should_matches),
                // should clauses only add to the score
                Some(r) => {
                    let in_result = Matches::from_docs(r.docs().clone(), 0.0);
                    r.union(should_matches.intersect(&in_result))
                }
            });
        }

        // Only must_not clauses: exclude from everything
        let mut result = match result {
            Some(r) => r,
            None => MatchAllQuery::default().execute(ctx)?,
        };

        // Execute MUST_NOT clauses (exclusion)
        for query in &self.must_not {
            let matches = query.execute(ctx)?;
            result = result.difference(&matches);
        }

        result.boost(self.boost);
        Ok(result)
    }

    fn query_type(&self) -> &'static str {
        "bool"
    }

    fn boost(&self) -> f32 {
        self.boost
    }
}
