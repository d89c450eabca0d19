//! Range queries - match documents with numeric or date values in a range
//!
//! Numbers and dates are indexed as fixed-width, order-preserving terms, so
//! a range is a bounded scan of the field's term dictionary. Both queries
//! are constant scoring.

use chrono::{DateTime, Utc};
use fst::automaton::AlwaysMatch;
use roaring::RoaringTreemap;
use serde::{Deserialize, Serialize};

use crate::models::numeric::{date_term, numeric_term, term_successor};
use crate::query::ast::QueryNode;
use crate::query::context::QueryContext;
use crate::query::types::Matches;
use crate::segment::Segment;
use crate::Result;

use super::default_boost;

/// Query that matches numeric field values within a range
///
/// Defaults follow the half-open convention: the minimum is inclusive and
/// the maximum exclusive.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NumericRangeQuery {
    /// Field to search in
    pub field: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    #[serde(default = "default_true")]
    pub inclusive_min: bool,
    #[serde(default)]
    pub inclusive_max: bool,
    /// Boost factor for scoring
    #[serde(default = "default_boost")]
    pub boost: f32,
}

fn default_true() -> bool {
    true
}

impl NumericRangeQuery {
    /// Create an unbounded range query
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            min: None,
            max: None,
            inclusive_min: true,
            inclusive_max: false,
            boost: 1.0,
        }
    }

    /// `[min, max)`
    pub fn between(field: impl Into<String>, min: f64, max: f64) -> Self {
        Self::new(field).gte(min).lt(max)
    }

    /// Set the greater-than-or-equal bound
    pub fn gte(mut self, value: f64) -> Self {
        self.min = Some(value);
        self.inclusive_min = true;
        self
    }

    /// Set the greater-than bound
    pub fn gt(mut self, value: f64) -> Self {
        self.min = Some(value);
        self.inclusive_min = false;
        self
    }

    /// Set the less-than-or-equal bound
    pub fn lte(mut self, value: f64) -> Self {
        self.max = Some(value);
        self.inclusive_max = true;
        self
    }

    /// Set the less-than bound
    pub fn lt(mut self, value: f64) -> Self {
        self.max = Some(value);
        self.inclusive_max = false;
        self
    }

    /// Set the boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl QueryNode for NumericRangeQuery {
    fn execute<S: Segment>(&self, ctx: &QueryContext<'_, S>) -> Result<Matches> {
        if self.min.map_or(false, f64::is_nan) || self.max.map_or(false, f64::is_nan) {
            return Ok(Matches::new());
        }
        let min = self.min.map(|value| (numeric_term(value), self.inclusive_min));
        let max = self.max.map(|value| (numeric_term(value), self.inclusive_max));
        term_range_matches(ctx, &self.field, min, max, self.boost)
    }

    fn query_type(&self) -> &'static str {
        "numeric_range"
    }

    fn boost(&self) -> f32 {
        self.boost
    }
}

/// Query that matches date-time field values within a range
///
/// Same bound conventions as [`NumericRangeQuery`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DateRangeQuery {
    /// Field to search in
    pub field: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub inclusive_start: bool,
    #[serde(default)]
    pub inclusive_end: bool,
    /// Boost factor for scoring
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl DateRangeQuery {
    /// Create an unbounded range query
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            start: None,
            end: None,
            inclusive_start: true,
            inclusive_end: false,
            boost: 1.0,
        }
    }

    /// `[start, end)`
    pub fn between(field: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(field).gte(start).lt(end)
    }

    pub fn gte(mut self, value: DateTime<Utc>) -> Self {
        self.start = Some(value);
        self.inclusive_start = true;
        self
    }

    pub fn gt(mut self, value: DateTime<Utc>) -> Self {
        self.start = Some(value);
        self.inclusive_start = false;
        self
    }

    pub fn lte(mut self, value: DateTime<Utc>) -> Self {
        self.end = Some(value);
        self.inclusive_end = true;
        self
    }

    pub fn lt(mut self, value: DateTime<Utc>) -> Self {
        self.end = Some(value);
        self.inclusive_end = false;
        self
    }

    /// Set the boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl QueryNode for DateRangeQuery {
    fn execute<S: Segment>(&self, ctx: &QueryContext<'_, S>) -> Result<Matches> {
        let start = self.start.map(|value| (date_term(&value), self.inclusive_start));
        let end = self.end.map(|value| (date_term(&value), self.inclusive_end));
        term_range_matches(ctx, &self.field, start, end, self.boost)
    }

    fn query_type(&self) -> &'static str {
        "date_range"
    }

    fn boost(&self) -> f32 {
        self.boost
    }
}

/// Constant-score matches for every term in the given range.
///
/// Each bound is an encoded term and whether it is inclusive.
fn term_range_matches<S: Segment>(
    ctx: &QueryContext<'_, S>,
    field: &str,
    lower: Option<(String, bool)>,
    upper: Option<(String, bool)>,
    boost: f32,
) -> Result<Matches> {
    let start = lower.map(|(term, inclusive)| if inclusive { term } else { term_successor(&term) });
    let end = upper.map(|(term, inclusive)| if inclusive { term_successor(&term) } else { term });

    let terms = ctx.expand_terms(
        field,
        AlwaysMatch,
        start.as_deref().map(str::as_bytes),
        end.as_deref().map(str::as_bytes),
    )?;

    let mut docs = RoaringTreemap::new();
    for term in &terms {
        docs |= ctx.term_matches(field, term.as_bytes())?.docs();
    }
    Ok(Matches::from_docs(docs, boost))
}
