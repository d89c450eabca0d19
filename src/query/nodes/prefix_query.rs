//! Prefix query - matches terms starting with a prefix
//!
//! A prefix query matches all terms that begin with the specified prefix.
//! This is cheaper than a wildcard query with a trailing `*`: the
//! dictionary scan starts at the prefix itself.
//!
//! # Example
//!
//! ```rust
//! use sour::query::PrefixQuery;
//!
//! // Match terms starting with "prog" (programming, progress, etc.)
//! let query = PrefixQuery::new("content", "prog");
//! ```

use fst::automaton::Str;
use fst::Automaton;
use serde::{Deserialize, Serialize};

use crate::query::ast::QueryNode;
use crate::query::context::QueryContext;
use crate::query::types::Matches;
use crate::segment::Segment;
use crate::Result;

use super::default_boost;

/// Query that matches terms starting with a prefix
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrefixQuery {
    /// Field to search in
    pub field: String,
    /// Prefix to match
    pub prefix: String,
    /// Maximum number of terms to expand (default: 50)
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,
    /// Boost factor for scoring
    #[serde(default = "default_boost")]
    pub boost: f32,
}

fn default_max_expansions() -> usize {
    50
}

impl PrefixQuery {
    /// Create a new prefix query
    pub fn new(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            prefix: prefix.into(),
            max_expansions: 50,
            boost: 1.0,
        }
    }

    /// Set the maximum number of terms to expand
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    /// Set the boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl QueryNode for PrefixQuery {
    fn execute<S: Segment>(&self, ctx: &QueryContext<'_, S>) -> Result<Matches> {
        let automaton = Str::new(&self.prefix).starts_with();
        let mut terms =
            ctx.expand_terms(&self.field, automaton, Some(self.prefix.as_bytes()), None)?;
        terms.truncate(self.max_expansions);

        let mut matches = ctx.terms_matches(&self.field, &terms)?;
        matches.boost(self.boost);
        Ok(matches)
    }

    fn query_type(&self) -> &'static str {
        "prefix"
    }

    fn boost(&self) -> f32 {
        self.boost
    }
}
