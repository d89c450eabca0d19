//! Wildcard query - matches terms using wildcards
//!
//! Supports:
//! - `*` - matches any sequence of characters
//! - `?` - matches any single character
//!
//! # Example
//!
//! ```rust
//! use sour::query::WildcardQuery;
//!
//! let query = WildcardQuery::new("title", "prog*");
//! ```

use serde::{Deserialize, Serialize};

use crate::query::ast::QueryNode;
use crate::query::automaton::RegexAutomaton;
use crate::query::context::QueryContext;
use crate::query::types::Matches;
use crate::segment::Segment;
use crate::Result;

use super::default_boost;

/// Query that matches terms using wildcard patterns
///
/// The pattern can include:
/// - `*` to match any sequence of characters (including empty)
/// - `?` to match exactly one character
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WildcardQuery {
    /// Field to search in
    pub field: String,
    /// Wildcard pattern
    pub pattern: String,
    /// Boost factor for scoring
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl WildcardQuery {
    /// Create a new wildcard query
    pub fn new(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            pattern: pattern.into(),
            boost: 1.0,
        }
    }

    /// Set the boost factor
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Check if the pattern has any wildcards
    pub fn has_wildcards(&self) -> bool {
        self.pattern.contains('*') || self.pattern.contains('?')
    }
}

impl QueryNode for WildcardQuery {
    fn execute<S: Segment>(&self, ctx: &QueryContext<'_, S>) -> Result<Matches> {
        // No wildcards: plain term lookup
        let mut matches = if !self.has_wildcards() {
            ctx.term_matches(&self.field, self.pattern.as_bytes())?
        } else {
            let automaton = RegexAutomaton::wildcard(&self.pattern)?;
            let prefix = automaton.prefix().to_string();
            let start = (!prefix.is_empty()).then(|| prefix.as_bytes());
            let terms = ctx.expand_terms(&self.field, automaton, start, None)?;
            ctx.terms_matches(&self.field, &terms)?
        };
        matches.boost(self.boost);
        Ok(matches)
    }

    fn query_type(&self) -> &'static str {
        "wildcard"
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
    fn test_has_wildcards() {
        assert!(WildcardQuery::new("title", "prog*").has_wildcards());
        assert!(WildcardQuery::new("title", "te?t").has_wildcards());
        assert!(!WildcardQuery::new("title", "test").has_wildcards());
    }

    #[test]
    fn test_wildcard_query_execute() {
        let sour = testing::sour();
        let ctx = testing::ctx(&sour);

        let hits = |pattern: &str| {
            WildcardQuery::new("title", pattern)
                .execute(&ctx)
                .unwrap()
                .len()
        };
        assert_eq!(hits("dev*"), 1);
        assert_eq!(hits("*ware"), 1);
        assert_eq!(hits("s?ftware"), 1);
        assert_eq!(hits("developer"), 1);
        assert_eq!(hits("dev?"), 0);
        assert_eq!(hits("*x*"), 0);
    }
}
