//! Regexp query - matches terms against a regular expression
//!
//! The expression must match the whole term; `co.e` matches `code` but
//! not `codes`.

use serde::{Deserialize, Serialize};

use crate::query::ast::QueryNode;
use crate::query::automaton::RegexAutomaton;
use crate::query::context::QueryContext;
use crate::query::types::Matches;
use crate::segment::Segment;
use crate::Result;

use super::default_boost;

/// Query that matches terms with a regular expression
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegexpQuery {
    /// Field to search in
    pub field: String,
    /// Regular expression (regex crate syntax)
    pub pattern: String,
    /// Boost factor for scoring
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl RegexpQuery {
    pub fn new(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            pattern: pattern.into(),
            boost: 1.0,
        }
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl QueryNode for RegexpQuery {
    fn execute<S: Segment>(&self, ctx: &QueryContext<'_, S>) -> Result<Matches> {
        let automaton = RegexAutomaton::new(&self.pattern)?;
        let prefix = automaton.prefix().to_string();
        let start = (!prefix.is_empty()).then(|| prefix.as_bytes());

        let terms = ctx.expand_terms(&self.field, automaton, start, None)?;
        let mut matches = ctx.terms_matches(&self.field, &terms)?;
        matches.boost(self.boost);
        Ok(matches)
    }

    fn query_type(&self) -> &'static str {
        "regexp"
    }

    fn boost(&self) -> f32 {
        self.boost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourError;
    use crate::query::nodes::testing;

    #[test]
    fn test_regexp_query_execute() {
        let sour = testing::sour();
        let ctx = testing::ctx(&sour);

        assert_eq!(RegexpQuery::new("slogan", "co.[d-f]").execute(&ctx).unwrap().len(), 1);
        assert_eq!(RegexpQuery::new("slogan", "m.*|x").execute(&ctx).unwrap().len(), 1);
        assert!(RegexpQuery::new("slogan", "co").execute(&ctx).unwrap().is_empty());
        assert!(RegexpQuery::new("nope", ".*").execute(&ctx).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let sour = testing::sour();
        let ctx = testing::ctx(&sour);

        let err = RegexpQuery::new("slogan", "co(").execute(&ctx).unwrap_err();
        assert!(matches!(err, SourError::InvalidQuery(_)));
    }
}
