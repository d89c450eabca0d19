//! Query DSL parser
//!
//! Parses JSON query DSL into a [`Query`] tree.
//! The syntax is compatible with a subset of Elasticsearch Query DSL.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::SourError;
use crate::models::numeric::numeric_term;
use crate::query::ast::{MatchAllQuery, MatchNoneQuery, Query};
use crate::query::nodes::{
    BoolQuery, DateRangeQuery, FuzzyQuery, MatchQuery, NumericRangeQuery, PhraseQuery,
    PrefixQuery, RegexpQuery, TermQuery, WildcardQuery,
};
use crate::query::types::{MatchOperator, MinimumShouldMatch};
use crate::Result;

/// Query parser for JSON DSL
pub struct QueryParser;

fn invalid(message: impl Into<String>) -> SourError {
    SourError::InvalidQuery(message.into())
}

fn boost_of(spec: &Map<String, Value>) -> f32 {
    spec.get("boost").and_then(Value::as_f64).unwrap_or(1.0) as f32
}

/// Render a scalar as the term it would have been indexed as
///
/// Numbers use the numeric field encoding.
fn scalar_term(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => n.as_f64().map(numeric_term),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl QueryParser {
    /// Parse a JSON query into a query tree
    ///
    /// # Example
    ///
    /// ```json
    /// {
    ///   "bool": {
    ///     "must": [
    ///       { "match": { "content": "rust" } }
    ///     ],
    ///     "filter": [
    ///       { "range": { "year": { "gte": 2024 } } }
    ///     ]
    ///   }
    /// }
    /// ```
    pub fn parse(json: &Value) -> Result<Query> {
        match json {
            Value::Object(map) => Self::parse_query_object(map),
            _ => Err(invalid("Query must be a JSON object")),
        }
    }

    /// Parse a JSON string into a query tree
    pub fn parse_str(json_str: &str) -> Result<Query> {
        let value: Value = serde_json::from_str(json_str)?;
        Self::parse(&value)
    }

    fn parse_query_object(map: &Map<String, Value>) -> Result<Query> {
        // Handle wrapped query: { "query": { ... } }
        if let Some(query) = map.get("query") {
            return Self::parse(query);
        }

        let (kind, body) = match map.iter().next() {
            Some(entry) if map.len() == 1 => entry,
            _ => {
                return Err(invalid(format!(
                    "Query object must have exactly one query type. Got keys: {:?}",
                    map.keys().collect::<Vec<_>>()
                )))
            }
        };

        match kind.as_str() {
            "bool" => Self::parse_bool(body),
            "match" => Self::parse_match(body),
            "match_phrase" => Self::parse_match_phrase(body),
            "match_all" => Ok(MatchAllQuery {
                boost: body.as_object().map_or(1.0, boost_of),
            }
            .into()),
            "match_none" => Ok(MatchNoneQuery.into()),
            "term" => Self::parse_term(body),
            "range" => Self::parse_range(body),
            "prefix" => Self::parse_pattern(body, "prefix"),
            "wildcard" => Self::parse_pattern(body, "wildcard"),
            "regexp" => Self::parse_pattern(body, "regexp"),
            "fuzzy" => Self::parse_fuzzy(body),
            other => Err(invalid(format!(
                "Unknown query type '{}'. Expected one of: bool, match, match_phrase, \
                 match_all, match_none, term, range, prefix, wildcard, regexp, fuzzy",
                other
            ))),
        }
    }

    /// The single `{ "field": spec }` entry of a field-level query
    fn field_spec<'v>(value: &'v Value, kind: &str) -> Result<(&'v String, &'v Value)> {
        let map = value
            .as_object()
            .ok_or_else(|| invalid(format!("{} query must be an object", kind)))?;
        map.iter()
            .next()
            .ok_or_else(|| invalid(format!("{} query must specify a field", kind)))
    }

    /// Parse a bool query
    fn parse_bool(value: &Value) -> Result<Query> {
        let map = value
            .as_object()
            .ok_or_else(|| invalid("bool query must be an object"))?;

        let mut query = BoolQuery::new();
        if let Some(must) = map.get("must") {
            query.must = Self::parse_clause_array(must)?;
        }
        if let Some(should) = map.get("should") {
            query.should = Self::parse_clause_array(should)?;
        }
        if let Some(must_not) = map.get("must_not") {
            query.must_not = Self::parse_clause_array(must_not)?;
        }
        if let Some(filter) = map.get("filter") {
            query.filter = Self::parse_clause_array(filter)?;
        }
        if let Some(msm) = map.get("minimum_should_match") {
            query.minimum_should_match = Some(Self::parse_minimum_should_match(msm)?);
        }
        query.boost = boost_of(map);

        Ok(query.into())
    }

    /// Parse an array of query clauses
    fn parse_clause_array(value: &Value) -> Result<Vec<Query>> {
        match value {
            Value::Array(arr) => arr.iter().map(Self::parse).collect(),
            // Single clause can be provided without array wrapper
            obj @ Value::Object(_) => Ok(vec![Self::parse(obj)?]),
            _ => Err(invalid("Clause must be an array or object")),
        }
    }

    /// Parse minimum_should_match
    fn parse_minimum_should_match(value: &Value) -> Result<MinimumShouldMatch> {
        match value {
            Value::Number(n) => n
                .as_u64()
                .map(|n| MinimumShouldMatch::Count(n as usize))
                .ok_or_else(|| invalid(format!("Invalid minimum_should_match: {}", n))),
            Value::String(s) if s.ends_with('%') => Ok(MinimumShouldMatch::Percentage(s.clone())),
            Value::String(s) => s
                .parse()
                .map(MinimumShouldMatch::Count)
                .map_err(|_| invalid(format!("Invalid minimum_should_match: {}", s))),
            _ => Err(invalid("minimum_should_match must be a number or string")),
        }
    }

    /// Parse a match query
    ///
    /// Format: { "match": { "field": "text" } }
    /// or: { "match": { "field": { "query": "text", "operator": "and" } } }
    fn parse_match(value: &Value) -> Result<Query> {
        let (field, spec) = Self::field_spec(value, "match")?;

        let query = match spec {
            Value::String(text) => MatchQuery::new(field.clone(), text.clone()),
            Value::Object(spec) => {
                let text = spec
                    .get("query")
                    .and_then(Value::as_str)
                    .ok_or_else(|| invalid("match query spec must have 'query' field"))?;

                let mut q = MatchQuery::new(field.clone(), text).with_boost(boost_of(spec));
                if let Some(op) = spec.get("operator").and_then(Value::as_str) {
                    q.operator = match op.to_lowercase().as_str() {
                        "and" => MatchOperator::And,
                        "or" => MatchOperator::Or,
                        other => return Err(invalid(format!("Unknown operator '{}'", other))),
                    };
                }
                if let Some(msm) = spec.get("minimum_should_match") {
                    q.minimum_should_match = Some(Self::parse_minimum_should_match(msm)?);
                }
                q
            }
            _ => return Err(invalid("match query value must be a string or object")),
        };

        Ok(query.into())
    }

    /// Parse a match_phrase query
    ///
    /// Format: { "match_phrase": { "field": "exact phrase" } }
    /// or: { "match_phrase": { "field": { "query": "exact phrase", "slop": 0 } } }
    fn parse_match_phrase(value: &Value) -> Result<Query> {
        let (field, spec) = Self::field_spec(value, "match_phrase")?;

        let query = match spec {
            Value::String(phrase) => PhraseQuery::new(field.clone(), phrase.clone()),
            Value::Object(spec) => {
                let phrase = spec
                    .get("query")
                    .and_then(Value::as_str)
                    .ok_or_else(|| invalid("match_phrase query spec must have 'query' field"))?;

                let mut q = PhraseQuery::new(field.clone(), phrase).with_boost(boost_of(spec));
                if let Some(slop) = spec.get("slop") {
                    q = q.with_slop(small_count(slop, "slop")?);
                }
                q
            }
            _ => return Err(invalid("match_phrase query value must be a string or object")),
        };

        Ok(query.into())
    }

    /// Parse a term query
    ///
    /// Format: { "term": { "field": "value" } }
    /// or: { "term": { "field": { "value": "...", "boost": 2.0 } } }
    fn parse_term(value: &Value) -> Result<Query> {
        let (field, spec) = Self::field_spec(value, "term")?;

        let (term, boost) = match spec {
            Value::Object(spec) => {
                let term = spec
                    .get("value")
                    .and_then(scalar_term)
                    .ok_or_else(|| invalid("term query spec must have a scalar 'value' field"))?;
                (term, boost_of(spec))
            }
            other => {
                let term = scalar_term(other).ok_or_else(|| {
                    invalid("term query value must be a string, number, boolean, or object")
                })?;
                (term, 1.0)
            }
        };

        Ok(TermQuery::new(field.clone(), term).with_boost(boost).into())
    }

    /// Parse a range query
    ///
    /// Numeric bounds build a numeric range; string bounds are read as
    /// RFC 3339 timestamps and build a date range.
    fn parse_range(value: &Value) -> Result<Query> {
        let (field, spec) = Self::field_spec(value, "range")?;
        let spec = spec
            .as_object()
            .ok_or_else(|| invalid("range query spec must be an object"))?;

        let bounds: Vec<(&str, &Value)> = ["gte", "gt", "lte", "lt"]
            .into_iter()
            .filter_map(|key| spec.get(key).map(|value| (key, value)))
            .collect();

        if bounds.iter().all(|(_, value)| value.is_number()) {
            let mut query = NumericRangeQuery::new(field.clone()).with_boost(boost_of(spec));
            for (key, value) in bounds {
                let value = value
                    .as_f64()
                    .ok_or_else(|| invalid(format!("Invalid range bound: {}", value)))?;
                query = match key {
                    "gte" => query.gte(value),
                    "gt" => query.gt(value),
                    "lte" => query.lte(value),
                    _ => query.lt(value),
                };
            }
            return Ok(query.into());
        }

        let mut query = DateRangeQuery::new(field.clone()).with_boost(boost_of(spec));
        for (key, value) in bounds {
            let value = Self::parse_date(value)?;
            query = match key {
                "gte" => query.gte(value),
                "gt" => query.gt(value),
                "lte" => query.lte(value),
                _ => query.lt(value),
            };
        }
        Ok(query.into())
    }

    fn parse_date(value: &Value) -> Result<DateTime<Utc>> {
        let text = value
            .as_str()
            .ok_or_else(|| invalid(format!("Range bounds must all be numbers or dates: {}", value)))?;
        DateTime::parse_from_rfc3339(text)
            .map(|date| date.with_timezone(&Utc))
            .map_err(|e| invalid(format!("Invalid date '{}': {}", text, e)))
    }

    /// Parse a prefix, wildcard or regexp query
    ///
    /// Format: { "<kind>": { "field": "pattern" } }
    /// or: { "<kind>": { "field": { "value": "pattern", "boost": 1.5 } } }
    fn parse_pattern(value: &Value, kind: &str) -> Result<Query> {
        let (field, spec) = Self::field_spec(value, kind)?;

        let (pattern, boost) = match spec {
            Value::String(p) => (p.clone(), 1.0),
            Value::Object(spec) => {
                let pattern = spec
                    .get("value")
                    .and_then(Value::as_str)
                    .ok_or_else(|| invalid(format!("{} query spec must have 'value' field", kind)))?;
                (pattern.to_string(), boost_of(spec))
            }
            _ => {
                return Err(invalid(format!(
                    "{} query value must be a string or object",
                    kind
                )))
            }
        };

        let field = field.clone();
        Ok(match kind {
            "prefix" => PrefixQuery::new(field, pattern).with_boost(boost).into(),
            "wildcard" => WildcardQuery::new(field, pattern).with_boost(boost).into(),
            _ => RegexpQuery::new(field, pattern).with_boost(boost).into(),
        })
    }

    /// Parse a fuzzy query
    ///
    /// Format: { "fuzzy": { "field": "term" } }
    /// or: { "fuzzy": { "field": { "value": "term", "fuzziness": 2, "prefix_length": 0 } } }
    fn parse_fuzzy(value: &Value) -> Result<Query> {
        let (field, spec) = Self::field_spec(value, "fuzzy")?;

        let query = match spec {
            Value::String(term) => FuzzyQuery::new(field.clone(), term.clone()),
            Value::Object(spec) => {
                let term = spec
                    .get("value")
                    .and_then(Value::as_str)
                    .ok_or_else(|| invalid("fuzzy query spec must have 'value' field"))?;

                let mut q = FuzzyQuery::new(field.clone(), term).with_boost(boost_of(spec));
                match spec.get("fuzziness") {
                    Some(fuzziness @ Value::Number(_)) => {
                        q = q.with_fuzziness(small_count(fuzziness, "fuzziness")?);
                    }
                    Some(Value::String(s)) if s.eq_ignore_ascii_case("auto") => {
                        q = q.with_fuzziness(auto_fuzziness(term));
                    }
                    Some(other) => return Err(invalid(format!("Invalid fuzziness: {}", other))),
                    None => {}
                }
                if let Some(prefix_length) = spec.get("prefix_length").and_then(Value::as_u64) {
                    q = q.with_prefix_length(prefix_length as usize);
                }
                if let Some(max_exp) = spec.get("max_expansions").and_then(Value::as_u64) {
                    q = q.with_max_expansions(max_exp as usize);
                }
                q
            }
            _ => return Err(invalid("fuzzy query value must be a string or object")),
        };

        Ok(query.into())
    }
}

/// A non-negative integer that fits in a u32
fn small_count(value: &Value, name: &str) -> Result<u32> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| invalid(format!("Invalid {}: {}", name, value)))
}

/// 0-2 chars: 0, 3-5 chars: 1, longer: 2
fn auto_fuzziness(term: &str) -> u32 {
    match term.chars().count() {
        0..=2 => 0,
        3..=5 => 1,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::QueryNode;
    use serde_json::json;

    #[test]
    fn test_parse_term_query() {
        let query = QueryParser::parse(&json!({ "term": { "name": "marty" } })).unwrap();
        match query {
            Query::Term(q) => {
                assert_eq!(q.field, "name");
                assert_eq!(q.term, "marty");
            }
            other => panic!("expected term query, got {:?}", other),
        }

        let query =
            QueryParser::parse(&json!({ "term": { "level": { "value": 10, "boost": 2.0 } } }))
                .unwrap();
        assert_eq!(query.boost(), 2.0);
        let Query::Term(q) = query else {
            panic!("expected term query");
        };
        assert_eq!(q.term, numeric_term(10.0));

        let Query::Term(q) = QueryParser::parse(&json!({ "term": { "level": 10.5 } })).unwrap()
        else {
            panic!("expected term query");
        };
        assert_eq!(q.term, numeric_term(10.5));
    }

    #[test]
    fn test_parse_wrapped_query() {
        let query = QueryParser::parse_str(r#"{ "query": { "match_all": {} } }"#).unwrap();
        assert_eq!(query.query_type(), "match_all");
    }

    #[test]
    fn test_parse_bool_query() {
        let query = QueryParser::parse(&json!({
            "bool": {
                "must": [{ "match": { "title": "developer" } }],
                "should": { "term": { "name": "marty" } },
                "must_not": [{ "prefix": { "name": "bo" } }],
                "minimum_should_match": "50%"
            }
        }))
        .unwrap();

        let Query::Bool(q) = query else {
            panic!("expected bool query");
        };
        assert_eq!(q.must.len(), 1);
        assert_eq!(q.should.len(), 1);
        assert_eq!(q.must_not[0].query_type(), "prefix");
        assert_eq!(
            q.minimum_should_match,
            Some(MinimumShouldMatch::Percentage("50%".to_string()))
        );
    }

    #[test]
    fn test_parse_match_options() {
        let query = QueryParser::parse(&json!({
            "match": { "title": { "query": "software developer", "operator": "AND" } }
        }))
        .unwrap();
        let Query::Match(q) = query else {
            panic!("expected match query");
        };
        assert_eq!(q.operator, MatchOperator::And);

        assert!(QueryParser::parse(&json!({
            "match": { "title": { "query": "x", "operator": "xor" } }
        }))
        .is_err());
    }

    #[test]
    fn test_parse_numeric_range() {
        let query =
            QueryParser::parse(&json!({ "range": { "level": { "gte": 9, "lt": 11.5 } } })).unwrap();
        let Query::NumericRange(q) = query else {
            panic!("expected numeric range");
        };
        assert_eq!(q.min, Some(9.0));
        assert_eq!(q.max, Some(11.5));
        assert!(q.inclusive_min);
        assert!(!q.inclusive_max);
    }

    #[test]
    fn test_parse_date_range() {
        let query = QueryParser::parse(&json!({
            "range": { "created": { "gt": "2021-01-01T00:00:00Z", "lte": "2022-01-01T00:00:00+02:00" } }
        }))
        .unwrap();
        let Query::DateRange(q) = query else {
            panic!("expected date range");
        };
        assert!(!q.inclusive_start);
        assert!(q.inclusive_end);
        assert_eq!(q.end.unwrap().to_rfc3339(), "2021-12-31T22:00:00+00:00");

        assert!(QueryParser::parse(&json!({
            "range": { "created": { "gte": "yesterday" } }
        }))
        .is_err());
    }

    #[test]
    fn test_parse_patterns() {
        for (kind, expected) in [("prefix", "prefix"), ("wildcard", "wildcard"), ("regexp", "regexp")] {
            let query = QueryParser::parse(&json!({ kind: { "slogan": "co*" } })).unwrap();
            assert_eq!(query.query_type(), expected);
        }
    }

    #[test]
    fn test_parse_fuzzy() {
        let query = QueryParser::parse(&json!({
            "fuzzy": { "name": { "value": "marti", "fuzziness": "AUTO", "prefix_length": 1 } }
        }))
        .unwrap();
        let Query::Fuzzy(q) = query else {
            panic!("expected fuzzy query");
        };
        assert_eq!(q.fuzziness, 1);
        assert_eq!(q.prefix_length, 1);
    }

    #[test]
    fn test_oversized_counts_are_rejected() {
        let too_big = u64::from(u32::MAX) + 2;
        assert!(matches!(
            QueryParser::parse(&json!({
                "fuzzy": { "name": { "value": "marty", "fuzziness": too_big } }
            })),
            Err(SourError::InvalidQuery(_))
        ));
        assert!(matches!(
            QueryParser::parse(&json!({
                "match_phrase": { "title": { "query": "a b", "slop": too_big } }
            })),
            Err(SourError::InvalidQuery(_))
        ));
        assert!(matches!(
            QueryParser::parse(&json!({
                "match_phrase": { "title": { "query": "a b", "slop": -1 } }
            })),
            Err(SourError::InvalidQuery(_))
        ));

        let Query::MatchPhrase(q) = QueryParser::parse(&json!({
            "match_phrase": { "title": { "query": "a b", "slop": 3 } }
        }))
        .unwrap() else {
            panic!("expected phrase query");
        };
        assert_eq!(q.slop, 3);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            QueryParser::parse(&json!("term")),
            Err(SourError::InvalidQuery(_))
        ));
        assert!(matches!(
            QueryParser::parse(&json!({ "unknown": {} })),
            Err(SourError::InvalidQuery(_))
        ));
        assert!(matches!(
            QueryParser::parse(&json!({ "term": {} })),
            Err(SourError::InvalidQuery(_))
        ));
        assert!(matches!(
            QueryParser::parse_str("{ not json"),
            Err(SourError::Json(_))
        ));
    }
}
