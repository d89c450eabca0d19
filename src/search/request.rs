use std::collections::BTreeSet;

use tracing::debug;

use crate::models::ID_FIELD;
use crate::query::{Query, QueryContext, QueryNode};
use crate::segment::Segment;
use crate::Result;

use super::collector::{AggregationsBuilder, DocumentMatch, DocumentMatchIterator, TopNCollector};

/// Aggregation computed over all matching documents
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Aggregation {
    /// Number of matching documents
    Count,
    /// Highest score among matching documents
    MaxScore,
    /// Matching document counts per distinct value of a field
    Terms { field: String, size: usize },
}

impl Aggregation {
    pub fn terms(field: impl Into<String>) -> Self {
        Aggregation::Terms {
            field: field.into(),
            size: 10,
        }
    }
}

/// Top-N search request
#[derive(Clone, Debug)]
pub struct SearchRequest {
    query: Query,
    size: usize,
    from: usize,
    aggregations: Vec<(String, Aggregation)>,
}

impl SearchRequest {
    /// Return the `size` best hits for `query`
    pub fn top_n(size: usize, query: impl Into<Query>) -> Self {
        Self {
            query: query.into(),
            size,
            from: 0,
            aggregations: Vec::new(),
        }
    }

    /// Skip the first `from` hits
    pub fn with_from(mut self, from: usize) -> Self {
        self.from = from;
        self
    }

    /// Add the `count` and `max_score` aggregations
    pub fn with_standard_aggregations(self) -> Self {
        self.add_aggregation("count", Aggregation::Count)
            .add_aggregation("max_score", Aggregation::MaxScore)
    }

    /// Add a named aggregation, replacing one with the same name
    pub fn add_aggregation(mut self, name: impl Into<String>, aggregation: Aggregation) -> Self {
        let name = name.into();
        self.aggregations.retain(|(existing, _)| *existing != name);
        self.aggregations.push((name, aggregation));
        self
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn from(&self) -> usize {
        self.from
    }

    pub fn aggregations(&self) -> &[(String, Aggregation)] {
        &self.aggregations
    }

    /// Fields whose doc values are read while collecting
    fn value_fields(&self) -> Vec<String> {
        let mut fields = BTreeSet::new();
        fields.insert(ID_FIELD.to_string());
        for (_, aggregation) in &self.aggregations {
            if let Aggregation::Terms { field, .. } = aggregation {
                fields.insert(field.clone());
            }
        }
        fields.into_iter().collect()
    }

    /// Execute against the context's segment
    pub fn execute<S: Segment>(&self, ctx: &QueryContext<'_, S>) -> Result<DocumentMatchIterator> {
        let matches = self.query.execute(ctx)?;
        let reader = ctx.segment().document_value_reader(&self.value_fields())?;

        let mut collector = TopNCollector::new(self.size, self.from);
        let mut aggregations = AggregationsBuilder::new(&self.aggregations);
        for (number, score) in matches.iter() {
            if aggregations.needs_values() {
                reader.visit_document_values(number, &mut |field, term| {
                    aggregations.observe_value(field, term);
                })?;
            }
            aggregations.observe_match(score);
            collector.collect(number, score);
        }

        let mut hits = Vec::new();
        for (number, score) in collector.into_sorted() {
            let mut hit = DocumentMatch::new(number, score);
            reader.visit_document_values(number, &mut |field, term| {
                if field == ID_FIELD {
                    hit.id = Some(String::from_utf8_lossy(term).into_owned());
                }
            })?;
            hits.push(hit);
        }

        debug!(
            query = self.query.query_type(),
            total = matches.len(),
            hits = hits.len(),
            "search complete"
        );
        Ok(DocumentMatchIterator::new(hits, matches.len(), aggregations.build()))
    }
}
