use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use super::request::Aggregation;

/// One search hit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentMatch {
    /// Document number within the segment
    pub number: u64,
    pub score: f32,
    /// Value of the `_id` field, when the document has one
    pub id: Option<String>,
}

impl DocumentMatch {
    pub fn new(number: u64, score: f32) -> Self {
        Self {
            number,
            score,
            id: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct ScoreEntry {
    score: OrderedFloat<f32>,
    number: u64,
}

impl Ord for ScoreEntry {
    /// Higher score ranks higher; on ties the lower number does
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| other.number.cmp(&self.number))
    }
}

impl PartialOrd for ScoreEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Keeps the best `from + size` hits seen, in a bounded min-heap
pub struct TopNCollector {
    size: usize,
    from: usize,
    heap: BinaryHeap<Reverse<ScoreEntry>>,
}

impl TopNCollector {
    pub fn new(size: usize, from: usize) -> Self {
        Self {
            size,
            from,
            heap: BinaryHeap::new(),
        }
    }

    fn capacity(&self) -> usize {
        self.size.saturating_add(self.from)
    }

    pub fn collect(&mut self, number: u64, score: f32) {
        if self.size == 0 {
            return;
        }
        let entry = ScoreEntry {
            score: OrderedFloat(score),
            number,
        };
        if self.heap.len() < self.capacity() {
            self.heap.push(Reverse(entry));
        } else if let Some(min) = self.heap.peek() {
            if entry > min.0 {
                self.heap.pop();
                self.heap.push(Reverse(entry));
            }
        }
    }

    /// Best hits first, after skipping `from`
    pub fn into_sorted(self) -> Vec<(u64, f32)> {
        let mut results: Vec<ScoreEntry> = self.heap.into_iter().map(|Reverse(e)| e).collect();
        results.sort_by(|a, b| b.cmp(a));
        results
            .into_iter()
            .skip(self.from)
            .take(self.size)
            .map(|entry| (entry.number, entry.score.0))
            .collect()
    }
}

/// Document count for one distinct field value
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermBucket {
    pub term: String,
    pub count: u64,
}

/// Result of one named aggregation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationValue {
    Count(u64),
    MaxScore(f32),
    Terms(Vec<TermBucket>),
}

/// Aggregation results, by name
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregations {
    values: BTreeMap<String, AggregationValue>,
}

impl Aggregations {
    pub fn get(&self, name: &str) -> Option<&AggregationValue> {
        self.values.get(name)
    }

    /// The `count` aggregation, 0 when not requested
    pub fn count(&self) -> u64 {
        match self.values.get("count") {
            Some(AggregationValue::Count(count)) => *count,
            _ => 0,
        }
    }

    /// The `max_score` aggregation, 0 when not requested
    pub fn max_score(&self) -> f32 {
        match self.values.get("max_score") {
            Some(AggregationValue::MaxScore(score)) => *score,
            _ => 0.0,
        }
    }

    /// Buckets of a terms aggregation, most frequent first
    pub fn terms(&self, name: &str) -> Option<&[TermBucket]> {
        match self.values.get(name) {
            Some(AggregationValue::Terms(buckets)) => Some(buckets),
            _ => None,
        }
    }
}

enum AggregationState {
    Count(u64),
    MaxScore(f32),
    Terms {
        field: String,
        size: usize,
        counts: HashMap<String, u64>,
    },
}

/// Accumulates aggregations while matches are collected
pub(crate) struct AggregationsBuilder {
    states: Vec<(String, AggregationState)>,
}

impl AggregationsBuilder {
    pub(crate) fn new(aggregations: &[(String, Aggregation)]) -> Self {
        let states = aggregations
            .iter()
            .map(|(name, aggregation)| {
                let state = match aggregation {
                    Aggregation::Count => AggregationState::Count(0),
                    Aggregation::MaxScore => AggregationState::MaxScore(0.0),
                    Aggregation::Terms { field, size } => AggregationState::Terms {
                        field: field.clone(),
                        size: *size,
                        counts: HashMap::new(),
                    },
                };
                (name.clone(), state)
            })
            .collect();
        Self { states }
    }

    pub(crate) fn needs_values(&self) -> bool {
        self.states
            .iter()
            .any(|(_, state)| matches!(state, AggregationState::Terms { .. }))
    }

    pub(crate) fn observe_match(&mut self, score: f32) {
        for (_, state) in &mut self.states {
            match state {
                AggregationState::Count(count) => *count += 1,
                AggregationState::MaxScore(max) => *max = max.max(score),
                AggregationState::Terms { .. } => {}
            }
        }
    }

    /// One distinct value of a matching document's field
    pub(crate) fn observe_value(&mut self, value_field: &str, term: &[u8]) {
        for (_, state) in &mut self.states {
            if let AggregationState::Terms { field, counts, .. } = state {
                if field == value_field {
                    let term = String::from_utf8_lossy(term);
                    *counts.entry(term.into_owned()).or_insert(0) += 1;
                }
            }
        }
    }

    pub(crate) fn build(self) -> Aggregations {
        let values = self
            .states
            .into_iter()
            .map(|(name, state)| {
                let value = match state {
                    AggregationState::Count(count) => AggregationValue::Count(count),
                    AggregationState::MaxScore(max) => AggregationValue::MaxScore(max),
                    AggregationState::Terms { size, counts, .. } => {
                        let mut buckets: Vec<TermBucket> = counts
                            .into_iter()
                            .map(|(term, count)| TermBucket { term, count })
                            .collect();
                        buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
                        buckets.truncate(size);
                        AggregationValue::Terms(buckets)
                    }
                };
                (name, value)
            })
            .collect();
        Aggregations { values }
    }
}

/// Search hits in rank order, plus the aggregations over all matches
#[derive(Debug)]
pub struct DocumentMatchIterator {
    hits: std::vec::IntoIter<DocumentMatch>,
    total_hits: u64,
    aggregations: Aggregations,
}

impl DocumentMatchIterator {
    pub(crate) fn new(hits: Vec<DocumentMatch>, total_hits: u64, aggregations: Aggregations) -> Self {
        Self {
            hits: hits.into_iter(),
            total_hits,
            aggregations,
        }
    }

    pub fn aggregations(&self) -> &Aggregations {
        &self.aggregations
    }

    /// Number of matching documents, including those outside the window
    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }
}

impl Iterator for DocumentMatchIterator {
    type Item = DocumentMatch;

    fn next(&mut self) -> Option<DocumentMatch> {
        self.hits.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.hits.size_hint()
    }
}
