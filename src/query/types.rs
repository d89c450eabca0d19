//! Core types for the query system

use std::collections::HashMap;

use roaring::RoaringTreemap;
use serde::{Deserialize, Serialize};

/// Operator for combining terms in a match query
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOperator {
    /// All terms must match (AND)
    And,
    /// At least one term must match (OR)
    #[default]
    Or,
}

/// Minimum should match specification
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MinimumShouldMatch {
    /// Exact count
    Count(usize),
    /// Percentage (e.g., "75%")
    Percentage(String),
}

impl MinimumShouldMatch {
    /// Calculate the minimum number of clauses that should match
    pub fn calculate(&self, total_clauses: usize) -> usize {
        match self {
            MinimumShouldMatch::Count(n) => *n,
            MinimumShouldMatch::Percentage(s) => {
                let pct: f64 = s.trim_end_matches('%').parse().unwrap_or(100.0) / 100.0;
                ((total_clauses as f64) * pct).ceil() as usize
            }
        }
    }
}

impl Default for MinimumShouldMatch {
    fn default() -> Self {
        MinimumShouldMatch::Count(1)
    }
}

/// Matching document numbers with their accumulated scores
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Matches {
    docs: RoaringTreemap,
    scores: HashMap<u64, f32>,
}

impl Matches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every number in `docs`, each with the same score
    pub fn from_docs(docs: RoaringTreemap, score: f32) -> Self {
        let scores = docs.iter().map(|number| (number, score)).collect();
        Self { docs, scores }
    }

    /// Record a match, adding to the score of a repeated number
    pub fn insert(&mut self, number: u64, score: f32) {
        self.docs.insert(number);
        *self.scores.entry(number).or_insert(0.0) += score;
    }

    pub fn contains(&self, number: u64) -> bool {
        self.docs.contains(number)
    }

    pub fn score(&self, number: u64) -> Option<f32> {
        self.scores.get(&number).copied()
    }

    pub fn len(&self) -> u64 {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn docs(&self) -> &RoaringTreemap {
        &self.docs
    }

    /// (number, score) pairs in ascending number order
    pub fn iter(&self) -> impl Iterator<Item = (u64, f32)> + '_ {
        self.docs
            .iter()
            .map(|number| (number, self.scores.get(&number).copied().unwrap_or(0.0)))
    }

    /// Documents in either set; scores of shared documents add up
    pub fn union(mut self, other: Matches) -> Matches {
        for (number, score) in other.iter() {
            self.insert(number, score);
        }
        self
    }

    /// Documents in both sets; scores add up
    pub fn intersect(mut self, other: &Matches) -> Matches {
        self.docs &= &other.docs;
        let docs = &self.docs;
        self.scores.retain(|number, _| docs.contains(*number));
        for (number, score) in self.scores.iter_mut() {
            *score += other.score(*number).unwrap_or(0.0);
        }
        self
    }

    /// Documents of this set absent from `other`
    pub fn difference(mut self, other: &Matches) -> Matches {
        self.docs -= &other.docs;
        let docs = &self.docs;
        self.scores.retain(|number, _| docs.contains(*number));
        self
    }

    /// Keep only documents with at least `min` hits in `counts`
    pub fn retain_counts(&mut self, counts: &HashMap<u64, usize>, min: usize) {
        let keep = |number: &u64| counts.get(number).copied().unwrap_or(0) >= min;
        let docs: RoaringTreemap = self.docs.iter().filter(|number| keep(number)).collect();
        self.scores.retain(|number, _| keep(number));
        self.docs = docs;
    }

    /// Multiply every score by `boost`
    pub fn boost(&mut self, boost: f32) {
        if boost != 1.0 {
            for score in self.scores.values_mut() {
                *score *= boost;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pairs: &[(u64, f32)]) -> Matches {
        let mut m = Matches::new();
        for &(number, score) in pairs {
            m.insert(number, score);
        }
        m
    }

    #[test]
    fn test_minimum_should_match() {
        assert_eq!(MinimumShouldMatch::Count(2).calculate(5), 2);
        assert_eq!(
            MinimumShouldMatch::Percentage("75%".to_string()).calculate(4),
            3
        );
    }

    #[test]
    fn test_union_sums_scores() {
        let m = matches(&[(0, 1.0), (1, 2.0)]).union(matches(&[(1, 0.5), (4, 1.0)]));
        assert_eq!(m.len(), 3);
        assert_eq!(m.score(1), Some(2.5));
        assert_eq!(m.score(4), Some(1.0));
    }

    #[test]
    fn test_intersect_and_difference() {
        let a = matches(&[(0, 1.0), (1, 2.0)]);
        let b = matches(&[(1, 0.5), (2, 1.0)]);

        let both = a.clone().intersect(&b);
        assert_eq!(both.iter().collect::<Vec<_>>(), vec![(1, 2.5)]);

        let only_a = a.difference(&b);
        assert_eq!(only_a.iter().collect::<Vec<_>>(), vec![(0, 1.0)]);
        assert_eq!(only_a.score(1), None);
    }

    #[test]
    fn test_retain_counts_and_boost() {
        let mut m = matches(&[(0, 1.0), (1, 1.0)]);
        let counts = HashMap::from([(0, 2), (1, 1)]);
        m.retain_counts(&counts, 2);
        assert!(m.contains(0));
        assert!(!m.contains(1));

        m.boost(3.0);
        assert_eq!(m.score(0), Some(3.0));
    }
}
