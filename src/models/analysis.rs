//! Field analysis: turns document fields into per-term occurrence data

use std::collections::hash_map::{self, Entry};
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::document::{CompositeFields, Document, Field, FieldValue};
use crate::models::numeric::{date_term, numeric_term};
use crate::segment::Location;
use crate::tokenizer::Tokenizer;

/// Occurrence data for one distinct term of a field
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenFreq {
    pub term: String,
    pub frequency: usize,
    pub locations: Vec<Location>,
}

impl TokenFreq {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            frequency: 0,
            locations: Vec::new(),
        }
    }

    fn push(&mut self, location: Location) {
        self.frequency += 1;
        self.locations.push(location);
    }
}

/// Distinct terms of a field mapped to their occurrence data
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenFrequencies(HashMap<String, TokenFreq>);

impl TokenFrequencies {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn get(&self, term: &str) -> Option<&TokenFreq> {
        self.0.get(term)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.0.contains_key(term)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn terms(&self) -> hash_map::Keys<'_, String, TokenFreq> {
        self.0.keys()
    }

    pub fn iter(&self) -> hash_map::Values<'_, String, TokenFreq> {
        self.0.values()
    }

    pub fn iter_mut(&mut self) -> hash_map::ValuesMut<'_, String, TokenFreq> {
        self.0.values_mut()
    }

    /// Record one occurrence of `term`
    pub fn add(&mut self, term: &str, location: Location) {
        match self.0.get_mut(term) {
            Some(tf) => tf.push(location),
            None => {
                let mut tf = TokenFreq::new(term);
                tf.push(location);
                self.0.insert(term.to_string(), tf);
            }
        }
    }

    /// Fold `other` into this map, accumulating frequencies and locations.
    ///
    /// Locations of `other` without a field are attributed to `field`.
    pub fn merge_all(&mut self, field: &str, other: TokenFrequencies) {
        for (term, mut tf) in other.0 {
            for location in &mut tf.locations {
                if location.field.is_empty() {
                    location.field = field.to_string();
                }
            }
            match self.0.entry(term) {
                Entry::Occupied(mut existing) => {
                    let existing = existing.get_mut();
                    existing.frequency += tf.frequency;
                    existing.locations.append(&mut tf.locations);
                }
                Entry::Vacant(slot) => {
                    slot.insert(tf);
                }
            }
        }
    }
}

/// Analysis output for one field occurrence
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalyzedField {
    pub name: String,
    pub token_frequencies: TokenFrequencies,
    /// Number of tokens the field produced
    pub length: usize,
    pub composite: bool,
}

/// Turns a document into analyzed fields, in document order
pub trait Analyzer: Send + Sync {
    fn analyze(&self, doc: &Document) -> Vec<AnalyzedField>;
}

/// Default analyzer: keywords verbatim, text through the tokenizer, numbers
/// and dates as order-preserving terms, composites as unions of the rest
pub struct StandardAnalyzer {
    tokenizer: Arc<Tokenizer>,
}

impl StandardAnalyzer {
    pub fn new(tokenizer: Arc<Tokenizer>) -> Self {
        Self { tokenizer }
    }

    fn analyze_field(&self, field: &Field) -> AnalyzedField {
        let mut token_frequencies = TokenFrequencies::new();
        let length = match &field.value {
            FieldValue::Keyword(value) => {
                token_frequencies.add(value, Location::new("", 0, value.len(), 1));
                1
            }
            FieldValue::Text(value) => {
                let tokens = self.tokenizer.tokens(value);
                for token in &tokens {
                    token_frequencies.add(
                        &token.term,
                        Location::new("", token.start, token.end, token.position),
                    );
                }
                tokens.len()
            }
            // NaN has no order, leave it out
            FieldValue::Numeric(value) if value.is_nan() => 0,
            FieldValue::Numeric(value) => {
                let term = numeric_term(*value);
                token_frequencies.add(&term, Location::new("", 0, term.len(), 1));
                1
            }
            FieldValue::DateTime(value) => {
                let term = date_term(value);
                token_frequencies.add(&term, Location::new("", 0, term.len(), 1));
                1
            }
            FieldValue::Composite(_) => 0,
        };

        AnalyzedField {
            name: field.name.clone(),
            token_frequencies,
            length,
            composite: false,
        }
    }

    fn compose(name: &str, selection: &CompositeFields, sources: &[AnalyzedField]) -> AnalyzedField {
        let mut composite = AnalyzedField {
            name: name.to_string(),
            composite: true,
            ..AnalyzedField::default()
        };
        for source in sources.iter().filter(|source| selection.includes(&source.name)) {
            composite
                .token_frequencies
                .merge_all(&source.name, source.token_frequencies.clone());
            composite.length += source.length;
        }
        composite
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, doc: &Document) -> Vec<AnalyzedField> {
        let mut analyzed: Vec<Option<AnalyzedField>> = doc
            .fields()
            .iter()
            .map(|field| (!field.is_composite()).then(|| self.analyze_field(field)))
            .collect();

        let sources: Vec<AnalyzedField> = analyzed.iter().flatten().cloned().collect();
        for (slot, field) in analyzed.iter_mut().zip(doc.fields()) {
            if let FieldValue::Composite(selection) = &field.value {
                *slot = Some(Self::compose(&field.name, selection, &sources));
            }
        }

        analyzed.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenizerConfig;

    fn analyzer() -> StandardAnalyzer {
        StandardAnalyzer::new(Arc::new(Tokenizer::new(&TokenizerConfig::default())))
    }

    #[test]
    fn test_keyword_is_single_token() {
        let doc = Document::new("A").add_field(Field::keyword("name", "Marty McFly"));
        let fields = analyzer().analyze(&doc);

        assert_eq!(fields.len(), 2);
        let name = &fields[1];
        assert_eq!(name.name, "name");
        assert_eq!(name.length, 1);
        let tf = name.token_frequencies.get("Marty McFly").unwrap();
        assert_eq!(tf.frequency, 1);
        assert_eq!(tf.locations, vec![Location::new("", 0, 11, 1)]);
    }

    #[test]
    fn test_text_frequencies_and_length() {
        let doc = Document::new("A").add_field(Field::text("title", "code the code"));
        let fields = analyzer().analyze(&doc);

        let title = &fields[1];
        assert_eq!(title.length, 3);
        let code = title.token_frequencies.get("code").unwrap();
        assert_eq!(code.frequency, 2);
        assert_eq!(code.locations[1].pos, 3);
        assert_eq!(code.locations[1].start, 9);
    }

    #[test]
    fn test_composite_keeps_source_fields() {
        let doc = Document::new("A")
            .add_field(Field::text("title", "software developer"))
            .add_field(Field::text("slogan", "code match"))
            .add_field(Field::composite_all("_all"));
        let fields = analyzer().analyze(&doc);

        let all = fields.iter().find(|f| f.name == "_all").unwrap();
        assert!(all.composite);
        assert_eq!(all.length, 4);
        assert!(!all.token_frequencies.contains("A"));
        let code = all.token_frequencies.get("code").unwrap();
        assert_eq!(code.locations[0].field, "slogan");
    }

    #[test]
    fn test_nan_is_not_indexed() {
        let doc = Document::new("A")
            .add_field(Field::numeric("x", f64::NAN))
            .add_field(Field::numeric("y", 1.5));
        let fields = analyzer().analyze(&doc);

        let x = &fields[1];
        assert_eq!(x.name, "x");
        assert_eq!(x.length, 0);
        assert!(x.token_frequencies.is_empty());
        assert!(fields[2].token_frequencies.contains(&numeric_term(1.5)));
    }

    #[test]
    fn test_merge_all_accumulates() {
        let mut base = TokenFrequencies::new();
        base.add("tag", Location::new("tags", 0, 3, 1));

        let mut other = TokenFrequencies::new();
        other.add("tag", Location::new("", 0, 3, 1));
        other.add("new", Location::new("", 4, 7, 2));

        base.merge_all("tags", other);

        assert_eq!(base.len(), 2);
        let tag = base.get("tag").unwrap();
        assert_eq!(tag.frequency, 2);
        assert!(tag.locations.iter().all(|loc| loc.field == "tags"));
        assert_eq!(base.get("new").unwrap().locations[0].field, "tags");
    }
}
