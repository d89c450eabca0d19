//! The single-document segment adapter
//!
//! [`Sour`] owns the analysis of one document and answers every
//! [`Segment`] read from it. It is meant to be long-lived: call
//! [`Sour::reset`] with each new document instead of building a new
//! adapter, so buffers and cached term lists keep their capacity.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use fst::Automaton;
use tracing::{debug, trace};

use crate::config::SourConfig;
use crate::error::SourError;
use crate::models::{AnalyzedField, Analyzer, Document, StandardAnalyzer, TokenFrequencies};
use crate::query::QueryContext;
use crate::search::{DocumentMatchIterator, SearchRequest};
use crate::segment::{
    CollectionStats, DictionaryIterator, DictionaryLookup, DocValueReader, DocumentValueReader,
    FieldDictionary, PostingsIterator, PostingsOptions, Segment, SingleDocumentStats,
    SortedTermIterator, TermFieldReader,
};
use crate::tokenizer::Tokenizer;
use crate::Result;

/// In-memory segment holding exactly one analyzed document
///
/// Not `Sync`: a single adapter serves one thread at a time.
pub struct Sour {
    config: SourConfig,
    tokenizer: Arc<Tokenizer>,
    analyzer: Arc<dyn Analyzer>,
    doc: Option<Document>,

    field_indexes: HashMap<String, usize>,
    field_names: Vec<String>,
    field_token_freqs: Vec<TokenFrequencies>,
    field_lens: Vec<usize>,

    /// Lazily sorted terms per field; emptied on reset, never shrunk
    sorted_terms: RefCell<HashMap<String, Arc<Vec<String>>>>,
}

impl Sour {
    /// Create an empty adapter using the standard analyzer
    pub fn new(config: SourConfig) -> Self {
        let tokenizer = Arc::new(Tokenizer::new(&config.tokenizer));
        let analyzer = Arc::new(StandardAnalyzer::new(tokenizer.clone()));
        Self::build(config, tokenizer, analyzer)
    }

    /// Create an adapter with a custom analyzer
    pub fn with_analyzer(config: SourConfig, analyzer: Arc<dyn Analyzer>) -> Self {
        let tokenizer = Arc::new(Tokenizer::new(&config.tokenizer));
        Self::build(config, tokenizer, analyzer)
    }

    /// Create an adapter and load `doc`
    pub fn with_document(config: SourConfig, doc: Document) -> Self {
        let mut sour = Self::new(config);
        sour.reset(doc);
        sour
    }

    fn build(config: SourConfig, tokenizer: Arc<Tokenizer>, analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            config,
            tokenizer,
            analyzer,
            doc: None,
            field_indexes: HashMap::new(),
            field_names: Vec::new(),
            field_token_freqs: Vec::new(),
            field_lens: Vec::new(),
            sorted_terms: RefCell::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &SourConfig {
        &self.config
    }

    pub fn tokenizer(&self) -> &Arc<Tokenizer> {
        &self.tokenizer
    }

    /// Replace the current document and re-analyze it
    pub fn reset(&mut self, doc: Document) {
        self.field_indexes.clear();
        self.field_names.clear();
        self.field_token_freqs.clear();
        self.field_lens.clear();

        for terms in self.sorted_terms.get_mut().values_mut() {
            match Arc::get_mut(terms) {
                Some(terms) => terms.clear(),
                None => *terms = Arc::default(),
            }
        }

        let analyzed = self.analyzer.analyze(&doc);
        for field in analyzed {
            self.add_analyzed_field(field);
        }
        self.doc = Some(doc);

        debug!(fields = self.field_names.len(), "document analyzed");
    }

    fn add_analyzed_field(&mut self, field: AnalyzedField) {
        let AnalyzedField {
            name,
            mut token_frequencies,
            length,
            composite,
        } = field;

        if !composite {
            for tf in token_frequencies.iter_mut() {
                for location in &mut tf.locations {
                    if location.field.is_empty() {
                        location.field.clone_from(&name);
                    }
                }
            }
        }

        match self.field_indexes.get(&name) {
            Some(&index) => {
                self.field_token_freqs[index].merge_all(&name, token_frequencies);
                self.field_lens[index] += length;
            }
            None => {
                self.field_indexes.insert(name.clone(), self.field_names.len());
                self.field_names.push(name);
                self.field_token_freqs.push(token_frequencies);
                self.field_lens.push(length);
            }
        }
    }

    /// The currently loaded document, if any
    pub fn document(&self) -> Option<&Document> {
        self.doc.as_ref()
    }

    /// Field names in first-seen order
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Term occurrences and token length of `field`
    pub fn token_frequencies_and_length(&self, field: &str) -> Result<(&TokenFrequencies, usize)> {
        let index = *self
            .field_indexes
            .get(field)
            .ok_or_else(|| SourError::FieldNotFound(field.to_string()))?;
        Ok((&self.field_token_freqs[index], self.field_lens[index]))
    }

    /// Distinct terms of `field` in ascending byte order
    pub fn sorted_terms(&self, field: &str) -> Result<Arc<Vec<String>>> {
        let (token_freqs, _) = self.token_frequencies_and_length(field)?;

        let mut cache = self.sorted_terms.borrow_mut();
        let entry = cache.entry(field.to_string()).or_default();
        if !entry.is_empty() || token_freqs.is_empty() {
            return Ok(entry.clone());
        }

        match Arc::get_mut(entry) {
            Some(terms) => {
                terms.extend(token_freqs.terms().cloned());
                terms.sort_unstable();
            }
            None => {
                let mut terms: Vec<String> = token_freqs.terms().cloned().collect();
                terms.sort_unstable();
                *entry = Arc::new(terms);
            }
        }
        Ok(entry.clone())
    }

    /// Run `request` against the current document
    pub fn search(&self, request: &SearchRequest) -> Result<DocumentMatchIterator> {
        let ctx = QueryContext::new(self, self.tokenizer.clone(), self.config.similarity);
        request.execute(&ctx)
    }
}

impl Default for Sour {
    fn default() -> Self {
        Self::new(SourConfig::default())
    }
}

impl Segment for Sour {
    fn collection_stats(&self, _field: &str) -> Result<Box<dyn CollectionStats>> {
        Ok(Box::new(SingleDocumentStats))
    }

    fn dictionary_lookup<'a>(&'a self, field: &str) -> Result<Box<dyn DictionaryLookup + 'a>> {
        match self.token_frequencies_and_length(field) {
            Ok((token_freqs, _)) => Ok(Box::new(FieldDictionary::new(token_freqs))),
            Err(SourError::FieldNotFound(_)) => {
                trace!(field, "dictionary lookup on missing field");
                Ok(Box::new(FieldDictionary::empty()))
            }
            Err(e) => Err(e),
        }
    }

    fn dictionary_iterator<'a, A: Automaton + 'a>(
        &'a self,
        field: &str,
        automaton: A,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
    ) -> Result<Box<dyn DictionaryIterator + 'a>> {
        match self.sorted_terms(field) {
            Ok(terms) => Ok(Box::new(SortedTermIterator::new(terms, automaton, start, end))),
            Err(SourError::FieldNotFound(_)) => {
                trace!(field, "dictionary scan on missing field");
                Ok(Box::new(SortedTermIterator::<A>::empty()))
            }
            Err(e) => Err(e),
        }
    }

    fn postings_iterator<'a>(
        &'a self,
        term: &[u8],
        field: &str,
        options: PostingsOptions,
    ) -> Result<Box<dyn PostingsIterator + 'a>> {
        let (token_freqs, len) = match self.token_frequencies_and_length(field) {
            Ok(found) => found,
            Err(SourError::FieldNotFound(_)) => {
                trace!(field, "postings on missing field");
                return Ok(Box::new(TermFieldReader::empty()));
            }
            Err(e) => return Err(e),
        };

        let tf = std::str::from_utf8(term)
            .ok()
            .and_then(|term| token_freqs.get(term));
        Ok(match tf {
            Some(tf) => Box::new(TermFieldReader::new(tf, len, options)),
            None => Box::new(TermFieldReader::empty()),
        })
    }

    fn document_value_reader<'a>(
        &'a self,
        fields: &[String],
    ) -> Result<Box<dyn DocumentValueReader + 'a>> {
        Ok(Box::new(DocValueReader::new(self, fields)))
    }

    fn visit_stored_fields(
        &self,
        _number: u64,
        _visitor: &mut dyn FnMut(&str, &[u8]) -> bool,
    ) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
