//! Doc values replayed from the analyzed term set
//!
//! There is no columnar storage behind a single document: a field's values
//! are simply its distinct terms, visited in sorted order.

use tracing::trace;

use crate::error::SourError;
use crate::sour::Sour;
use crate::Result;

use super::types::INTERNAL_DOC_NUMBER;

/// Per-document access to field values for sorting and aggregation
pub trait DocumentValueReader {
    /// Call `visitor(field, term)` for every value of the requested fields
    fn visit_document_values(
        &self,
        number: u64,
        visitor: &mut dyn FnMut(&str, &[u8]),
    ) -> Result<()>;
}

/// Doc-value reader over the adapter's current document
pub struct DocValueReader<'a> {
    sour: &'a Sour,
    fields: Vec<String>,
}

impl<'a> DocValueReader<'a> {
    pub fn new(sour: &'a Sour, fields: &[String]) -> Self {
        Self {
            sour,
            fields: fields.to_vec(),
        }
    }
}

impl DocumentValueReader for DocValueReader<'_> {
    fn visit_document_values(
        &self,
        number: u64,
        visitor: &mut dyn FnMut(&str, &[u8]),
    ) -> Result<()> {
        if self.sour.document().is_none() {
            return Ok(());
        }
        if number != INTERNAL_DOC_NUMBER {
            return Err(SourError::DocumentNumberOutOfRange(number));
        }

        for field in &self.fields {
            let terms = match self.sour.sorted_terms(field) {
                Ok(terms) => terms,
                Err(e) if e.is_missing_data() => {
                    trace!(field = %field, "no doc values for field");
                    continue;
                }
                Err(e) => return Err(e),
            };
            for term in terms.iter() {
                visitor(field, term.as_bytes());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourConfig;
    use crate::models::{Document, Field};

    fn collect(reader: &DocValueReader<'_>, number: u64) -> Result<Vec<(String, String)>> {
        let mut out = Vec::new();
        reader.visit_document_values(number, &mut |field, term| {
            out.push((field.to_string(), String::from_utf8_lossy(term).into_owned()));
        })?;
        Ok(out)
    }

    #[test]
    fn test_visits_sorted_terms_of_requested_fields() {
        let doc = Document::new("a").add_field(Field::text("tags", "rust zig c"));
        let sour = Sour::with_document(SourConfig::default(), doc);

        let fields = vec!["tags".to_string(), "missing".to_string(), "_id".to_string()];
        let reader = DocValueReader::new(&sour, &fields);
        let values = collect(&reader, INTERNAL_DOC_NUMBER).unwrap();

        assert_eq!(
            values,
            vec![
                ("tags".to_string(), "c".to_string()),
                ("tags".to_string(), "rust".to_string()),
                ("tags".to_string(), "zig".to_string()),
                ("_id".to_string(), "a".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_doc_number() {
        let sour = Sour::with_document(SourConfig::default(), Document::new("a"));
        let fields = vec!["_id".to_string()];
        let reader = DocValueReader::new(&sour, &fields);

        let err = collect(&reader, 1).unwrap_err();
        assert!(matches!(err, SourError::DocumentNumberOutOfRange(1)));
    }

    #[test]
    fn test_no_document_loaded() {
        let sour = Sour::new(SourConfig::default());
        let fields = vec!["_id".to_string()];
        let reader = DocValueReader::new(&sour, &fields);

        assert!(collect(&reader, 5).unwrap().is_empty());
    }
}
