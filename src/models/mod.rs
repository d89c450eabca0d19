pub mod analysis;
pub mod document;
pub mod numeric;

pub use analysis::{AnalyzedField, Analyzer, StandardAnalyzer, TokenFreq, TokenFrequencies};
pub use document::{CompositeFields, Document, Field, FieldValue, ID_FIELD};
