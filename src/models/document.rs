use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the keyword field every document carries its identifier in
pub const ID_FIELD: &str = "_id";

/// Document to be tested against queries
///
/// Fields may repeat under one name; their analysis output is merged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    fields: Vec<Field>,
}

impl Document {
    /// Create a document whose `_id` keyword field holds `id`
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            fields: vec![Field::keyword(ID_FIELD, id)],
        }
    }

    /// Append a field
    pub fn add_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn push_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Value of the `_id` field, if it is still a keyword
    pub fn id(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == ID_FIELD)
            .and_then(|field| match &field.value {
                FieldValue::Keyword(id) => Some(id.as_str()),
                _ => None,
            })
    }
}

/// A named attribute of a document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

/// Field value, which decides how the field is analyzed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    /// Indexed as one token, verbatim
    Keyword(String),
    /// Tokenized full text
    Text(String),
    Numeric(f64),
    DateTime(DateTime<Utc>),
    /// Union of other fields' tokens
    Composite(CompositeFields),
}

/// Selection of source fields for a composite field
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeFields {
    /// Fields to include; `None` includes every non-composite field
    #[serde(default)]
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl CompositeFields {
    pub fn includes(&self, field: &str) -> bool {
        if self.exclude.iter().any(|excluded| excluded == field) {
            return false;
        }
        match &self.include {
            Some(include) => include.iter().any(|included| included == field),
            None => true,
        }
    }
}

impl Field {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn keyword(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, FieldValue::Keyword(value.into()))
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, FieldValue::Text(value.into()))
    }

    pub fn numeric(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, FieldValue::Numeric(value))
    }

    pub fn date_time(name: impl Into<String>, value: DateTime<Utc>) -> Self {
        Self::new(name, FieldValue::DateTime(value))
    }

    /// Composite over every non-composite field except `_id`
    pub fn composite_all(name: impl Into<String>) -> Self {
        Self::composite_excluding(name, vec![ID_FIELD.to_string()])
    }

    pub fn composite_including(name: impl Into<String>, include: Vec<String>) -> Self {
        Self::new(
            name,
            FieldValue::Composite(CompositeFields {
                include: Some(include),
                exclude: Vec::new(),
            }),
        )
    }

    pub fn composite_excluding(name: impl Into<String>, exclude: Vec<String>) -> Self {
        Self::new(
            name,
            FieldValue::Composite(CompositeFields {
                include: None,
                exclude,
            }),
        )
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.value, FieldValue::Composite(_))
    }
}
