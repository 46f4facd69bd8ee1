use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A TestCase field, displayed as its wire key.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    #[serde(rename = "_id")]
    Id,
    CreatedAt,
    UpdatedAt,
    ApiId,
    Name,
    Method,
    Url,
    Headers,
    Payload,
    Description,
    ExpectedOutcome,
    CreatedBy,
}

impl Field {
    pub fn key(&self) -> &'static str {
        match self {
            Field::Id => "_id",
            Field::CreatedAt => "created_at",
            Field::UpdatedAt => "updated_at",
            Field::ApiId => "api_id",
            Field::Name => "name",
            Field::Method => "method",
            Field::Url => "url",
            Field::Headers => "headers",
            Field::Payload => "payload",
            Field::Description => "description",
            Field::ExpectedOutcome => "expected_outcome",
            Field::CreatedBy => "created_by",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: Field,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: Field, reason: impl Into<String>) -> Self {
        ValidationError {
            field,
            reason: reason.into(),
        }
    }
}

/// Every violation found in one record. Never empty.
#[derive(Serialize, Clone, Debug, PartialEq, Eq, Error)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub(crate) fn from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(ValidationErrors(errors))
        }
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn fields(&self) -> Vec<Field> {
        self.0.iter().map(|e| e.field).collect()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<String>>()
            .join("; ");
        write!(f, "invalid test case: {}", joined)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{0} is set but _id is missing")]
    TimestampWithoutId(Field),
    #[error("{0} is required once _id is set")]
    MissingTimestamp(Field),
    #[error("created_at ({created_at}) is after updated_at ({updated_at})")]
    TimestampOrder {
        created_at: String,
        updated_at: String,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document: {0}")]
    Document(#[from] serde_dynamo::Error),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config: {0}")]
    Config(String),
}
