use crate::case::model::{SavedTestCase, TestCase, TestCaseDraft};
use crate::error::{DecodeError, Error, Field};
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_dynamo::aws_sdk_dynamodb_1::{from_item, to_item};
use std::collections::HashMap;

pub type Item = HashMap<String, AttributeValue>;

/// Wire shape shared by the JSON and document encodings. Generated keys are
/// omitted when unset; `headers` and `payload` are always written, as null
/// when absent.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TestCaseDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub method: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default)]
    pub headers: Option<String>,
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expected_outcome: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

// null reads as the zero value, leaving missing fields to the validator
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl From<TestCase> for TestCaseDocument {
    fn from(case: TestCase) -> Self {
        let (id, created_at, updated_at) = match &case {
            TestCase::Unsaved(_) => (None, None, None),
            TestCase::Saved(saved) => (
                Some(saved.id().to_string()),
                Some(saved.created_at()),
                Some(saved.updated_at()),
            ),
        };
        let draft = case.into_draft();
        TestCaseDocument {
            id,
            created_at,
            updated_at,
            api_id: draft.api_id,
            name: draft.name,
            method: draft.method,
            url: draft.url,
            headers: draft.headers,
            payload: draft.payload,
            description: draft.description,
            expected_outcome: draft.expected_outcome,
            created_by: draft.created_by,
        }
    }
}

impl TryFrom<TestCaseDocument> for TestCase {
    type Error = DecodeError;

    fn try_from(document: TestCaseDocument) -> Result<Self, Self::Error> {
        let draft = TestCaseDraft {
            api_id: document.api_id,
            name: document.name,
            method: document.method,
            url: document.url,
            headers: document.headers,
            payload: document.payload,
            description: document.description,
            expected_outcome: document.expected_outcome,
            created_by: document.created_by,
        };
        // an empty _id is the unsaved state
        let id = document.id.filter(|id| !id.is_empty());
        match (id, document.created_at, document.updated_at) {
            (None, None, None) => Ok(TestCase::Unsaved(draft)),
            (None, Some(_), _) => Err(DecodeError::TimestampWithoutId(Field::CreatedAt)),
            (None, None, Some(_)) => Err(DecodeError::TimestampWithoutId(Field::UpdatedAt)),
            (Some(_), None, _) => Err(DecodeError::MissingTimestamp(Field::CreatedAt)),
            (Some(_), Some(_), None) => Err(DecodeError::MissingTimestamp(Field::UpdatedAt)),
            (Some(id), Some(created_at), Some(updated_at)) => {
                SavedTestCase::from_parts(id, created_at, updated_at, draft).map(TestCase::Saved)
            }
        }
    }
}

pub fn to_json(case: &TestCase) -> Result<String, Error> {
    Ok(serde_json::to_string(case)?)
}

pub fn from_json(json: &str) -> Result<TestCase, Error> {
    Ok(serde_json::from_str(json)?)
}

/// Accepts a single test case object or an array of them.
pub fn from_json_batch(json: &str) -> Result<Vec<TestCase>, Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<serde_json::Value>),
        One(serde_json::Value),
    }
    let values = match serde_json::from_str(json)? {
        OneOrMany::Many(values) => values,
        OneOrMany::One(value) => vec![value],
    };
    values
        .into_iter()
        .map(|value| serde_json::from_value(value).map_err(Error::from))
        .collect()
}

pub fn to_document(case: &TestCase) -> Result<Item, Error> {
    Ok(to_item(case)?)
}

pub fn from_document(item: Item) -> Result<TestCase, Error> {
    Ok(from_item(item)?)
}

/// Renders an item with DynamoDB's type tags, e.g. `{"S": "GET"}`.
pub fn document_to_tagged_json(item: &Item) -> serde_json::Value {
    serde_json::Value::Object(
        item.iter()
            .map(|(k, v)| (k.clone(), tagged(v)))
            .collect(),
    )
}

fn tagged(value: &AttributeValue) -> serde_json::Value {
    use serde_json::json;
    match value {
        AttributeValue::S(s) => json!({ "S": s }),
        AttributeValue::N(n) => json!({ "N": n }),
        AttributeValue::Bool(b) => json!({ "BOOL": b }),
        AttributeValue::Null(b) => json!({ "NULL": b }),
        AttributeValue::Ss(values) => json!({ "SS": values }),
        AttributeValue::Ns(values) => json!({ "NS": values }),
        AttributeValue::L(values) => {
            json!({ "L": values.iter().map(tagged).collect::<Vec<_>>() })
        }
        AttributeValue::M(map) => json!({ "M": document_to_tagged_json(map) }),
        other => json!({ "UNSUPPORTED": format!("{:?}", other) }),
    }
}
