use crate::case::codec::TestCaseDocument;
use crate::error::{DecodeError, Field, ValidationError};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The caller-supplied part of a test case. An unsaved test case is exactly
/// a draft.
#[derive(Clone, Debug, PartialEq, Eq, Builder)]
pub struct TestCaseDraft {
    #[builder(into)]
    pub api_id: Option<String>,
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub method: String,
    #[builder(into)]
    pub url: String,
    #[builder(into)]
    pub headers: Option<String>,
    #[builder(into)]
    pub payload: Option<String>,
    #[builder(default, into)]
    pub description: String,
    pub expected_outcome: i32,
    #[builder(into)]
    pub created_by: Option<String>,
}

/// A test case the storage layer has written. `created_at <= updated_at`
/// holds for every value of this type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedTestCase {
    id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    draft: TestCaseDraft,
}

impl SavedTestCase {
    /// Called by storage on insert: both timestamps are `now`.
    pub fn persist(
        draft: TestCaseDraft,
        id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::new(Field::Id, "must not be empty"));
        }
        Ok(SavedTestCase {
            id,
            created_at: now,
            updated_at: now,
            draft,
        })
    }

    pub fn generate(draft: TestCaseDraft, now: DateTime<Utc>) -> Self {
        SavedTestCase {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            draft,
        }
    }

    pub(crate) fn from_parts(
        id: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        draft: TestCaseDraft,
    ) -> Result<Self, DecodeError> {
        if created_at > updated_at {
            return Err(DecodeError::TimestampOrder {
                created_at: created_at.to_rfc3339(),
                updated_at: updated_at.to_rfc3339(),
            });
        }
        Ok(SavedTestCase {
            id,
            created_at,
            updated_at,
            draft,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn draft(&self) -> &TestCaseDraft {
        &self.draft
    }

    pub fn into_draft(self) -> TestCaseDraft {
        self.draft
    }

    /// Applies `update` and refreshes `updated_at`. A clock that went
    /// backwards leaves `updated_at` where it was.
    pub fn apply(&mut self, update: TestCaseUpdate, now: DateTime<Utc>) {
        update.apply_to(&mut self.draft);
        self.updated_at = self.updated_at.max(now);
    }

    pub(crate) fn map_draft(self, f: impl FnOnce(TestCaseDraft) -> TestCaseDraft) -> Self {
        SavedTestCase {
            draft: f(self.draft),
            ..self
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TestCaseDocument", into = "TestCaseDocument")]
pub enum TestCase {
    Unsaved(TestCaseDraft),
    Saved(SavedTestCase),
}

impl TestCase {
    /// `None` until the record is persisted.
    pub fn id(&self) -> Option<&str> {
        match self {
            TestCase::Unsaved(_) => None,
            TestCase::Saved(saved) => Some(saved.id()),
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, TestCase::Saved(_))
    }

    pub fn draft(&self) -> &TestCaseDraft {
        match self {
            TestCase::Unsaved(draft) => draft,
            TestCase::Saved(saved) => saved.draft(),
        }
    }

    pub fn into_draft(self) -> TestCaseDraft {
        match self {
            TestCase::Unsaved(draft) => draft,
            TestCase::Saved(saved) => saved.into_draft(),
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            TestCase::Unsaved(_) => None,
            TestCase::Saved(saved) => Some(saved.created_at()),
        }
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        match self {
            TestCase::Unsaved(_) => None,
            TestCase::Saved(saved) => Some(saved.updated_at()),
        }
    }

    /// Unsaved records carry no timestamps, so `now` only matters once saved.
    pub fn apply(&mut self, update: TestCaseUpdate, now: DateTime<Utc>) {
        match self {
            TestCase::Unsaved(draft) => update.apply_to(draft),
            TestCase::Saved(saved) => saved.apply(update, now),
        }
    }

    pub(crate) fn map_draft(self, f: impl FnOnce(TestCaseDraft) -> TestCaseDraft) -> Self {
        match self {
            TestCase::Unsaved(draft) => TestCase::Unsaved(f(draft)),
            TestCase::Saved(saved) => TestCase::Saved(saved.map_draft(f)),
        }
    }
}

impl From<TestCaseDraft> for TestCase {
    fn from(draft: TestCaseDraft) -> Self {
        TestCase::Unsaved(draft)
    }
}

impl From<SavedTestCase> for TestCase {
    fn from(saved: SavedTestCase) -> Self {
        TestCase::Saved(saved)
    }
}

/// A partial update. `None` leaves a field as is; for `api_id`, `headers`
/// and `payload`, `Some(None)` (JSON `null`) clears the field.
#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq, Builder)]
#[serde(deny_unknown_fields)]
pub struct TestCaseUpdate {
    #[serde(default, deserialize_with = "present")]
    pub api_id: Option<Option<String>>,
    #[builder(into)]
    pub name: Option<String>,
    #[builder(into)]
    pub method: Option<String>,
    #[builder(into)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub headers: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub payload: Option<Option<String>>,
    #[builder(into)]
    pub description: Option<String>,
    pub expected_outcome: Option<i32>,
}

impl TestCaseUpdate {
    pub fn is_empty(&self) -> bool {
        *self == TestCaseUpdate::default()
    }

    fn apply_to(self, draft: &mut TestCaseDraft) {
        if let Some(api_id) = self.api_id {
            draft.api_id = api_id;
        }
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(method) = self.method {
            draft.method = method;
        }
        if let Some(url) = self.url {
            draft.url = url;
        }
        if let Some(headers) = self.headers {
            draft.headers = headers;
        }
        if let Some(payload) = self.payload {
            draft.payload = payload;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(expected_outcome) = self.expected_outcome {
            draft.expected_outcome = expected_outcome;
        }
    }
}

// a key that is present, even as `null`, becomes `Some`
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn login() -> TestCaseDraft {
        TestCaseDraft::builder()
            .name("Login")
            .method("POST")
            .url("http://x/y")
            .payload(r#"{"user":"a"}"#)
            .expected_outcome(200)
            .build()
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn builder_defaults() {
        let draft = login();
        assert_eq!(draft.description, "");
        assert_eq!(draft.headers, None);
        assert_eq!(draft.api_id, None);
        assert_eq!(draft.created_by, None);
        assert_eq!(draft.payload.as_deref(), Some(r#"{"user":"a"}"#));
    }

    #[test]
    fn unsaved_has_no_id_or_timestamps() {
        let case = TestCase::from(login());
        assert_eq!(case.id(), None);
        assert!(!case.is_persisted());
        assert_eq!(case.created_at(), None);
        assert_eq!(case.updated_at(), None);
    }

    #[test]
    fn persist_sets_both_timestamps() {
        let saved = SavedTestCase::persist(login(), "tc-1", noon()).unwrap();
        assert_eq!(saved.id(), "tc-1");
        assert_eq!(saved.created_at(), noon());
        assert_eq!(saved.updated_at(), noon());
        let case = TestCase::from(saved);
        assert_eq!(case.id(), Some("tc-1"));
        assert!(case.is_persisted());
        assert_eq!(case.draft().name, "Login");
    }

    #[test]
    fn persist_rejects_blank_id() {
        let err = SavedTestCase::persist(login(), "  ", noon()).unwrap_err();
        assert_eq!(err.field, Field::Id);
    }

    #[test]
    fn generated_ids_are_unique() {
        let first = SavedTestCase::generate(login(), noon());
        let second = SavedTestCase::generate(login(), noon());
        assert!(!first.id().is_empty());
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn apply_refreshes_updated_at() {
        let mut saved = SavedTestCase::persist(login(), "tc-1", noon()).unwrap();
        let later = noon() + Duration::minutes(5);
        saved.apply(
            TestCaseUpdate::builder().name("Login v2").expected_outcome(201).build(),
            later,
        );
        assert_eq!(saved.draft().name, "Login v2");
        assert_eq!(saved.draft().expected_outcome, 201);
        assert_eq!(saved.draft().method, "POST");
        assert_eq!(saved.created_at(), noon());
        assert_eq!(saved.updated_at(), later);
    }

    #[test]
    fn apply_never_moves_updated_at_backwards() {
        let mut saved = SavedTestCase::persist(login(), "tc-1", noon()).unwrap();
        saved.apply(TestCaseUpdate::default(), noon() - Duration::hours(1));
        assert_eq!(saved.updated_at(), noon());
        assert!(saved.created_at() <= saved.updated_at());
    }

    #[test]
    fn apply_keeps_creator() {
        let mut case = TestCase::from(
            TestCaseDraft::builder()
                .name("Ping")
                .method("GET")
                .url("https://api.example.com/ping")
                .expected_outcome(200)
                .created_by("user-7")
                .build(),
        );
        case.apply(TestCaseUpdate::builder().description("health").build(), noon());
        assert_eq!(case.draft().created_by.as_deref(), Some("user-7"));
        assert_eq!(case.draft().description, "health");
        assert_eq!(case.updated_at(), None);
    }

    #[test]
    fn update_distinguishes_null_from_missing() {
        let clear: TestCaseUpdate = serde_json::from_value(json!({ "payload": null })).unwrap();
        assert_eq!(clear.payload, Some(None));
        assert_eq!(clear.headers, None);

        let set: TestCaseUpdate = serde_json::from_value(json!({ "headers": "" })).unwrap();
        assert_eq!(set.headers, Some(Some("".to_string())));

        let mut case = TestCase::from(login());
        case.apply(clear, noon());
        assert_eq!(case.draft().payload, None);
        case.apply(set, noon());
        assert_eq!(case.draft().headers.as_deref(), Some(""));
    }

    #[test]
    fn update_rejects_generated_fields() {
        let result = serde_json::from_value::<TestCaseUpdate>(json!({ "_id": "x" }));
        assert!(result.is_err());
        let result = serde_json::from_value::<TestCaseUpdate>(json!({ "created_by": "x" }));
        assert!(result.is_err());
    }

    #[test]
    fn empty_update() {
        assert!(TestCaseUpdate::default().is_empty());
        assert!(!TestCaseUpdate::builder().url("http://a").build().is_empty());
    }

    #[test]
    fn from_parts_checks_order() {
        let result = SavedTestCase::from_parts(
            "tc-1".to_string(),
            noon(),
            noon() - Duration::seconds(1),
            login(),
        );
        assert!(matches!(result, Err(DecodeError::TimestampOrder { .. })));
    }

    #[test]
    fn update_can_set_and_clear_api_id() {
        let mut case = TestCase::from(login());
        let set: TestCaseUpdate = serde_json::from_value(json!({ "api_id": "api-3" })).unwrap();
        assert_eq!(set.api_id, Some(Some("api-3".to_string())));
        case.apply(set, noon());
        assert_eq!(case.draft().api_id.as_deref(), Some("api-3"));

        case.apply(TestCaseUpdate::default(), noon());
        assert_eq!(case.draft().api_id.as_deref(), Some("api-3"));

        let clear: TestCaseUpdate = serde_json::from_value(json!({ "api_id": null })).unwrap();
        assert_eq!(clear.api_id, Some(None));
        case.apply(clear, noon());
        assert_eq!(case.draft().api_id, None);

        case.apply(TestCaseUpdate::builder().api_id(Some("api-4".to_string())).build(), noon());
        assert_eq!(case.draft().api_id.as_deref(), Some("api-4"));
    }
}
