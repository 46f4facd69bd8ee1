use crate::case::model::{TestCase, TestCaseDraft};

/// Canonical form of a test case. Pure and idempotent; `_id` and the
/// timestamps are never touched.
pub fn normalize(case: TestCase) -> TestCase {
    case.map_draft(normalize_draft)
}

pub fn normalize_draft(draft: TestCaseDraft) -> TestCaseDraft {
    TestCaseDraft {
        api_id: trimmed_or_none(draft.api_id),
        name: draft.name.trim().to_string(),
        method: draft.method.trim().to_ascii_uppercase(),
        url: draft.url.trim().to_string(),
        headers: blank_to_none(draft.headers),
        payload: blank_to_none(draft.payload),
        description: draft.description.trim().to_string(),
        expected_outcome: draft.expected_outcome,
        created_by: trimmed_or_none(draft.created_by),
    }
}

fn trimmed_or_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// bodies can be whitespace-sensitive, so non-blank values stay as given
fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::model::SavedTestCase;
    use chrono::{TimeZone, Utc};

    fn messy() -> TestCaseDraft {
        TestCaseDraft::builder()
            .name("  Login ")
            .method(" post\n")
            .url(" http://x/y ")
            .headers("")
            .payload("  {\"user\": \"a\"}\n")
            .description("\tsigns in ")
            .expected_outcome(200)
            .api_id("   ")
            .created_by(" user-1 ")
            .build()
    }

    #[test]
    fn trims_and_uppercases() {
        let draft = normalize_draft(messy());
        assert_eq!(draft.name, "Login");
        assert_eq!(draft.method, "POST");
        assert_eq!(draft.url, "http://x/y");
        assert_eq!(draft.description, "signs in");
        assert_eq!(draft.created_by.as_deref(), Some("user-1"));
        assert_eq!(draft.api_id, None);
        assert_eq!(draft.expected_outcome, 200);
    }

    #[test]
    fn empty_headers_become_absent() {
        let draft = normalize_draft(messy());
        assert_eq!(draft.headers, None);
        let whitespace = TestCaseDraft {
            payload: Some(" \n ".to_string()),
            ..messy()
        };
        assert_eq!(normalize_draft(whitespace).payload, None);
    }

    #[test]
    fn payload_content_is_kept_verbatim() {
        let draft = normalize_draft(messy());
        assert_eq!(draft.payload.as_deref(), Some("  {\"user\": \"a\"}\n"));
    }

    #[test]
    fn absent_stays_absent() {
        let draft = TestCaseDraft {
            headers: None,
            payload: None,
            ..messy()
        };
        let normalized = normalize_draft(draft);
        assert_eq!(normalized.headers, None);
        assert_eq!(normalized.payload, None);
    }

    #[test]
    fn idempotent() {
        let once = normalize(TestCase::from(messy()));
        let twice = normalize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn saved_identity_untouched() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let saved = SavedTestCase::persist(messy(), "tc-1", now).unwrap();
        let normalized = normalize(TestCase::Saved(saved));
        assert_eq!(normalized.id(), Some("tc-1"));
        assert_eq!(normalized.created_at(), Some(now));
        assert_eq!(normalized.updated_at(), Some(now));
        assert_eq!(normalized.draft().method, "POST");
    }
}
