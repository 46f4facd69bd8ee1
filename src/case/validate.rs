use crate::case::model::{TestCase, TestCaseDraft};
use crate::case::normalize::normalize;
use crate::config::ValidationRules;
use crate::error::{Field, ValidationError, ValidationErrors};
use crate::http::HttpMethod;
use reqwest::Url;
use std::str::FromStr;
use tracing::debug;

/// Checks a test case against `rules` and reports every offending field.
/// Does not normalize, so spelling is not judged here: `post` passes and a
/// name of spaces is not empty. See [`prepare`].
pub fn validate(case: &TestCase, rules: &ValidationRules) -> Result<(), ValidationErrors> {
    let mut errors = validate_draft(case.draft(), rules);
    if let TestCase::Saved(saved) = case {
        if saved.id().trim().is_empty() {
            errors.push(ValidationError::new(Field::Id, "must not be empty"));
        }
        if saved.created_at() > saved.updated_at() {
            errors.push(ValidationError::new(
                Field::UpdatedAt,
                "must not be earlier than created_at",
            ));
        }
    }
    match ValidationErrors::from_vec(errors) {
        None => Ok(()),
        Some(errors) => {
            debug!(
                name = %case.draft().name,
                fields = ?errors.fields(),
                "test case failed validation"
            );
            Err(errors)
        }
    }
}

/// Normalizes, then validates. The entry point for records crossing a
/// boundary.
pub fn prepare(case: TestCase, rules: &ValidationRules) -> Result<TestCase, ValidationErrors> {
    let case = normalize(case);
    validate(&case, rules)?;
    Ok(case)
}

fn validate_draft(draft: &TestCaseDraft, rules: &ValidationRules) -> Vec<ValidationError> {
    let mut errors = vec![];
    if draft.name.is_empty() {
        errors.push(ValidationError::new(Field::Name, "must not be empty"));
    }
    if let Err(reason) = check_method(&draft.method, rules) {
        errors.push(ValidationError::new(Field::Method, reason));
    }
    if let Err(reason) = check_url(&draft.url, rules) {
        errors.push(ValidationError::new(Field::Url, reason));
    }
    if !rules.expected_outcome.contains(draft.expected_outcome) {
        errors.push(ValidationError::new(
            Field::ExpectedOutcome,
            format!(
                "{} is outside {}..={}",
                draft.expected_outcome, rules.expected_outcome.min, rules.expected_outcome.max
            ),
        ));
    }
    errors
}

fn check_method(method: &str, rules: &ValidationRules) -> Result<(), String> {
    if method.is_empty() {
        return Err("must not be empty".to_string());
    }
    let parsed = HttpMethod::from_str(method)
        .map_err(|_| format!("unrecognized HTTP method '{}'", method))?;
    if !rules.methods.contains(&parsed) {
        return Err(format!("{} is not an allowed method", parsed));
    }
    Ok(())
}

fn check_url(url: &str, rules: &ValidationRules) -> Result<(), String> {
    if url.is_empty() {
        return Err("must not be empty".to_string());
    }
    let parsed = Url::parse(url).map_err(|e| format!("not a valid URL: {}", e))?;
    if !rules.url_schemes.contains(parsed.scheme()) {
        return Err(format!("scheme '{}' is not allowed", parsed.scheme()));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err("must have a host".to_string());
    }
    Ok(())
}
