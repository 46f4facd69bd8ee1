use crate::error::Error;
use crate::http::HttpMethod;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

pub const RULES_ENV: &str = "TESTCASE_RULES";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutcomeRange {
    pub min: i32,
    pub max: i32,
}

impl OutcomeRange {
    pub fn contains(&self, code: i32) -> bool {
        self.min <= code && code <= self.max
    }
}

impl Default for OutcomeRange {
    /// The HTTP status code space.
    fn default() -> Self {
        OutcomeRange { min: 100, max: 599 }
    }
}

/// What `validate` accepts. Keys omitted from a rules file keep their
/// defaults.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationRules {
    pub methods: BTreeSet<HttpMethod>,
    pub url_schemes: BTreeSet<String>,
    pub expected_outcome: OutcomeRange,
}

impl Default for ValidationRules {
    fn default() -> Self {
        ValidationRules {
            methods: BTreeSet::from([
                HttpMethod::GET,
                HttpMethod::HEAD,
                HttpMethod::POST,
                HttpMethod::PUT,
                HttpMethod::PATCH,
                HttpMethod::DELETE,
                HttpMethod::OPTIONS,
            ]),
            url_schemes: BTreeSet::from(["http".to_string(), "https".to_string()]),
            expected_outcome: OutcomeRange::default(),
        }
    }
}

impl ValidationRules {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let rules: ValidationRules = serde_json::from_str(json)?;
        rules.check()?;
        Ok(rules)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        info!("loading validation rules from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Loads from `path` when given, otherwise falls back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn check(&self) -> Result<(), Error> {
        if self.methods.is_empty() {
            return Err(Error::Config("methods must not be empty".to_string()));
        }
        if self.url_schemes.is_empty() {
            return Err(Error::Config("url_schemes must not be empty".to_string()));
        }
        if self.expected_outcome.min > self.expected_outcome.max {
            return Err(Error::Config(format!(
                "expected_outcome.min ({}) is greater than expected_outcome.max ({})",
                self.expected_outcome.min, self.expected_outcome.max
            )));
        }
        Ok(())
    }
}
