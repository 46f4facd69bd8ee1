pub mod case;
pub mod config;
pub mod error;
pub mod http;
pub mod report;

pub use case::{normalize, prepare, validate, SavedTestCase, TestCase, TestCaseDraft, TestCaseUpdate};
pub use config::ValidationRules;
pub use error::{Error, Field, ValidationError, ValidationErrors};
