pub mod codec;
pub mod model;
pub mod normalize;
pub mod validate;

pub use model::{SavedTestCase, TestCase, TestCaseDraft, TestCaseUpdate};
pub use normalize::normalize;
pub use validate::{prepare, validate};
