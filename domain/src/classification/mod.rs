//! Classification subdomain
//!
//! - [`category::Category`]: the closed category enumeration and its fixed regimes
//! - [`result::ClassificationResult`]: immutable classifier output
//! - [`policy::ConfidencePolicy`]: threshold/ambiguity gate producing
//!   `Result<ClassificationResult, EscalationRequired>`
//! - [`parsing::parse_classification`]: boundary decoding of collaborator output

pub mod category;
pub mod parsing;
pub mod policy;
pub mod result;

pub use category::{Category, CategoryScore};
pub use parsing::{CLASSIFIER_TOOL, parse_classification};
pub use policy::ConfidencePolicy;
pub use result::{AttemptId, ClassificationResult};
