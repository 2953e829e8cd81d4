//! Test case entity and its schema rules

use crate::core::error::ValidationFailure;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStep {
    pub action: String,
    pub expected: String,
}

impl TestStep {
    pub fn new(action: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            expected: expected.into(),
        }
    }
}

/// One generated test case.
///
/// `preconditions` may be empty; every other field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub title: String,
    pub objective: String,
    #[serde(default)]
    pub preconditions: Vec<String>,
    pub steps: Vec<TestStep>,
    pub expected_result: String,
    /// Requirement identifiers this case verifies
    pub traceability: Vec<String>,
}

impl TestCase {
    /// Check required fields. `index` is the case's position in the suite.
    pub fn check_schema(&self, index: usize) -> Result<(), ValidationFailure> {
        let fail = |field: &str, reason: &str| ValidationFailure::Schema {
            case_index: index,
            case_id: (!self.id.trim().is_empty()).then(|| self.id.clone()),
            field: field.to_string(),
            reason: reason.to_string(),
        };

        for (field, value) in [
            ("id", &self.id),
            ("title", &self.title),
            ("objective", &self.objective),
            ("expected_result", &self.expected_result),
        ] {
            if value.trim().is_empty() {
                return Err(fail(field, "must not be empty"));
            }
        }

        if self.steps.is_empty() {
            return Err(fail("steps", "at least one step is required"));
        }
        for (n, step) in self.steps.iter().enumerate() {
            if step.action.trim().is_empty() || step.expected.trim().is_empty() {
                return Err(fail(
                    "steps",
                    &format!("step {} needs both an action and an expected outcome", n + 1),
                ));
            }
        }

        if self.traceability.iter().all(|t| t.trim().is_empty()) {
            return Err(fail("traceability", "at least one requirement reference is required"));
        }
        if self.preconditions.iter().any(|p| p.trim().is_empty()) {
            return Err(fail("preconditions", "blank precondition"));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn sample_case(id: &str) -> TestCase {
    TestCase {
        id: id.to_string(),
        title: format!("Verify {}", id),
        objective: "Confirm the requirement is met".into(),
        preconditions: vec!["User has QA role".into()],
        steps: vec![TestStep::new("Open the audit screen", "Audit trail is shown")],
        expected_result: "Audit entries are complete".into(),
        traceability: vec!["URS-001".into()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_case() {
        assert!(sample_case("TC-001").check_schema(0).is_ok());
    }

    #[test]
    fn test_empty_title_rejected() {
        let mut case = sample_case("TC-002");
        case.title = "  ".into();
        let failure = case.check_schema(1).unwrap_err();
        assert_eq!(
            failure,
            ValidationFailure::Schema {
                case_index: 1,
                case_id: Some("TC-002".into()),
                field: "title".into(),
                reason: "must not be empty".into(),
            }
        );
    }

    #[test]
    fn test_missing_id_reports_no_id() {
        let mut case = sample_case("");
        case.id = String::new();
        match case.check_schema(4).unwrap_err() {
            ValidationFailure::Schema { case_id, field, .. } => {
                assert!(case_id.is_none());
                assert_eq!(field, "id");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_step_without_expected_rejected() {
        let mut case = sample_case("TC-003");
        case.steps.push(TestStep::new("Click save", ""));
        let failure = case.check_schema(0).unwrap_err();
        assert!(failure.to_string().contains("step 2"));
    }

    #[test]
    fn test_no_traceability_rejected() {
        let mut case = sample_case("TC-004");
        case.traceability.clear();
        assert!(case.check_schema(0).is_err());
    }
}
