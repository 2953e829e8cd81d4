//! Strict-cardinality test suite

use super::test_case::TestCase;
use crate::classification::category::Category;
use crate::core::error::{ValidationFailure, WorkflowError};
use serde::Serialize;
use std::collections::HashSet;

/// A validated set of test cases for one category.
///
/// Only [`TestSuite::validate`] builds one. The case list is never
/// truncated, padded or de-duplicated: a count mismatch or a single
/// invalid case rejects the whole suite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestSuite {
    category: Category,
    required_count: usize,
    cases: Vec<TestCase>,
    is_valid: bool,
}

impl TestSuite {
    /// Validate `cases` against the category's fixed regime.
    ///
    /// `raw_output` is the collaborator text the cases were decoded from; it
    /// is attached verbatim to any validation error.
    pub fn validate(
        category: Category,
        cases: Vec<TestCase>,
        raw_output: &str,
    ) -> Result<Self, WorkflowError> {
        let required_count = category.required_test_count();
        if cases.len() != required_count {
            return Err(WorkflowError::validation(
                ValidationFailure::Cardinality {
                    category,
                    expected: required_count,
                    actual: cases.len(),
                },
                raw_output,
            ));
        }

        let mut ids = HashSet::with_capacity(cases.len());
        for (index, case) in cases.iter().enumerate() {
            case.check_schema(index)
                .map_err(|failure| WorkflowError::validation(failure, raw_output))?;
            if !ids.insert(case.id.trim()) {
                return Err(WorkflowError::validation(
                    ValidationFailure::Schema {
                        case_index: index,
                        case_id: Some(case.id.clone()),
                        field: "id".into(),
                        reason: "duplicate id within suite".into(),
                    },
                    raw_output,
                ));
            }
        }

        Ok(Self {
            category,
            required_count,
            cases,
            is_valid: true,
        })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn required_count(&self) -> usize {
        self.required_count
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::generation::test_case::sample_case;

    fn cases(n: usize) -> Vec<TestCase> {
        (1..=n).map(|i| sample_case(&format!("TC-{:03}", i))).collect()
    }

    #[test]
    fn test_exact_count_is_valid_for_every_category() {
        for category in Category::ALL {
            let required = category.required_test_count();
            let suite = TestSuite::validate(category, cases(required), "raw").unwrap();
            assert!(suite.is_valid());
            assert_eq!(suite.len(), suite.required_count());
        }
    }

    #[test]
    fn test_surplus_rejected_not_truncated() {
        let err = TestSuite::validate(Category::Custom, cases(27), "raw output").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.cardinality(), Some((25, 27)));
        match err {
            WorkflowError::Validation { raw_output, .. } => assert_eq!(raw_output, "raw output"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_shortfall_rejected_not_padded() {
        let err = TestSuite::validate(Category::Infrastructure, cases(4), "raw").unwrap_err();
        assert_eq!(err.cardinality(), Some((5, 4)));
    }

    #[test]
    fn test_one_invalid_case_rejects_suite() {
        let mut list = cases(5);
        list[3].expected_result.clear();
        let err = TestSuite::validate(Category::Infrastructure, list, "raw").unwrap_err();
        assert!(err.cardinality().is_none());
        assert!(err.to_string().contains("expected_result"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut list = cases(5);
        list[4].id = "TC-001".into();
        let err = TestSuite::validate(Category::Infrastructure, list, "raw").unwrap_err();
        assert!(err.to_string().contains("duplicate id"));
    }
}
