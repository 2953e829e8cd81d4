//! Decoding generation output into test cases.
//!
//! Accepts `{"test_cases": [...]}` (optionally fenced) or a bare JSON array.
//! The output must hold exactly one JSON document; extra blocks are rejected.
//! Decoding does not look at the count; that is [`TestSuite::validate`]'s job.
//!
//! [`TestSuite::validate`]: super::suite::TestSuite::validate

use super::test_case::TestCase;
use crate::core::error::{ValidationFailure, WorkflowError};
use crate::core::json::extract_single_json;
use serde_json::Value;

pub fn parse_test_cases(raw: &str) -> Result<Vec<TestCase>, WorkflowError> {
    let malformed = |reason: String| {
        WorkflowError::validation(ValidationFailure::MalformedOutput { reason }, raw)
    };

    let json = extract_single_json(raw).map_err(malformed)?;
    let list = match json {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("test_cases") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(malformed("'test_cases' is not an array".into())),
            None => return Err(malformed("missing 'test_cases'".into())),
        },
        _ => return Err(malformed("expected an object or array".into())),
    };

    list.into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<TestCase>(item)
                .map_err(|e| malformed(format!("test case #{}: {}", index + 1, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    const CASE: &str = r#"{"id": "TC-001", "title": "Login", "objective": "Access control",
        "steps": [{"action": "Log in", "expected": "Dashboard"}],
        "expected_result": "Only authorised users log in", "traceability": ["URS-1"]}"#;

    #[test]
    fn test_parse_wrapped_object() {
        let raw = format!("```json\n{{\"test_cases\": [{}, {}]}}\n```", CASE, CASE);
        let cases = parse_test_cases(&raw).unwrap();
        assert_eq!(cases.len(), 2);
        assert!(cases[0].preconditions.is_empty());
    }

    #[test]
    fn test_parse_bare_array() {
        let raw = format!("[{}]", CASE);
        assert_eq!(parse_test_cases(&raw).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let raw = r#"{"test_cases": [{"id": "TC-1"}]}"#;
        let err = parse_test_cases(raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("test case #1"));
    }

    #[test]
    fn test_missing_list_is_malformed() {
        let err = parse_test_cases(r#"{"cases": []}"#).unwrap_err();
        assert!(err.to_string().contains("missing 'test_cases'"));
    }

    #[test]
    fn test_split_suite_across_blocks_is_rejected() {
        let first: Vec<&str> = std::iter::repeat_n(CASE, 25).collect();
        let second: Vec<&str> = std::iter::repeat_n(CASE, 2).collect();
        let raw = format!(
            "```json\n{{\"test_cases\": [{}]}}\n```\nAdditional cases:\n```json\n{{\"test_cases\": [{}]}}\n```",
            first.join(", "),
            second.join(", ")
        );
        let err = parse_test_cases(&raw).unwrap_err();
        match err {
            WorkflowError::Validation {
                failure: ValidationFailure::MalformedOutput { reason },
                raw_output,
                ..
            } => {
                assert!(reason.contains("2 fenced blocks"));
                assert_eq!(raw_output, raw);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
