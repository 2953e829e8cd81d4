//! Decoding classifier output into a [`ClassificationResult`].
//!
//! Expected structured output:
//!
//! ```json
//! {
//!   "category": "configured",
//!   "confidence": 0.82,
//!   "rationale": "string",
//!   "indicators": ["string", ...],
//!   "scores": {"configured": 0.82, "custom": 0.11}
//! }
//! ```
//!
//! `category` may also be the numeric code; `scores` may also be a list of
//! `{"category": ..., "score": ...}` objects. Missing `category` or
//! `confidence` is a collaborator failure: nothing is filled in locally.

use super::category::{Category, CategoryScore};
use super::result::{AttemptId, ClassificationResult};
use crate::core::error::WorkflowError;
use crate::core::json::extract_json;
use serde_json::Value;

/// Tool name reported in classifier failures
pub const CLASSIFIER_TOOL: &str = "classifier";

/// Parse the classifier's raw response for one attempt.
pub fn parse_classification(
    raw: &str,
    attempt_id: AttemptId,
) -> Result<ClassificationResult, WorkflowError> {
    let fail = |message: String| WorkflowError::tool_with_response(CLASSIFIER_TOOL, message, raw);

    let json = extract_json(raw).ok_or_else(|| fail("response contains no JSON object".into()))?;

    let category = json
        .get("category")
        .ok_or_else(|| fail("missing 'category'".into()))
        .and_then(|v| category_from_value(v).map_err(fail))?;

    let confidence = json
        .get("confidence")
        .and_then(Value::as_f64)
        .ok_or_else(|| fail("missing or non-numeric 'confidence'".into()))?;

    let rationale = json
        .get("rationale")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let indicators = json
        .get("indicators")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let scores = match json.get("scores") {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => scores_from_value(value).map_err(fail)?,
    };

    ClassificationResult::new(attempt_id, category, confidence, rationale, indicators, scores)
        .map_err(fail)
}

fn category_from_value(value: &Value) -> Result<Category, String> {
    match value {
        Value::String(s) => s.parse(),
        Value::Number(n) => n.to_string().parse(),
        other => Err(format!("'category' has unexpected type: {}", other)),
    }
}

fn scores_from_value(value: &Value) -> Result<Vec<CategoryScore>, String> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, score)| {
                let category: Category = key.parse()?;
                let score = score
                    .as_f64()
                    .ok_or_else(|| format!("score for '{}' is not numeric", key))?;
                Ok(CategoryScore::new(category, score))
            })
            .collect(),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                let category = item
                    .get("category")
                    .ok_or_else(|| "score entry without 'category'".to_string())
                    .and_then(category_from_value)?;
                let score = item
                    .get("score")
                    .and_then(Value::as_f64)
                    .ok_or_else(|| "score entry without numeric 'score'".to_string())?;
                Ok(CategoryScore::new(category, score))
            })
            .collect(),
        other => Err(format!("'scores' has unexpected type: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    #[test]
    fn test_parse_full_response() {
        let raw = r#"```json
{
  "category": "configured",
  "confidence": 0.82,
  "rationale": "Vendor LIMS adapted through configuration tables",
  "indicators": ["configuration", " workflow setup ", ""],
  "scores": {"configured": 0.82, "custom": 0.11}
}
```"#;
        let result = parse_classification(raw, AttemptId::from("a")).unwrap();
        assert_eq!(result.category(), Category::Configured);
        assert_eq!(result.confidence(), 0.82);
        assert_eq!(result.indicators(), &["configuration", "workflow setup"]);
        assert_eq!(result.scores().len(), 2);
        assert_eq!(result.scores()[0].category, Category::Configured);
    }

    #[test]
    fn test_numeric_category_and_score_list() {
        let raw = r#"{"category": 5, "confidence": 0.4,
            "scores": [{"category": 5, "score": 0.4}, {"category": "4", "score": 0.35}]}"#;
        let result = parse_classification(raw, AttemptId::new()).unwrap();
        assert_eq!(result.category(), Category::Custom);
        assert_eq!(result.scores()[1].category, Category::Configured);
    }

    #[test]
    fn test_missing_confidence_is_tool_error() {
        let raw = r#"{"category": "custom"}"#;
        let err = parse_classification(raw, AttemptId::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Tool);
        match err {
            WorkflowError::Tool { tool, raw_response, .. } => {
                assert_eq!(tool, CLASSIFIER_TOOL);
                assert_eq!(raw_response.as_deref(), Some(raw));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_category_is_tool_error() {
        let raw = r#"{"category": "category 2", "confidence": 0.9}"#;
        let err = parse_classification(raw, AttemptId::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Tool);
        assert!(err.to_string().contains("Unknown category"));
    }

    #[test]
    fn test_out_of_range_confidence_is_tool_error() {
        let raw = r#"{"category": "custom", "confidence": 87}"#;
        let err = parse_classification(raw, AttemptId::new()).unwrap_err();
        assert!(err.to_string().contains("outside [0, 1]"));
    }

    #[test]
    fn test_prose_only_is_tool_error() {
        let err = parse_classification("I think it is custom software.", AttemptId::new())
            .unwrap_err();
        assert!(err.to_string().contains("no JSON"));
    }
}
