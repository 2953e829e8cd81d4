//! Boundary decoding of research and SME collaborator output.
//!
//! Research output:
//! ```json
//! {"findings": ["..."], "references": ["..."]}
//! ```
//! SME output:
//! ```json
//! {"recommendations": ["..."], "risk_notes": ["..."]}
//! ```
//! A payload with no findings (research) or no recommendations (SME) is
//! malformed: an empty answer is never accepted as advice.

use super::agent::{AgentFailure, ResearchPayload, SmePayload};
use crate::core::json::extract_json;
use serde_json::Value;

pub fn parse_research_payload(raw: &str) -> Result<ResearchPayload, AgentFailure> {
    let json = extract_json(raw)
        .ok_or_else(|| AgentFailure::malformed("research response contains no JSON object"))?;
    let findings = string_list(&json, "findings");
    if findings.is_empty() {
        return Err(AgentFailure::malformed("research response has no findings"));
    }
    Ok(ResearchPayload {
        findings,
        references: string_list(&json, "references"),
    })
}

pub fn parse_sme_payload(raw: &str) -> Result<SmePayload, AgentFailure> {
    let json = extract_json(raw)
        .ok_or_else(|| AgentFailure::malformed("sme response contains no JSON object"))?;
    let recommendations = string_list(&json, "recommendations");
    if recommendations.is_empty() {
        return Err(AgentFailure::malformed("sme response has no recommendations"));
    }
    Ok(SmePayload {
        recommendations,
        risk_notes: string_list(&json, "risk_notes"),
    })
}

fn string_list(json: &Value, field: &str) -> Vec<String> {
    json.get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
