//! Prompt templates for each collaborator call

use crate::classification::category::Category;
use crate::coordination::aggregate::AggregatedContext;
use serde_json::{Value, json};

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the classification call
    pub fn classification_system() -> &'static str {
        r#"You are a computerized-system validation specialist.
Your task is to assign a requirement document to exactly one software category
and to report how confident you are in that assignment.
Report your own confidence honestly; a low value is an acceptable answer."#
    }

    /// User prompt for classification
    pub fn classification_prompt(document_name: &str, content: &str) -> String {
        let mut prompt = format!(
            "Classify the following requirement document ({}).\n\nCategories:\n",
            document_name
        );
        for category in Category::ALL {
            prompt.push_str(&format!("- {}: {}\n", category.as_str(), category.display_name()));
        }
        prompt.push_str(&format!(
            r#"
Document:
---
{}
---

Respond with a JSON object:
```json
{{
  "category": "<one of the category names above>",
  "confidence": <number between 0 and 1>,
  "rationale": "<why this category>",
  "indicators": ["<evidence from the document>", ...],
  "scores": {{"<category>": <number between 0 and 1>, ...}}
}}
```"#,
            content
        ));
        prompt
    }

    /// System prompt for the research agent
    pub fn research_system() -> &'static str {
        r#"You are a regulatory research analyst.
Summarise the validation expectations that apply to systems of the given category,
citing guidance documents where you know them."#
    }

    pub fn research_prompt(category: Category, excerpt: &str) -> String {
        format!(
            r#"Category: {}

Requirement excerpt:
---
{}
---

Respond with a JSON object:
```json
{{"findings": ["..."], "references": ["..."]}}
```"#,
            category.display_name(),
            excerpt
        )
    }

    /// System prompt for the subject-matter-expert agent
    pub fn sme_system() -> &'static str {
        r#"You are a senior test engineer reviewing a requirement document.
Identify the functional areas that carry the most risk and recommend where testing must focus."#
    }

    pub fn sme_prompt(category: Category, excerpt: &str) -> String {
        format!(
            r#"Category: {}

Requirement excerpt:
---
{}
---

Respond with a JSON object:
```json
{{"recommendations": ["..."], "risk_notes": ["..."]}}
```"#,
            category.display_name(),
            excerpt
        )
    }

    /// System prompt for test-suite generation
    pub fn generation_system() -> &'static str {
        r#"You write formal validation test cases for regulated computerized systems.
Every test case must be traceable to a requirement and have concrete, verifiable steps."#
    }

    /// User prompt for generation; states the exact case count required.
    pub fn generation_prompt(context: &AggregatedContext, excerpt: &str) -> String {
        let category = context.category();
        let mut prompt = format!(
            "Write exactly {} test cases for a {} system.\n\nRequirement excerpt:\n---\n{}\n---\n",
            category.required_test_count(),
            category.display_name(),
            excerpt
        );

        if !context.context().passages.is_empty() {
            prompt.push_str("\nReference passages:\n");
            for passage in &context.context().passages {
                prompt.push_str(&format!("\n--- {} ---\n{}\n", passage.source, passage.text));
            }
        }

        prompt.push_str("\nResearch findings:\n");
        for finding in &context.research().findings {
            prompt.push_str(&format!("- {}\n", finding));
        }

        prompt.push_str("\nExpert recommendations:\n");
        for rec in &context.sme().recommendations {
            prompt.push_str(&format!("- {}\n", rec));
        }
        for note in &context.sme().risk_notes {
            prompt.push_str(&format!("- Risk: {}\n", note));
        }

        prompt.push_str(&format!(
            r#"
Respond with a JSON object containing exactly {} entries:
```json
{{
  "test_cases": [
    {{
      "id": "TC-001",
      "title": "...",
      "objective": "...",
      "preconditions": ["..."],
      "steps": [{{"action": "...", "expected": "..."}}],
      "expected_result": "...",
      "traceability": ["<requirement id>"]
    }}
  ]
}}
```"#,
            category.required_test_count()
        ));
        prompt
    }

    /// Structured-output schema for the classification response
    pub fn classification_schema() -> Value {
        let names: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
        json!({
            "type": "object",
            "properties": {
                "category": {"type": "string", "enum": names},
                "confidence": {"type": "number", "minimum": 0.0, "maximum": 1.0},
                "rationale": {"type": "string"},
                "indicators": {"type": "array", "items": {"type": "string"}},
                "scores": {
                    "type": "object",
                    "additionalProperties": {"type": "number", "minimum": 0.0, "maximum": 1.0}
                }
            },
            "required": ["category", "confidence", "rationale"]
        })
    }

    /// Structured-output schema for generation, pinned to the category's count
    pub fn generation_schema(category: Category) -> Value {
        let required = category.required_test_count();
        json!({
            "type": "object",
            "properties": {
                "test_cases": {
                    "type": "array",
                    "minItems": required,
                    "maxItems": required,
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "string"},
                            "title": {"type": "string"},
                            "objective": {"type": "string"},
                            "preconditions": {"type": "array", "items": {"type": "string"}},
                            "steps": {
                                "type": "array",
                                "minItems": 1,
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "action": {"type": "string"},
                                        "expected": {"type": "string"}
                                    },
                                    "required": ["action", "expected"]
                                }
                            },
                            "expected_result": {"type": "string"},
                            "traceability": {
                                "type": "array",
                                "minItems": 1,
                                "items": {"type": "string"}
                            }
                        },
                        "required": ["id", "title", "objective", "steps", "expected_result", "traceability"]
                    }
                }
            },
            "required": ["test_cases"]
        })
    }
}
