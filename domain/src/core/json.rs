//! Structured-output extraction from collaborator text.
//!
//! Collaborators are asked for JSON but may wrap it in a fenced block or
//! surround it with prose. Extraction is the only leniency applied: the
//! decoded value is then validated strictly by the caller.

use serde_json::Value;

/// Extract a JSON object from collaborator output.
///
/// Tries, in order:
/// 1. the whole text as JSON
/// 2. the first ` ```json ` (or bare ` ``` `) fenced block that parses
/// 3. the outermost `{ ... }` span
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    let mut in_block = false;
    let mut current = String::new();
    for line in trimmed.lines() {
        let marker = line.trim();
        if !in_block && (marker == "```json" || marker == "```") {
            in_block = true;
            current.clear();
        } else if in_block && marker == "```" {
            in_block = false;
            if let Ok(value) = serde_json::from_str::<Value>(&current) {
                return Some(value);
            }
        } else if in_block {
            current.push_str(line);
            current.push('\n');
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&trimmed[start..=end]).ok()
}

/// Extract exactly one JSON document from collaborator output.
///
/// Unlike [`extract_json`], a second fenced block or a second top-level
/// value is an error rather than ignored, so no part of the output can be
/// dropped silently.
pub fn extract_single_json(text: &str) -> Result<Value, String> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    let mut blocks: Vec<String> = Vec::new();
    let mut outside = String::new();
    let mut in_block = false;
    for line in trimmed.lines() {
        let marker = line.trim();
        if !in_block && (marker == "```json" || marker == "```") {
            in_block = true;
            blocks.push(String::new());
        } else if in_block && marker == "```" {
            in_block = false;
        } else if in_block {
            if let Some(current) = blocks.last_mut() {
                current.push_str(line);
                current.push('\n');
            }
        } else {
            outside.push_str(line);
            outside.push('\n');
        }
    }
    if in_block {
        return Err("unterminated fenced block".to_string());
    }

    match blocks.len() {
        0 => single_value(trimmed),
        1 => {
            if outside.contains('{') {
                return Err("JSON found both inside and outside the fenced block".to_string());
            }
            serde_json::from_str::<Value>(&blocks[0])
                .map_err(|e| format!("fenced block is not valid JSON: {}", e))
        }
        n => Err(format!("found {} fenced blocks, expected exactly one", n)),
    }
}

/// Decode the first top-level value and reject anything JSON-like after it.
fn single_value(text: &str) -> Result<Value, String> {
    let start = text
        .find(['{', '['])
        .ok_or_else(|| "no JSON found in output".to_string())?;
    let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
    let value = match stream.next() {
        Some(Ok(value)) => value,
        Some(Err(e)) => return Err(format!("invalid JSON: {}", e)),
        None => return Err("no JSON found in output".to_string()),
    };
    let rest = &text[start + stream.byte_offset()..];
    if rest.contains(['{', '[']) {
        return Err("more than one top-level JSON value in output".to_string());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_json() {
        let value = extract_json(r#"{"category": "custom"}"#).unwrap();
        assert_eq!(value["category"], "custom");
    }

    #[test]
    fn test_fenced_block() {
        let text = "Here is my answer:\n```json\n{\"confidence\": 0.8}\n```\nThanks.";
        let value = extract_json(text).unwrap();
        assert_eq!(value["confidence"], 0.8);
    }

    #[test]
    fn test_embedded_object() {
        let text = "Result -> {\"a\": [1, 2]} <- end";
        let value = extract_json(text).unwrap();
        assert_eq!(value["a"][1], 2);
    }

    #[test]
    fn test_no_json() {
        assert!(extract_json("no structured output here").is_none());
        assert!(extract_json("} backwards {").is_none());
    }

    #[test]
    fn test_single_accepts_one_fenced_block_with_prose() {
        let text = "Here you go:\n```json\n{\"test_cases\": []}\n```\nDone.";
        let value = extract_single_json(text).unwrap();
        assert!(value["test_cases"].is_array());
    }

    #[test]
    fn test_single_rejects_second_fenced_block() {
        let text = "```json\n{\"a\": 1}\n```\nmore:\n```json\n{\"a\": 2}\n```";
        let err = extract_single_json(text).unwrap_err();
        assert!(err.contains("2 fenced blocks"));
    }

    #[test]
    fn test_single_rejects_second_top_level_value() {
        let err = extract_single_json("{\"a\": 1}\n{\"a\": 2}").unwrap_err();
        assert!(err.contains("more than one"));
        assert!(extract_single_json("prefix [1, 2] suffix").is_ok());
    }

    #[test]
    fn test_single_rejects_json_outside_fence() {
        let text = "{\"extra\": true}\n```json\n{\"a\": 1}\n```";
        assert!(extract_single_json(text).is_err());
    }
}
