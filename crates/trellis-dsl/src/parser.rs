use lazy_static::lazy_static;
use regex::Regex;

use crate::error::DslError;
use crate::plan::Plan;

lazy_static! {
    static ref FENCE_OPEN: Regex = Regex::new(r"```json\n?").expect("valid fence regex");
    static ref FENCE_ANY: Regex = Regex::new(r"```\n?").expect("valid fence regex");
}

/// Remove markdown code fences the planner sometimes wraps around its JSON.
pub fn strip_code_fences(text: &str) -> String {
    let without_json_fences = FENCE_OPEN.replace_all(text, "");
    FENCE_ANY.replace_all(&without_json_fences, "").trim().to_string()
}

/// Parse planner output into a candidate plan.
///
/// Only the JSON syntax is checked here. The shape of the tree (node types,
/// whitelist membership) is the validator's job, so any JSON value parses:
/// a non-object simply yields a plan without a layout.
///
/// # Errors
///
/// Returns `DslError::JsonError` when the text, after fence stripping, is not
/// valid JSON.
pub fn parse_plan(text: &str) -> Result<Plan, DslError> {
    let cleaned = strip_code_fences(text);
    let value: serde_json::Value = serde_json::from_str(&cleaned)?;
    Ok(Plan::from_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        let fenced = "```json\n{\"layout\": \"hi\"}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"layout\": \"hi\"}");

        let bare = "```\n{}\n```\n";
        assert_eq!(strip_code_fences(bare), "{}");

        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn test_parse_plan_valid() {
        let plan = parse_plan("```json\n{\"layout\": {\"type\": \"Container\"}}\n```").unwrap();
        assert!(plan.layout.is_some());
    }

    #[test]
    fn test_parse_plan_invalid_json() {
        let result = parse_plan("Sure! Here is your layout: {");
        match result {
            Err(DslError::JsonError(_)) => {}
            other => panic!("Expected JsonError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_plan_non_object_has_no_layout() {
        let plan = parse_plan("[1, 2]").unwrap();
        assert!(plan.layout.is_none());
    }
}
