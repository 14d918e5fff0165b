//! Reply normalisation.
//!
//! Models do not reliably stick to the field names they were asked for, so each
//! logical value is looked up through an ordered list of keys; the first key that
//! holds a usable value wins, otherwise a fixed default applies.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::action::AssistAction;
use crate::prompt::QUESTION_SUGGESTION_COUNT;

/// Keys that may carry the rewritten text, in priority order.
pub const IMPROVED_KEYS: &[&str] = &["improved_content", "content", "improved"];
/// Keys that may carry the reasoning for a rewrite, in priority order.
pub const REASONING_KEYS: &[&str] = &["reasoning", "explanation", "changes"];
pub const SUGGESTION_KEYS: &[&str] = &["suggestions"];
pub const TITLE_LIST_KEYS: &[&str] = &["titles"];
pub const SINGLE_TITLE_KEYS: &[&str] = &["title"];
pub const TITLE_REASONING_KEYS: &[&str] = &["reasoning"];
pub const QUESTION_KEYS: &[&str] = &["questions"];

pub const DEFAULT_REASONING: &str = "Content improved";
pub const DEFAULT_TITLE_REASONING: &str = "Generated title suggestions";

/// Stable response contract, whatever field names the model used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistResponse {
    pub original_content: String,
    pub improved_content: String,
    pub suggestions: Vec<String>,
    pub reasoning: String,
}

/// Parses the raw assistant message into a JSON object.
///
/// An empty message counts as `{}`. Valid JSON that is not an object yields an
/// empty map, so every field falls back to its default.
pub fn reply_object(raw: &str) -> Result<Map<String, Value>, serde_json::Error> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// First key whose value is a non-empty string.
pub fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
}

/// First key whose value is an array; string entries are kept, anything else skipped.
///
/// An empty array still counts as present.
pub fn first_list(obj: &Map<String, Value>, keys: &[&str]) -> Option<Vec<String>> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find_map(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
}

/// Builds the response for `action` from the parsed reply object.
pub fn normalize(action: AssistAction, original: &str, obj: &Map<String, Value>) -> AssistResponse {
    match action {
        AssistAction::SuggestTitle => {
            let suggestions = first_list(obj, TITLE_LIST_KEYS).unwrap_or_else(|| {
                vec![first_text(obj, SINGLE_TITLE_KEYS).unwrap_or_else(|| original.to_string())]
            });
            let improved_content = suggestions
                .first()
                .filter(|t| !t.is_empty())
                .cloned()
                .unwrap_or_else(|| original.to_string());
            AssistResponse {
                original_content: original.to_string(),
                improved_content,
                suggestions,
                reasoning: first_text(obj, TITLE_REASONING_KEYS)
                    .unwrap_or_else(|| DEFAULT_TITLE_REASONING.to_string()),
            }
        }
        AssistAction::Polish | AssistAction::Clarify | AssistAction::Concise => AssistResponse {
            original_content: original.to_string(),
            improved_content: first_text(obj, IMPROVED_KEYS)
                .unwrap_or_else(|| original.to_string()),
            suggestions: first_list(obj, SUGGESTION_KEYS).unwrap_or_default(),
            reasoning: first_text(obj, REASONING_KEYS)
                .unwrap_or_else(|| DEFAULT_REASONING.to_string()),
        },
    }
}

/// Extracts follow-up questions, keeping at most [`QUESTION_SUGGESTION_COUNT`].
pub fn questions(obj: &Map<String, Value>) -> Vec<String> {
    let mut out = first_list(obj, QUESTION_KEYS).unwrap_or_default();
    out.truncate(QUESTION_SUGGESTION_COUNT);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn improved_text_follows_key_priority() {
        let o = obj(json!({ "improved": "c", "content": "b", "improved_content": "a" }));
        assert_eq!(first_text(&o, IMPROVED_KEYS).as_deref(), Some("a"));

        let o = obj(json!({ "improved": "c", "content": "b" }));
        assert_eq!(first_text(&o, IMPROVED_KEYS).as_deref(), Some("b"));

        // Empty and non-string values are skipped.
        let o = obj(json!({ "improved_content": "", "content": 3, "improved": "c" }));
        assert_eq!(first_text(&o, IMPROVED_KEYS).as_deref(), Some("c"));
    }

    #[test]
    fn rewrite_without_known_fields_keeps_original() {
        let r = normalize(AssistAction::Clarify, "orig", &obj(json!({ "text": "x" })));
        assert_eq!(r.original_content, "orig");
        assert_eq!(r.improved_content, "orig");
        assert!(r.suggestions.is_empty());
        assert_eq!(r.reasoning, DEFAULT_REASONING);
    }

    #[test]
    fn rewrite_reads_alternative_reasoning_keys() {
        let r = normalize(
            AssistAction::Concise,
            "orig",
            &obj(json!({ "content": "short", "changes": "trimmed", "suggestions": ["s1"] })),
        );
        assert_eq!(r.improved_content, "short");
        assert_eq!(r.reasoning, "trimmed");
        assert_eq!(r.suggestions, vec!["s1".to_string()]);
    }

    #[test]
    fn titles_become_suggestions() {
        let r = normalize(
            AssistAction::SuggestTitle,
            "how do i reverse a list",
            &obj(json!({
                "titles": [
                    "How do I reverse a list in Python?",
                    "Reversing a list: best practices",
                    "List reversal techniques"
                ],
                "reasoning": "clarity"
            })),
        );
        assert_eq!(r.improved_content, "How do I reverse a list in Python?");
        assert_eq!(r.suggestions.len(), 3);
        assert_eq!(r.reasoning, "clarity");
        assert_eq!(r.original_content, "how do i reverse a list");
    }

    #[test]
    fn empty_titles_fall_back_to_original() {
        let r = normalize(AssistAction::SuggestTitle, "orig", &obj(json!({ "titles": [] })));
        assert!(r.suggestions.is_empty());
        assert_eq!(r.improved_content, "orig");
        assert_eq!(r.reasoning, DEFAULT_TITLE_REASONING);
    }

    #[test]
    fn single_title_or_original_when_titles_missing() {
        let r = normalize(AssistAction::SuggestTitle, "orig", &obj(json!({ "title": "T" })));
        assert_eq!(r.suggestions, vec!["T".to_string()]);
        assert_eq!(r.improved_content, "T");

        let r = normalize(AssistAction::SuggestTitle, "orig", &Map::new());
        assert_eq!(r.suggestions, vec!["orig".to_string()]);
        assert_eq!(r.improved_content, "orig");
    }

    #[test]
    fn reply_object_handles_empty_and_non_objects() {
        assert!(reply_object("").unwrap().is_empty());
        assert!(reply_object("  ").unwrap().is_empty());
        assert!(reply_object("[1,2]").unwrap().is_empty());
        assert!(reply_object("not json").is_err());
        assert_eq!(reply_object(r#"{"a":1}"#).unwrap().len(), 1);
    }

    #[test]
    fn questions_are_capped() {
        let o = obj(json!({ "questions": ["1", "2", 3, "4", "5", "6", "7"] }));
        assert_eq!(questions(&o), vec!["1", "2", "4", "5", "6"]);
        assert!(questions(&Map::new()).is_empty());
    }

    #[test]
    fn response_serializes_camel_case() {
        let r = normalize(AssistAction::Polish, "o", &Map::new());
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(
            v,
            json!({
                "originalContent": "o",
                "improvedContent": "o",
                "suggestions": [],
                "reasoning": "Content improved"
            })
        );
    }
}
