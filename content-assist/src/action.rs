use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AssistError;

/// Transformation requested for a piece of user-authored text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssistAction {
    Polish,
    SuggestTitle,
    Clarify,
    Concise,
}

impl AssistAction {
    pub const ALL: [AssistAction; 4] = [
        AssistAction::Polish,
        AssistAction::SuggestTitle,
        AssistAction::Clarify,
        AssistAction::Concise,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssistAction::Polish => "polish",
            AssistAction::SuggestTitle => "suggest-title",
            AssistAction::Clarify => "clarify",
            AssistAction::Concise => "concise",
        }
    }
}

impl fmt::Display for AssistAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssistAction {
    type Err = AssistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssistAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| AssistError::UnknownAction(s.to_string()))
    }
}

/// Kind of post the text belongs to; only used to phrase the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistContext {
    #[default]
    Question,
    Answer,
}

impl AssistContext {
    pub fn as_str(self) -> &'static str {
        match self {
            AssistContext::Question => "question",
            AssistContext::Answer => "answer",
        }
    }
}

impl fmt::Display for AssistContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssistContext {
    type Err = AssistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "question" => Ok(AssistContext::Question),
            "answer" => Ok(AssistContext::Answer),
            other => Err(AssistError::UnknownContext(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_parse_from_wire_names() {
        for action in AssistAction::ALL {
            assert_eq!(action.as_str().parse::<AssistAction>(), Ok(action));
        }
        assert_eq!(
            "summarize".parse::<AssistAction>(),
            Err(AssistError::UnknownAction("summarize".into()))
        );
        assert!("Polish".parse::<AssistAction>().is_err());
    }

    #[test]
    fn serde_names_match_from_str() {
        let a: AssistAction = serde_json::from_str("\"suggest-title\"").unwrap();
        assert_eq!(a, AssistAction::SuggestTitle);
        let c: AssistContext = serde_json::from_str("\"answer\"").unwrap();
        assert_eq!(c, AssistContext::Answer);
    }

    #[test]
    fn context_defaults_to_question() {
        assert_eq!(AssistContext::default(), AssistContext::Question);
    }
}
