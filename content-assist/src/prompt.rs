//! Prompt templates: one system persona and one user instruction per action.

use crate::action::{AssistAction, AssistContext};

/// System + user instruction pair sent as a single chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Number of titles requested for [`AssistAction::SuggestTitle`].
pub const TITLE_COUNT: usize = 3;

/// Number of follow-up questions requested from the suggestion prompt.
pub const QUESTION_SUGGESTION_COUNT: usize = 5;

pub fn build(action: AssistAction, context: AssistContext, content: &str) -> PromptPair {
    match action {
        AssistAction::Polish => PromptPair {
            system: format!(
                "You are a writing assistant that helps improve the quality of {context}s on a Q&A platform. \
                 Focus on grammar, clarity, tone, and structure while maintaining the original meaning and \
                 technical accuracy. Return your response in JSON format."
            ),
            user: format!(
                "Please polish and improve this {context}:\n\n{content}\n\n\
                 Return as JSON: {{\"improved_content\": \"improved text\", \"reasoning\": \"explanation of changes\"}}"
            ),
        },
        AssistAction::SuggestTitle => PromptPair {
            system: "You are a title optimization expert for Q&A platforms. Create clear, specific, and \
                     searchable titles that accurately reflect the question's content. Return your response \
                     in JSON format."
                .to_string(),
            user: format!(
                "Based on this question content, suggest {TITLE_COUNT} better titles:\n\n{content}\n\n\
                 Make titles specific, searchable, and clear about what the person is asking. \
                 Return as JSON: {{\"titles\": [\"title1\", \"title2\", \"title3\"], \"reasoning\": \"explanation\"}}"
            ),
        },
        AssistAction::Clarify => PromptPair {
            system: "You are a clarity expert who helps make technical content more understandable. Focus \
                     on structure, explanation, and removing ambiguity while keeping technical accuracy. \
                     Return your response in JSON format."
                .to_string(),
            user: format!(
                "Please make this {context} clearer and easier to understand:\n\n{content}\n\n\
                 Return as JSON: {{\"improved_content\": \"clearer text\", \"reasoning\": \"explanation of improvements\"}}"
            ),
        },
        AssistAction::Concise => PromptPair {
            system: "You are an editing expert who makes content more concise while preserving all \
                     important information and technical details. Return your response in JSON format."
                .to_string(),
            user: format!(
                "Please make this {context} more concise and to-the-point:\n\n{content}\n\n\
                 Return as JSON: {{\"improved_content\": \"concise text\", \"reasoning\": \"explanation of changes\"}}"
            ),
        },
    }
}

pub fn question_suggestions(topic: &str) -> PromptPair {
    PromptPair {
        system: "You are a helpful assistant that generates relevant follow-up questions for Q&A \
                 platforms. Generate questions that would be useful for learning and discussion."
            .to_string(),
        user: format!(
            "Generate {QUESTION_SUGGESTION_COUNT} relevant questions about: {topic}\n\n\
             Return as JSON with format: {{\"questions\": [\"question1\", \"question2\", ...]}}"
        ),
    }
}
