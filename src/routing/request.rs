//! Routing view of an incoming request

use crate::api::types::ChatCompletionRequest;
use std::collections::HashSet;

/// The parts of a request the router looks at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteRequest {
    /// User turns joined in order, earlier turns included as context
    pub prompt: String,
    /// Requested output length
    pub max_tokens: Option<u32>,
}

impl RouteRequest {
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: None,
        }
    }

    /// Extract the routing view of a chat completion request
    pub fn from_request(request: &ChatCompletionRequest) -> Self {
        let prompt = request
            .messages
            .iter()
            .filter(|m| m.role == "user")
            .map(|m| m.content.text())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            prompt,
            max_tokens: request.max_tokens,
        }
    }
}

/// Per-call narrowing of the candidate set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteOptions {
    /// Models to leave out, e.g. ones that already failed for this caller
    pub exclude: HashSet<String>,
    /// Restrict routing to a single model
    pub only: Option<String>,
}

impl RouteOptions {
    pub fn pinned(model_id: impl Into<String>) -> Self {
        Self {
            exclude: HashSet::new(),
            only: Some(model_id.into()),
        }
    }

    pub fn excluding<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exclude: ids.into_iter().map(Into::into).collect(),
            only: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{ChatMessage, MessageContent};

    fn message(role: &str, content: &str) -> ChatMessage {
        ChatMessage {
            role: role.to_string(),
            content: MessageContent::Text {
                content: content.to_string(),
            },
            name: None,
        }
    }

    #[test]
    fn joins_user_turns_only() {
        let request = ChatCompletionRequest {
            model: "auto".to_string(),
            messages: vec![
                message("system", "You are terse."),
                message("user", "First question"),
                message("assistant", "Answer"),
                message("user", "Follow-up"),
            ],
            max_tokens: Some(2048),
            ..ChatCompletionRequest::default()
        };
        let route = RouteRequest::from_request(&request);
        assert_eq!(route.prompt, "First question Follow-up");
        assert_eq!(route.max_tokens, Some(2048));
    }

    #[test]
    fn empty_conversation_gives_empty_prompt() {
        let route = RouteRequest::from_request(&ChatCompletionRequest::default());
        assert!(route.prompt.is_empty());
    }

    #[test]
    fn options_constructors() {
        let pinned = RouteOptions::pinned("gpt-4o");
        assert_eq!(pinned.only.as_deref(), Some("gpt-4o"));
        let excluding = RouteOptions::excluding(["a", "b"]);
        assert!(excluding.exclude.contains("a"));
        assert!(excluding.only.is_none());
    }
}
