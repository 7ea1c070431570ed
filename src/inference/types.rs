// Chat payload types shared by every inference backend
//
// Both the native and the OpenAI-compatible endpoints accept the same
// request body, so one payload type serves all of them.

use serde::{Deserialize, Serialize};

use crate::config::constants::USER_QUESTION_PREFIX;
use crate::config::InferenceConfig;

/// A single chat message (`{"role": ..., "content": ...}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Non-streaming chat request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatPayload {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

impl ChatPayload {
    /// System instruction followed by one user message wrapping `query`
    pub fn for_query(config: &InferenceConfig, query: &str) -> Self {
        Self {
            model: config.model.clone(),
            messages: vec![
                ChatMessage::system(config.system_prompt.clone()),
                ChatMessage::user(format!("{}{}", USER_QUESTION_PREFIX, query)),
            ],
            stream: false,
        }
    }
}

/// Trim a reply; whitespace-only or missing content counts as no reply
pub(crate) fn non_empty_reply(content: Option<String>) -> Option<String> {
    content
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let config = InferenceConfig::default();
        let payload = ChatPayload::for_query(&config, "What is bail?");
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["model"], "llama3.2:1b");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "User question: What is bail?");
        assert_eq!(json["messages"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_non_empty_reply() {
        assert_eq!(non_empty_reply(Some("  yes \n".into())), Some("yes".into()));
        assert_eq!(non_empty_reply(Some(" \t\n".into())), None);
        assert_eq!(non_empty_reply(None), None);
    }
}
