// OpenAI-compatible chat backend (`POST {host}/v1/chat/completions`)
//
// Used as the second strategy when the native endpoint gives nothing.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::types::{non_empty_reply, ChatPayload};
use super::{post_json, ChatBackend};

pub struct CompatChatBackend {
    client: Client,
    base_url: String,
}

impl CompatChatBackend {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ChatBackend for CompatChatBackend {
    fn name(&self) -> &str {
        "openai-compat"
    }

    async fn send(&self, payload: &ChatPayload) -> Result<Option<String>> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = post_json(&self.client, &url, payload).await?;

        let body: CompatResponse = response
            .json()
            .await
            .context("Failed to parse chat completions response")?;

        let content = body
            .choices
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content);

        Ok(non_empty_reply(content))
    }
}

#[derive(Debug, Deserialize)]
struct CompatResponse {
    #[serde(default)]
    choices: Option<Vec<CompatChoice>>,
}

#[derive(Debug, Deserialize)]
struct CompatChoice {
    #[serde(default)]
    message: Option<CompatMessage>,
}

#[derive(Debug, Deserialize)]
struct CompatMessage {
    #[serde(default)]
    content: Option<String>,
}
