// Native chat backend (`POST {host}/api/chat`)

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::types::{non_empty_reply, ChatPayload};
use super::{post_json, ChatBackend};

pub struct NativeChatBackend {
    client: Client,
    base_url: String,
}

impl NativeChatBackend {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ChatBackend for NativeChatBackend {
    fn name(&self) -> &str {
        "native"
    }

    async fn send(&self, payload: &ChatPayload) -> Result<Option<String>> {
        let url = format!("{}/api/chat", self.base_url);
        let response = post_json(&self.client, &url, payload).await?;

        let body: NativeChatResponse = response
            .json()
            .await
            .context("Failed to parse native chat response")?;

        Ok(non_empty_reply(body.message.and_then(|m| m.content)))
    }
}

// Only the fields we read; everything else in the body is ignored.
#[derive(Debug, Deserialize)]
struct NativeChatResponse {
    #[serde(default)]
    message: Option<NativeMessage>,
}

#[derive(Debug, Deserialize)]
struct NativeMessage {
    #[serde(default)]
    content: Option<String>,
}
