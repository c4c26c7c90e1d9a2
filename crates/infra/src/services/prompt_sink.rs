use anyhow::{anyhow, Context};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tickler_domain::{PromptHandle, RenderedPrompt};
use tracing::error;

/// Delivery channel for reminder prompts. Sending returns a handle that
/// can later be used to edit the delivered message in place.
#[async_trait::async_trait]
pub trait IPromptSink: Send + Sync {
    async fn send(&self, prompt: &RenderedPrompt) -> anyhow::Result<PromptHandle>;
    async fn edit(&self, handle: &PromptHandle, prompt: &RenderedPrompt) -> anyhow::Result<()>;
}

#[derive(Debug, Deserialize)]
struct WebhookMessageResponse {
    id: String,
}

/// Discord-compatible webhook sink. `?wait=true` makes the webhook
/// endpoint return the created message so its id can serve as the
/// prompt handle.
pub struct WebhookPromptSink {
    client: Client,
    webhook_url: String,
}

impl WebhookPromptSink {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            webhook_url: webhook_url.into(),
        }
    }

    fn content(prompt: &RenderedPrompt) -> String {
        format!("**{}**\n{}", prompt.title, prompt.body)
    }
}

#[async_trait::async_trait]
impl IPromptSink for WebhookPromptSink {
    async fn send(&self, prompt: &RenderedPrompt) -> anyhow::Result<PromptHandle> {
        let res = self
            .client
            .post(&format!("{}?wait=true", self.webhook_url))
            .json(&json!({ "content": Self::content(prompt) }))
            .send()
            .await
            .context("Unable to reach prompt webhook")?;

        if !res.status().is_success() {
            error!(
                "Prompt webhook returned unexpected status: {}",
                res.status()
            );
            return Err(anyhow!(
                "Prompt webhook returned status: {}",
                res.status()
            ));
        }

        let message = res
            .json::<WebhookMessageResponse>()
            .await
            .context("Unexpected response from prompt webhook")?;

        Ok(PromptHandle::new(message.id))
    }

    async fn edit(&self, handle: &PromptHandle, prompt: &RenderedPrompt) -> anyhow::Result<()> {
        let res = self
            .client
            .patch(&format!(
                "{}/messages/{}",
                self.webhook_url,
                handle.as_str()
            ))
            .json(&json!({ "content": Self::content(prompt) }))
            .send()
            .await
            .context("Unable to reach prompt webhook")?;

        if !res.status().is_success() {
            error!(
                "Prompt webhook returned unexpected status on edit: {}",
                res.status()
            );
            return Err(anyhow!(
                "Prompt webhook returned status: {}",
                res.status()
            ));
        }

        Ok(())
    }
}
