use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const MAX_TRANSIENT_ATTEMPTS: u32 = 3;

/// The single call type the pipeline needs from the remote service: one
/// instruction in, free text (hopefully containing one JSON object) out.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    url: String,
    model: String,
}

impl OpenRouterClient {
    pub fn new(api_key: String, url: String, model: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            url,
            model,
        }
    }

    pub fn from_config(config: &Config, client: Client) -> Self {
        Self::new(
            config.openrouter_api_key.clone(),
            config.openrouter_url.clone(),
            config.openrouter_model.clone(),
            client,
        )
    }
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[async_trait]
impl ModelClient for OpenRouterClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": request.user}
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens
        });

        let mut attempt = 0;
        loop {
            attempt += 1;
            let response = self
                .client
                .post(&self.url)
                .bearer_auth(&self.api_key)
                .json(&payload)
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                let body: ChatResponse = response.json().await?;
                let first = body.choices.into_iter().next().ok_or_else(|| {
                    Error::MalformedResponse("model returned no choices".to_string())
                })?;
                return Ok(first.message.content);
            }

            // 429/5xx are worth one more try; everything else is final.
            let transient = status.as_u16() == 429 || status.is_server_error();
            if transient && attempt < MAX_TRANSIENT_ATTEMPTS {
                let backoff = Duration::from_millis(250 * 2u64.pow(attempt - 1));
                tracing::warn!(
                    status = %status,
                    attempt,
                    "Transient model API failure, retrying in {:?}",
                    backoff
                );
                tokio::time::sleep(backoff).await;
                continue;
            }

            let text = response.text().await.unwrap_or_default();
            return Err(Error::Remote(format!("{}: {}", status, text)));
        }
    }
}
