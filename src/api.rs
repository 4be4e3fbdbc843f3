use crate::config::ProviderConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

// Alias for the stream type we'll return
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

// One turn of the wire-level conversation ("system" / "user" / "assistant").
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into() }
    }
}

// Trait defining the interface for LLM API providers. The one-shot form is
// used for the interview's opening exchange only; everything after streams.
#[async_trait]
pub trait ChatApiProvider: Send + Sync {
    // Returns the complete reply text in one response.
    async fn send_chat_request(
        &self,
        config: &ProviderConfig,
        api_key: &str,
        turns: &[ChatTurn],
    ) -> Result<String>;

    // Returns a stream of content deltas.
    async fn send_chat_stream_request(
        &self,
        config: &ProviderConfig,
        api_key: &str,
        turns: &[ChatTurn],
    ) -> Result<DeltaStream>;
}

// --- OpenAI Compatible Provider Implementation ---

#[derive(Serialize, Debug)]
struct OpenAIRequestBody<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    stream: bool,
}

// Response structure for the non-streamed form
#[derive(Deserialize, Debug)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize, Debug)]
struct OpenAIChoice {
    message: ChatTurn,
}

// Response structure for STREAMING chunks
#[derive(Deserialize, Debug)]
struct OpenAIStreamChunk {
    choices: Vec<OpenAIStreamChoice>,
}

#[derive(Deserialize, Debug)]
struct OpenAIStreamChoice {
    delta: OpenAIStreamDelta,
}

#[derive(Deserialize, Debug, Clone)]
struct OpenAIStreamDelta {
    // Content is the important part; role only appears in the first chunk
    content: Option<String>,
}

pub struct OpenAICompatibleProvider {
    client: Client,
}

impl OpenAICompatibleProvider {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    async fn post_chat(
        &self,
        config: &ProviderConfig,
        api_key: &str,
        turns: &[ChatTurn],
        stream: bool,
    ) -> Result<reqwest::Response> {
        let request_body = OpenAIRequestBody { model: &config.model, messages: turns, stream };
        let request_url = format!("{}/chat/completions", config.api_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&request_url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .context("Failed to send request to chat API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "<Failed to read error body>".to_string());
            log::error!("Chat API request failed with status {}: {}", status, error_body);
            return Err(anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                error_body
            ));
        }
        Ok(response)
    }
}

impl Default for OpenAICompatibleProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatApiProvider for OpenAICompatibleProvider {
    async fn send_chat_request(
        &self,
        config: &ProviderConfig,
        api_key: &str,
        turns: &[ChatTurn],
    ) -> Result<String> {
        log::info!(
            "Sending request to OpenAI compatible API: {} using model: {}",
            config.api_url,
            config.model
        );

        let response = self.post_chat(config, api_key, turns, false).await?;
        let body: OpenAIResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("Chat completion response contained no choices")
    }

    async fn send_chat_stream_request(
        &self,
        config: &ProviderConfig,
        api_key: &str,
        turns: &[ChatTurn],
    ) -> Result<DeltaStream> {
        log::info!(
            "Sending STREAM request to OpenAI compatible API: {} using model: {}",
            config.api_url,
            config.model
        );

        let response = self.post_chat(config, api_key, turns, true).await?;

        // Process the SSE stream
        let event_stream = response.bytes_stream().eventsource();

        let delta_stream = event_stream
            .map(|event_result| -> Result<Option<String>> {
                let event = event_result.context("Error reading stream event")?;
                let event_data = event.data.trim();

                // Check for the special [DONE] message
                if event_data == "[DONE]" {
                    log::debug!("Stream finished with [DONE]");
                    return Ok(None); // Signal end of content stream
                }

                match serde_json::from_str::<OpenAIStreamChunk>(event_data) {
                    Ok(chunk) => {
                        let delta_content = chunk
                            .choices
                            .first()
                            .and_then(|choice| choice.delta.content.clone());
                        Ok(delta_content)
                    }
                    Err(e) => {
                        // Some backends interleave ping events; skip those,
                        // surface everything else.
                        match serde_json::from_str::<serde_json::Value>(event_data) {
                            Ok(json_value)
                                if json_value.get("type")
                                    == Some(&serde_json::Value::String("ping".to_string())) =>
                            {
                                log::debug!("Received stream ping event, skipping.");
                                Ok(None)
                            }
                            _ => {
                                log::warn!(
                                    "Failed to parse stream chunk as JSON: {} - Data: {}",
                                    e,
                                    event_data
                                );
                                Err(anyhow::Error::from(e)
                                    .context(format!("Failed to parse stream chunk: {}", event_data)))
                            }
                        }
                    }
                }
            })
            .filter_map(|result| async move {
                match result {
                    Ok(Some(content)) => Some(Ok(content)),
                    Ok(None) => None, // Filter out end-of-stream and pings
                    Err(e) => {
                        log::error!("Error processing stream chunk: {:?}", e);
                        Some(Err(e))
                    }
                }
            });

        // Box the stream
        Ok(Box::pin(delta_stream))
    }
}
