use crate::api::{ChatApiProvider, ChatTurn, DeltaStream};
use crate::config::ProviderConfig;
use anyhow::Result;
use std::sync::Arc;

/// One continuous dialogue with the language-model backend.
///
/// The HTTP chat API is stateless, so the per-session context the interview
/// needs (system instruction plus all prior turns) lives here and is resent
/// with every exchange. The system instruction is set once at `open` and
/// never passed in again by callers.
pub struct ChatSession {
    provider: Arc<dyn ChatApiProvider>,
    config: ProviderConfig,
    api_key: String,
    turns: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn open(
        provider: Arc<dyn ChatApiProvider>,
        config: ProviderConfig,
        api_key: String,
        system_instruction: &str,
    ) -> Self {
        Self {
            provider,
            config,
            api_key,
            turns: vec![ChatTurn::system(system_instruction)],
        }
    }

    /// One-shot exchange; used only for the interview's opening prompt.
    pub async fn send(&mut self, text: &str) -> Result<String> {
        self.turns.push(ChatTurn::user(text));
        let reply = self
            .provider
            .send_chat_request(&self.config, &self.api_key, &self.turns)
            .await?;
        self.turns.push(ChatTurn::assistant(reply.clone()));
        Ok(reply)
    }

    /// Opens a streamed exchange and records the outbound user turn. The
    /// returned stream is finite and not restartable; the caller concatenates
    /// fragments and hands the full reply back via [`finish_streaming`] so
    /// later exchanges carry it as context.
    ///
    /// [`finish_streaming`]: ChatSession::finish_streaming
    pub async fn send_streaming(&mut self, text: &str) -> Result<DeltaStream> {
        self.turns.push(ChatTurn::user(text));
        self.provider
            .send_chat_stream_request(&self.config, &self.api_key, &self.turns)
            .await
    }

    /// Records the assistant reply accumulated from a streamed exchange.
    pub fn finish_streaming(&mut self, full_text: &str) {
        self.turns.push(ChatTurn::assistant(full_text));
    }
}
