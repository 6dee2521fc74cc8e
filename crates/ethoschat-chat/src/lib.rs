//! Conversation state for ethoschat
//!
//! One [`ChatSession`] per browser session: append-only history, the
//! session-scoped bearer token, and the single-turn request flow.

use serde::{Deserialize, Serialize};

use ethoschat_api::{ApiError, ChatClient, TokenProvider};
use ethoschat_types::ChatMessage;

#[cfg(test)]
mod tests;

/// Phases of a single chat turn, surfaced to the UI while it waits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    Idle,
    AwaitingToken,
    AwaitingReply,
}

/// Per-session conversation context.
///
/// The session owns its token provider, so the five-minute token reuse
/// window never leaks across browser sessions and a full clear drops
/// the token together with the history.
pub struct ChatSession {
    history: Vec<ChatMessage>,
    token_provider: TokenProvider,
    chat_client: ChatClient,
}

impl ChatSession {
    pub fn new(token_provider: TokenProvider, chat_client: ChatClient) -> Self {
        Self {
            history: Vec::new(),
            token_provider,
            chat_client,
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn message_count(&self) -> usize {
        self.history.len()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.history.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.history.push(ChatMessage::assistant(content));
    }

    /// Empty the history and invalidate the cached token in one step
    pub async fn clear(&mut self) {
        self.history.clear();
        self.token_provider.invalidate().await;
    }

    /// Warm up the session token.
    ///
    /// Used at session creation, where a dead issuer is a hard failure
    /// rather than an inline reply.
    pub async fn warm_up(&self) -> Result<(), ApiError> {
        self.token_provider.bearer_token().await.map(|_| ())
    }

    /// Run one turn: append the user message, fetch a reply, and append
    /// it (or the stringified failure) as the assistant message.
    ///
    /// `on_phase` observes the turn state machine; `AwaitingToken` is
    /// only reported when the cached token has gone stale.
    pub async fn run_turn<F>(&mut self, content: &str, mut on_phase: F) -> String
    where
        F: FnMut(TurnPhase),
    {
        self.push_user(content);

        let reply = match self.request_reply(content, &mut on_phase).await {
            Ok(reply) => reply,
            Err(e) => format!("Error: {}", e),
        };

        self.push_assistant(reply.clone());
        on_phase(TurnPhase::Idle);
        reply
    }

    async fn request_reply<F>(&self, content: &str, on_phase: &mut F) -> Result<String, ApiError>
    where
        F: FnMut(TurnPhase),
    {
        if !self.token_provider.has_fresh_token().await {
            on_phase(TurnPhase::AwaitingToken);
        }
        let token = self.token_provider.bearer_token().await?;

        on_phase(TurnPhase::AwaitingReply);
        self.chat_client.send(content, &token).await
    }
}
