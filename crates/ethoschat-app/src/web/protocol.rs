use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ethoschat_chat::TurnPhase;
use ethoschat_types::ChatMessage;

/// Session ID type
pub type SessionId = Uuid;

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    /// Forward one user message to the assistant
    SendMessage { content: String },
    /// Empty the history and invalidate the session token
    ClearChat,
    /// A file was picked in the UI; selection only, nothing is uploaded
    AttachFile { filename: String },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    SessionJoined {
        session_id: SessionId,
        created_at: String,
        history: Vec<ChatMessage>,
    },
    UserMessage {
        content: String,
    },
    TurnPhase {
        phase: TurnPhase,
    },
    AssistantMessage {
        content: String,
    },
    HistoryCleared,
    FileAttached {
        filename: String,
    },
    Error {
        message: String,
    },
}

/// Session information for listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: SessionId,
    pub created_at: String,
    pub last_activity: String,
    pub active_clients: usize,
    pub message_count: usize,
}
