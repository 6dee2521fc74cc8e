use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::conversation_logger::ConversationLogger;
use crate::web::protocol::{ServerMessage, SessionId, SessionInfo};
use ethoschat_api::{ChatClient, TokenProvider};
use ethoschat_chat::ChatSession;
use ethoschat_types::Role;

/// A client connection to a session
#[derive(Debug)]
pub struct ClientConnection {
    pub client_id: Uuid,
    pub ws_sender: mpsc::UnboundedSender<ServerMessage>,
    pub joined_at: DateTime<Utc>,
}

/// A chat session and the clients attached to it
pub struct Session {
    pub id: SessionId,
    pub chat: Mutex<ChatSession>,
    pub created_at: DateTime<Utc>,
    clients: RwLock<Vec<ClientConnection>>,
    last_activity: Mutex<DateTime<Utc>>,
    cancel: Mutex<CancellationToken>,
    logger: Option<Mutex<ConversationLogger>>,
}

impl Session {
    fn new(id: SessionId, chat: ChatSession, logger: Option<ConversationLogger>) -> Self {
        Self {
            id,
            chat: Mutex::new(chat),
            created_at: Utc::now(),
            clients: RwLock::new(Vec::new()),
            last_activity: Mutex::new(Utc::now()),
            cancel: Mutex::new(CancellationToken::new()),
            logger: logger.map(Mutex::new),
        }
    }

    pub async fn add_client(
        &self,
        client_id: Uuid,
        ws_sender: mpsc::UnboundedSender<ServerMessage>,
    ) {
        self.clients.write().await.push(ClientConnection {
            client_id,
            ws_sender,
            joined_at: Utc::now(),
        });
        self.update_activity().await;
    }

    pub async fn remove_client(&self, client_id: Uuid) {
        self.clients
            .write()
            .await
            .retain(|c| c.client_id != client_id);
        self.update_activity().await;
    }

    pub async fn broadcast(&self, message: ServerMessage) {
        let clients = self.clients.read().await;
        for client in clients.iter() {
            let _ = client.ws_sender.send(message.clone());
        }
    }

    pub async fn send_to_client(&self, client_id: Uuid, message: ServerMessage) {
        let clients = self.clients.read().await;
        if let Some(client) = clients.iter().find(|c| c.client_id == client_id) {
            let _ = client.ws_sender.send(message);
        }
    }

    /// Snapshot of the attached senders, for synchronous fan-out from
    /// inside a running turn
    pub async fn client_senders(&self) -> Vec<mpsc::UnboundedSender<ServerMessage>> {
        self.clients
            .read()
            .await
            .iter()
            .map(|c| c.ws_sender.clone())
            .collect()
    }

    pub async fn update_activity(&self) {
        *self.last_activity.lock().await = Utc::now();
    }

    /// The token guarding the currently running turn, if any
    pub async fn cancel_token(&self) -> CancellationToken {
        self.cancel.lock().await.clone()
    }

    /// Abort an in-flight turn and arm a fresh token for the next one
    pub async fn cancel_inflight(&self) {
        let mut cancel = self.cancel.lock().await;
        cancel.cancel();
        *cancel = CancellationToken::new();
    }

    pub async fn log_message(&self, role: Role, content: &str) {
        if let Some(logger) = &self.logger {
            if let Err(e) = logger.lock().await.log(role, content).await {
                eprintln!("Failed to write conversation log: {}", e);
            }
        }
    }

    pub async fn get_info(&self) -> SessionInfo {
        let chat = self.chat.lock().await;
        let clients = self.clients.read().await;
        let last_activity = *self.last_activity.lock().await;

        SessionInfo {
            id: self.id,
            created_at: self.created_at.to_rfc3339(),
            last_activity: last_activity.to_rfc3339(),
            active_clients: clients.len(),
            message_count: chat.message_count(),
        }
    }
}

/// Manages all active sessions
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
    config: AppConfig,
    http: reqwest::Client,
    log_dir: Option<PathBuf>,
}

impl SessionManager {
    pub fn new(config: AppConfig, log_dir: Option<PathBuf>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
            http: reqwest::Client::new(),
            log_dir,
        }
    }

    /// Create a session with its own token provider and warm it up.
    ///
    /// A failed initial token exchange fails the whole call; nothing is
    /// inserted in that case.
    pub async fn create_session(&self) -> Result<Arc<Session>> {
        let id = Uuid::new_v4();

        let provider = TokenProvider::new(
            self.http.clone(),
            self.config.token_url.clone(),
            self.config.api_key.clone(),
        );
        let chat_client = ChatClient::new(self.http.clone(), self.config.chat_endpoint.clone());
        let chat = ChatSession::new(provider, chat_client);

        chat.warm_up().await?;

        let logger = match &self.log_dir {
            Some(dir) => {
                let logger = ConversationLogger::new(dir, id).await?;
                println!("📝 Conversation log: {}", logger.path().display());
                Some(logger)
            }
            None => None,
        };

        let session = Arc::new(Session::new(id, chat, logger));
        self.sessions.write().await.insert(id, session.clone());

        println!("{} Session {} created", "💬".cyan(), id);
        Ok(session)
    }

    pub async fn get_session(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn remove_session(&self, id: &SessionId) -> Result<()> {
        let removed = self.sessions.write().await.remove(id);
        match removed {
            Some(session) => {
                session.cancel_inflight().await;
                Ok(())
            }
            None => Err(anyhow::anyhow!("Session {} not found", id)),
        }
    }

    pub async fn list_sessions(&self) -> Vec<SessionInfo> {
        let sessions = self.sessions.read().await;
        let mut infos = Vec::with_capacity(sessions.len());
        for session in sessions.values() {
            infos.push(session.get_info().await);
        }
        infos
    }
}
