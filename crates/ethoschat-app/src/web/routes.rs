use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::web::protocol::{ClientMessage, ServerMessage, SessionId, SessionInfo};
use crate::web::session_manager::{Session, SessionManager};
use ethoschat_types::Role;

/// Application state shared across routes
#[derive(Clone)]
pub struct AppState {
    pub session_manager: Arc<SessionManager>,
    pub verbose: bool,
}

/// Create router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // API routes
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route(
            "/api/sessions/:id",
            get(get_session_details).delete(close_session),
        )
        // WebSocket endpoint
        .route("/ws/:session_id", get(websocket_handler))
        // The chat page
        .route("/", get(serve_index))
        .with_state(state)
}

/// GET /api/sessions - List all active sessions
async fn list_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.session_manager.list_sessions().await;
    Json(serde_json::json!({ "sessions": sessions }))
}

/// POST /api/sessions - Create a new session
///
/// The initial token exchange happens here; an unreachable issuer fails
/// the request instead of producing a half-alive session.
async fn create_session(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = state.session_manager.create_session().await?;

    Ok(Json(serde_json::json!({
        "session_id": session.id,
        "created_at": session.created_at.to_rfc3339(),
        "websocket_url": format!("/ws/{}", session.id),
    })))
}

/// GET /api/sessions/:id - Get session details
async fn get_session_details(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionInfo>, AppError> {
    let session = state
        .session_manager
        .get_session(&id)
        .await
        .ok_or_else(|| AppError::NotFound("Session not found".into()))?;

    Ok(Json(session.get_info().await))
}

/// DELETE /api/sessions/:id - Close a session
async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.session_manager.remove_session(&id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Session closed successfully",
    })))
}

/// GET /ws/:session_id - WebSocket endpoint
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> Response {
    ws.on_upgrade(move |socket| handle_websocket(socket, state, session_id))
}

/// Handle WebSocket connection
async fn handle_websocket(socket: WebSocket, state: AppState, session_id: SessionId) {
    let client_id = Uuid::new_v4();

    let session = match state.session_manager.get_session(&session_id).await {
        Some(s) => s,
        None => {
            eprintln!("WebSocket: Session {} not found", session_id);
            return;
        }
    };

    // Create channel for sending messages to this client
    let (ws_sender, mut ws_receiver) = mpsc::unbounded_channel();

    session.add_client(client_id, ws_sender).await;

    // Send the scrollback so a rejoining tab repaints in place
    let history = session.chat.lock().await.history().to_vec();
    let join_msg = ServerMessage::SessionJoined {
        session_id,
        created_at: session.created_at.to_rfc3339(),
        history,
    };
    session.send_to_client(client_id, join_msg).await;

    // Split socket
    let (mut ws_sink, mut ws_stream) = socket.split();

    // Spawn task to send messages from channel to WebSocket
    let session_clone = session.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = ws_receiver.recv().await {
            if let Ok(json) = serde_json::to_string(&msg) {
                if ws_sink.send(WsMessage::Text(json)).await.is_err() {
                    break;
                }
            }
        }
    });

    // Handle incoming WebSocket messages
    while let Some(Ok(msg)) = ws_stream.next().await {
        if let WsMessage::Text(text) = msg {
            if state.verbose {
                eprintln!("📨 WebSocket message: {}", text);
            }
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => {
                    handle_client_message(client_msg, &session_clone).await;
                }
                Err(e) => {
                    eprintln!("Failed to parse client message: {} - {}", text, e);
                    session_clone
                        .send_to_client(
                            client_id,
                            ServerMessage::Error {
                                message: format!("Unrecognized message: {}", e),
                            },
                        )
                        .await;
                }
            }
        }
    }

    // Client disconnected
    session_clone.remove_client(client_id).await;
    send_task.abort();
}

/// Handle a message from a client
async fn handle_client_message(message: ClientMessage, session: &Arc<Session>) {
    match message {
        ClientMessage::SendMessage { content } => {
            // Run the turn in its own task so the reader keeps draining
            // the socket; the session's cancellation token abandons the
            // turn if the chat is cleared or closed underneath it.
            let session_clone = Arc::clone(session);
            let cancel = session.cancel_token().await;
            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = handle_send_message(content, &session_clone) => {}
                }
            });
        }
        ClientMessage::ClearChat => {
            session.cancel_inflight().await;
            session.chat.lock().await.clear().await;
            session.update_activity().await;
            session.broadcast(ServerMessage::HistoryCleared).await;
        }
        ClientMessage::AttachFile { filename } => {
            // Selection only; there is no upload pipeline behind this.
            println!("📎 File attached (not uploaded): {}", filename);
            session
                .broadcast(ServerMessage::FileAttached { filename })
                .await;
        }
    }
}

/// Run one chat turn and fan the results out to every attached client
async fn handle_send_message(content: String, session: &Arc<Session>) {
    session.update_activity().await;
    session
        .broadcast(ServerMessage::UserMessage {
            content: content.clone(),
        })
        .await;
    session.log_message(Role::User, &content).await;

    let senders = session.client_senders().await;
    let mut chat = session.chat.lock().await;
    let reply = chat
        .run_turn(&content, |phase| {
            for tx in &senders {
                let _ = tx.send(ServerMessage::TurnPhase { phase });
            }
        })
        .await;
    drop(chat);

    session.log_message(Role::Assistant, &reply).await;
    session
        .broadcast(ServerMessage::AssistantMessage { content: reply })
        .await;
}

/// GET / - Serve the chat page
async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../../web/index.html"))
}

/// Error handling
#[derive(Debug)]
enum AppError {
    Anyhow(anyhow::Error),
    NotFound(String),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Anyhow(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Anyhow(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
