use crate::error::ApiError;
use crate::models::{ChatRequest, ChatResponse};
use ethoschat_types::ChatMessage;

/// Client for the hosted chat-completions endpoint
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    /// Send a single user message and return the assistant's reply text.
    ///
    /// Only the latest message is forwarded; whatever conversation
    /// state the remote service keeps is opaque to this client.
    pub async fn send(&self, message: &str, token: &str) -> Result<String, ApiError> {
        let request = ChatRequest {
            messages: vec![ChatMessage::user(message)],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Request {
                status: status.as_u16(),
                message: body,
            });
        }

        let text = response.text().await?;
        let chat_response: ChatResponse =
            serde_json::from_str(&text).map_err(|e| ApiError::Request {
                status: status.as_u16(),
                message: format!("unparseable chat response: {}", e),
            })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ApiError::MissingReply)
    }
}
