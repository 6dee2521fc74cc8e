use thiserror::Error;

/// Errors surfaced by the token and chat HTTP clients
#[derive(Debug, Error)]
pub enum ApiError {
    /// The token issuer rejected the exchange or returned an unusable body
    #[error("token exchange failed: {message}")]
    Auth { message: String },

    /// The chat endpoint returned a non-success status
    #[error("chat request failed ({status}): {message}")]
    Request { status: u16, message: String },

    /// The chat endpoint answered successfully but without a reply text
    #[error("chat response missing reply content")]
    MissingReply,

    /// Transport-level failure before any HTTP status was available
    #[error("http error: {0}")]
    Transport(#[from] reqwest::Error),
}
