//! HTTP clients for the token issuer and the hosted chat endpoint.
//!
//! Two outbound calls exist in the whole system: a form-encoded apikey
//! exchange against the token issuer, and a bearer-authenticated JSON
//! POST to the chat endpoint. Both live here.

mod chat_client;
mod error;
pub mod models;
mod token;

pub use chat_client::ChatClient;
pub use error::ApiError;
pub use token::TokenProvider;
