pub mod auth;
pub mod error;
pub mod http;
mod prompt;
pub mod service;

pub use auth::{StaticTokens, TokenVerifier};
pub use error::{Error, Result};
pub use http::{AppState, router};
pub use service::{ChatService, ExchangeReply};
