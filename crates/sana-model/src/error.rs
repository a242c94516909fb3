/// Errors that can occur when interacting with a text model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("http error: {0}")]
    Http(Box<dyn std::error::Error + Send + Sync>),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("api error ({code}): {message}")]
    Api { code: String, message: String },

    /// The provider answered but produced no usable text (empty candidate
    /// list, empty parts, or a content-filter block).
    #[error("empty or unusable model response: {0}")]
    EmptyResponse(String),

    #[error("{0}")]
    Other(String),
}
