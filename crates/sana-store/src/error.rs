#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("session '{session_id}' is not owned by user '{user_id}'")]
    OwnerMismatch { session_id: String, user_id: String },

    #[error("unknown turn role: {0}")]
    UnknownRole(String),
}

pub type Result<T> = std::result::Result<T, Error>;
