use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing or invalid authentication credentials")]
    Unauthenticated,

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("session not found: {0}")]
    NotFound(String),

    #[error("session is not owned by the caller")]
    Forbidden,

    #[error("storage error: {0}")]
    Storage(sana_store::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::ModelUnavailable(_) => StatusCode::BAD_GATEWAY,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sana_store::Error> for Error {
    fn from(err: sana_store::Error) -> Self {
        match err {
            sana_store::Error::SessionNotFound(id) => Error::NotFound(id),
            sana_store::Error::OwnerMismatch { .. } => Error::Forbidden,
            other => Error::Storage(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::Error;

    #[test]
    fn errors_map_to_their_http_status() {
        assert_eq!(Error::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            Error::Validation("empty".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::ModelUnavailable("timeout".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(Error::NotFound("s1".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(Error::Forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn store_ownership_errors_become_forbidden_not_storage() {
        let err: Error = sana_store::Error::OwnerMismatch {
            session_id: "s1".into(),
            user_id: "bob".into(),
        }
        .into();
        assert!(matches!(err, Error::Forbidden));

        let err: Error = sana_store::Error::SessionNotFound("s1".into()).into();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
