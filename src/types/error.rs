//! Error types for Agora

use hyper::StatusCode;

/// Failures produced at the authentication boundary.
///
/// These are the only auth outcomes the rest of the service branches on.
/// Claims payloads are attacker-controlled input, so every malformed shape
/// must land in `MalformedClaims` rather than aborting the process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Malformed claims: {0}")]
    MalformedClaims(String),
}

/// Main error type for Agora operations
#[derive(Debug, thiserror::Error)]
pub enum AgoraError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgoraError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<std::io::Error> for AgoraError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AgoraError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(format!("JSON error: {}", err))
    }
}

impl From<hyper::Error> for AgoraError {
    fn from(err: hyper::Error) -> Self {
        Self::Internal(format!("HTTP error: {}", err))
    }
}

/// Result type alias for Agora operations
pub type Result<T> = std::result::Result<T, AgoraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AgoraError::NotFound("post".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AgoraError::Forbidden("owner only".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AgoraError::Auth(AuthError::Expired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AgoraError::Conflict("user exists".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_auth_error_is_typed_not_stringly() {
        let err: AgoraError = AuthError::MalformedClaims("user is not an object".into()).into();
        match err {
            AgoraError::Auth(AuthError::MalformedClaims(_)) => {}
            other => panic!("expected MalformedClaims, got {:?}", other),
        }
    }
}
