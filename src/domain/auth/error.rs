use crate::error::AppError;

/// Why a token string failed to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed token")]
    Malformed,
    #[error("signature does not match")]
    SignatureInvalid,
    #[error("token expired")]
    Expired,
}

/// Why a presented refresh token was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("decode failure: {0}")]
    DecodeFailure(#[from] DecodeError),
    #[error("refresh token is not the current one")]
    NotCurrent,
    #[error("token subject does not match stored identity")]
    IdentityMismatch,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AuthServiceError {
    /// The validation cause, if this is a rejected token
    pub fn validation(&self) -> Option<ValidationError> {
        match self {
            AuthServiceError::Validation(err) => Some(*err),
            _ => None,
        }
    }
}

impl From<AppError> for AuthServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Database(_) | AppError::Unavailable(_) => {
                AuthServiceError::Unavailable(err.to_string())
            }
            _ => AuthServiceError::Other(anyhow::anyhow!(err.to_string())),
        }
    }
}

impl From<AuthServiceError> for AppError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::Validation(_) => AppError::InvalidRefreshToken,
            AuthServiceError::Unavailable(msg) => AppError::Unavailable(msg),
            AuthServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
