use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Io(#[from] tokio::io::Error),

    #[error("Unexpected Error: {0}")]
    Custom(String),

    #[error(transparent)]
    Diesel(#[from] diesel::result::Error),

    #[error(transparent)]
    RedisError(#[from] redis::RedisError),

    #[error(transparent)]
    DbPool(#[from] diesel_async::pooled_connection::deadpool::PoolError),

    #[error(transparent)]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Record not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// True when the underlying cause is a unique-constraint violation,
    /// used to surface duplicate emails and category names as conflicts.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            ApiError::Diesel(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ))
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::NotFound(_) | ApiError::Diesel(diesel::result::Error::NotFound)
        )
    }
}

/// Error messages for the API Responses
pub enum ErrorMessages {
    Unexpected,
    DB,
    InvalidCredentials,
    Unauthorized,
    Forbidden,
}

// Use the ErrorMessages enum to display error messages for the API Responses
impl fmt::Display for ErrorMessages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ErrorMessages::Unexpected => "We encountered an unexpected error while processing the request.",
            ErrorMessages::DB => "An unforeseen database error has occurred. Kindly try again after some time.",
            ErrorMessages::InvalidCredentials => "Invalid email or password.",
            ErrorMessages::Unauthorized => "Authentication required. Provide a valid access token.",
            ErrorMessages::Forbidden => "You do not have permission to perform this action.",
        };
        write!(f, "{message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_detection() {
        let err = ApiError::Diesel(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_string()),
        ));
        assert!(err.is_unique_violation());
        assert!(!ApiError::Custom("boom".to_string()).is_unique_violation());
    }

    #[test]
    fn test_not_found_detection() {
        assert!(ApiError::NotFound("user".to_string()).is_not_found());
        assert!(ApiError::Diesel(diesel::result::Error::NotFound).is_not_found());
        assert!(!ApiError::Custom("boom".to_string()).is_not_found());
    }
}
