use thiserror::Error;

/// Errors surfaced by the plan engine and its storage collaborators.
///
/// An empty exercise pool is deliberately *not* represented here: the
/// generator produces sessions with no exercises instead.
#[derive(Debug, Error)]
pub enum FitError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FitError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, FitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = FitError::not_found("profile", "alice");
        assert_eq!(err.to_string(), "profile not found: alice");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_validation_is_not_not_found() {
        let err = FitError::validation("week 9 is out of range");
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "invalid input: week 9 is out of range");
    }
}
