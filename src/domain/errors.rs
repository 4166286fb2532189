use thiserror::Error;

use crate::persistence::DatabaseError;

/// Errors a panel request can surface to the HTTP layer.
///
/// Malformed query parameters never reach this type; they degrade through
/// the coercion and fallback chains instead. Only storage faults propagate.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("Storage error: {0}")]
    Database(#[from] DatabaseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_message_is_wrapped() {
        let err = PanelError::Database(DatabaseError::QueryError("boom".to_string()));
        assert_eq!(err.to_string(), "Storage error: Query error: boom");
    }
}
