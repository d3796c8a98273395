use crate::validators::FieldError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A referenced entity does not exist. `key` is the lookup value
    /// (numeric id, slug or username) rendered as text.
    #[error("Entity not found: {entity} with key {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A single request field failed one of the field validators.
    #[error("Invalid value for '{field}': {source}")]
    InvalidField {
        field: &'static str,
        #[source]
        source: FieldError,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller has already reviewed this title.
    #[error("A review for title {title_id} already exists for this author")]
    DuplicateReview { title_id: i64 },

    /// The confirmation code does not match the user's current state.
    #[error("Invalid or expired confirmation code")]
    InvalidConfirmationCode,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`] with any displayable key.
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Attach a field name to a validator failure.
    pub fn field(field: &'static str, source: FieldError) -> Self {
        CoreError::InvalidField { field, source }
    }
}
