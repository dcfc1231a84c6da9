use thiserror::Error;

/// Problems the user can fix locally; never change session state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a template before sending")]
    NoTemplateSelected,

    #[error("Recipient email is required")]
    MissingRecipient,

    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("Please fill in: {}", .0.join(", "))]
    MissingPlaceholders(Vec<String>),

    #[error("Template {0} is required")]
    EmptyField(&'static str),

    #[error("Unknown placeholder: {0}")]
    UnknownPlaceholder(String),

    #[error("Duplicate placeholder: {0}")]
    DuplicatePlaceholder(String),

    #[error("Placeholder keys cannot be empty or contain braces")]
    InvalidPlaceholderKey,

    #[error("A send is already in progress")]
    SendInProgress,

    #[error("The preview is read-only, go back to edit first")]
    ReadOnlyPreview,
}

#[derive(Error, Debug)]
pub enum ReferralError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, ReferralError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_placeholders_message_lists_keys() {
        let err = ValidationError::MissingPlaceholders(vec!["HRname".into(), "role".into()]);
        assert_eq!(err.to_string(), "Please fill in: HRname, role");
    }

    #[test]
    fn test_validation_is_transparent() {
        let err = ReferralError::from(ValidationError::MissingRecipient);
        assert_eq!(err.to_string(), "Recipient email is required");
    }
}
