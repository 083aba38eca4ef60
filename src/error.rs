use thiserror::Error;

/// Unified error type for component-tag operations
#[derive(Error, Debug)]
pub enum ComponentTagError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in component-tag
pub type Result<T> = std::result::Result<T, ComponentTagError>;

impl ComponentTagError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ComponentTagError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ComponentTagError::Version(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        ComponentTagError::Tag(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        ComponentTagError::Remote(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ComponentTagError::config("component-name is required");
        assert_eq!(
            err.to_string(),
            "Configuration error: component-name is required"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ComponentTagError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_from_git2() {
        let git_err = git2::Error::from_str("object not found");
        let err: ComponentTagError = git_err.into();
        assert!(err.to_string().starts_with("Git operation failed"));
        assert!(err.to_string().contains("object not found"));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (ComponentTagError::config("x"), "Configuration error"),
            (ComponentTagError::version("x"), "Version error"),
            (ComponentTagError::tag("x"), "Tag error"),
            (ComponentTagError::remote("x"), "Remote operation failed"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }

    #[test]
    fn test_error_empty_messages_keep_prefix() {
        let errors = vec![
            ComponentTagError::config(""),
            ComponentTagError::version(""),
            ComponentTagError::tag(""),
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
