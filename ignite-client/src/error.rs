//! Error types for the ignite client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Error code returned by EC2 when no capacity is available for a start request
pub const CAPACITY_ERROR_CODE: &str = "InsufficientInstanceCapacity";

/// Text fallback used when the provider message carries no error code
const CAPACITY_ERROR_PHRASE: &str = "insufficient capacity";

/// Errors that can occur when talking to the control plane, the docker engine or the notifier
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required command line tool is not installed or not working
    #[error("Required tool '{tool}' is not available: {message}")]
    ToolMissing {
        /// Name of the binary
        tool: String,
        /// Why the check failed
        message: String,
    },

    /// No usable credentials for the control plane
    #[error("No valid credentials: {0}")]
    MissingCredentials(String),

    /// The control plane rejected a request
    #[error("API error{}: {message}", .code.as_deref().map(|c| format!(" ({})", c)).unwrap_or_default())]
    ApiError {
        /// Provider error code, when one could be extracted
        code: Option<String>,
        /// Error message from the provider
        message: String,
    },

    /// A command exited unsuccessfully without a recognizable provider error
    #[error("Command '{command}' failed (exit code {exit_code}): {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// Failed to parse command output
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Spawning a subprocess failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Webhook returned an error status code
    #[error("Webhook error (status {status}): {message}")]
    WebhookError { status: u16, message: String },
}

impl ClientError {
    /// Create an API error from a provider error message
    ///
    /// Extracts the error code from messages of the form
    /// `An error occurred (Code) when calling the Operation operation: ...`.
    pub fn api_error(message: impl Into<String>) -> Self {
        let message = message.into().trim().to_string();
        let code = extract_error_code(&message);
        Self::ApiError { code, message }
    }

    /// Provider error code, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::ApiError { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
            || self.code().is_some_and(|code| code.ends_with(".NotFound"))
    }

    /// Check if the provider refused the request for lack of capacity
    ///
    /// Compares the structured error code first and only falls back to the
    /// message text when no code is present.
    pub fn is_capacity_exhausted(&self) -> bool {
        match self {
            Self::ApiError {
                code: Some(code), ..
            } => code == CAPACITY_ERROR_CODE,
            Self::ApiError {
                code: None,
                message,
            } => {
                message.contains(CAPACITY_ERROR_CODE)
                    || message.to_lowercase().contains(CAPACITY_ERROR_PHRASE)
            }
            _ => false,
        }
    }
}

/// Pulls the `(Code)` out of an AWS CLI error line
fn extract_error_code(message: &str) -> Option<String> {
    let rest = message.split("An error occurred (").nth(1)?;
    let code = rest.split(')').next()?.trim();
    if code.is_empty() || code.contains(char::is_whitespace) {
        return None;
    }
    Some(code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_error_from_cli_output() {
        let err = ClientError::api_error(
            "\nAn error occurred (InsufficientInstanceCapacity) when calling the StartInstances operation \
             (reached max retries: 2): Insufficient capacity.\n",
        );
        assert_eq!(err.code(), Some("InsufficientInstanceCapacity"));
        assert!(err.is_capacity_exhausted());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_capacity_error_without_code_uses_text() {
        let err = ClientError::api_error(
            "We currently do not have sufficient capacity: Insufficient capacity in us-east-1a",
        );
        assert_eq!(err.code(), None);
        assert!(err.is_capacity_exhausted());
    }

    #[test]
    fn test_other_code_is_not_capacity() {
        let err = ClientError::api_error(
            "An error occurred (IncorrectInstanceState) when calling the StartInstances operation: \
             The instance 'i-0123456789abcdef0' is not in a state from which it can be started.",
        );
        assert_eq!(err.code(), Some("IncorrectInstanceState"));
        assert!(!err.is_capacity_exhausted());
    }

    #[test]
    fn test_not_found_code() {
        let err = ClientError::api_error(
            "An error occurred (InvalidInstanceID.NotFound) when calling the DescribeInstances \
             operation: The instance ID 'i-0123456789abcdef0' does not exist",
        );
        assert!(err.is_not_found());
        assert!(ClientError::NotFound("i-1".to_string()).is_not_found());
    }

    #[test]
    fn test_non_api_errors_are_not_classified() {
        let err = ClientError::CommandFailed {
            command: "aws ec2 start-instances".to_string(),
            exit_code: 255,
            stderr: "Insufficient capacity".to_string(),
        };
        assert!(!err.is_capacity_exhausted());
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_api_error_display() {
        let err = ClientError::api_error("An error occurred (Throttling) when calling X: slow down");
        assert_eq!(
            err.to_string(),
            "API error (Throttling): An error occurred (Throttling) when calling X: slow down"
        );
    }
}
