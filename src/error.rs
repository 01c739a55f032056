// Error types for fritz-route

use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid IPv4 address: {0:?}")]
    InvalidAddress(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected router response: {0}")]
    Protocol(String),

    #[error("Invalid configuration:\n{}", .0.join("\n"))]
    ConfigurationInvalid(Vec<String>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Convert error to user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidAddress(addr) => {
                format!("{:?} is not a valid IPv4 address (expected a.b.c.d).", addr)
            }
            AppError::AuthenticationFailed(_) => {
                "The router rejected the login. Check user name and password.".to_string()
            }
            AppError::Transport(_) => {
                "Could not reach the router. Check the URL and your connection.".to_string()
            }
            AppError::Protocol(_) => {
                "The router answered with an unexpected page. The firmware may not be supported."
                    .to_string()
            }
            AppError::ConfigurationInvalid(messages) => messages.join("\n"),
            AppError::Config(_) | AppError::Io(_) => {
                "Configuration error. Check your config file or command-line arguments.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_invalid_lists_every_message() {
        let err = AppError::ConfigurationInvalid(vec![
            "Please specify a valid user!".to_string(),
            "Please specify a valid gateway IP address!".to_string(),
        ]);
        let text = err.to_string();
        assert!(text.contains("valid user"));
        assert!(text.contains("gateway"));
        assert_eq!(err.user_message().lines().count(), 2);
    }

    #[test]
    fn test_user_message_names_address() {
        let err = AppError::InvalidAddress("10.0.0".to_string());
        assert!(err.user_message().contains("10.0.0"));
    }
}
