pub mod credentials;
pub mod integration;
pub mod llm;
pub mod messages;
pub mod speech;
pub mod utils;

use thiserror::Error;

/// Application name shown in greetings and the system instruction
pub const APP_NAME: &str = "Jugal AI";

/// Assistant turn appended when a request fails for any reason but quota
pub const APOLOGY_TEXT: &str = "I encountered an error connecting to the service. Please check your API key or internet connection.";

/// Shown at the credential prompt after the key ran out of quota
pub const QUOTA_EXCEEDED_TEXT: &str = "Your free tier API key limit exceeded. Please change it.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JugalError {
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Quota exceeded")]
    QuotaExceeded,

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Capability unsupported: {0}")]
    CapabilityUnsupported(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl From<std::io::Error> for JugalError {
    fn from(e: std::io::Error) -> Self {
        JugalError::IOError(e.to_string())
    }
}

impl JugalError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Re-entering the key fixes it
            JugalError::InvalidCredential(_) => true,
            // Requires a new key; the session forces re-entry
            JugalError::QuotaExceeded => true,
            // The user can resend
            JugalError::RequestFailed(_) => true,
            // Nothing to retry on this platform
            JugalError::CapabilityUnsupported(_) => false,
            JugalError::ConfigError(_) => false,
            JugalError::IOError(_) => false,
            JugalError::ChannelError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            JugalError::InvalidCredential(_) => "Please enter a valid API key.".to_string(),
            JugalError::QuotaExceeded => QUOTA_EXCEEDED_TEXT.to_string(),
            JugalError::RequestFailed(_) => APOLOGY_TEXT.to_string(),
            JugalError::CapabilityUnsupported(what) => {
                format!("Your platform does not support {}.", what)
            }
            JugalError::ConfigError(_) => "Configuration error. Please check settings.".to_string(),
            JugalError::IOError(_) => "File system error occurred.".to_string(),
            JugalError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, JugalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_message_is_specific() {
        let msg = JugalError::QuotaExceeded.user_message();
        assert!(msg.contains("limit exceeded"));
    }

    #[test]
    fn test_recoverability() {
        assert!(JugalError::RequestFailed("timeout".into()).is_recoverable());
        assert!(!JugalError::CapabilityUnsupported("speech recognition".into()).is_recoverable());
    }

    #[test]
    fn test_io_conversion() {
        let err: JugalError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, JugalError::IOError(_)));
    }
}
