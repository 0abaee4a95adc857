//! Contract for the service that turns a prompt into an answer

use crate::credentials::Credential;
use crate::messages::Turn;
use crate::{JugalError, Result};
use async_trait::async_trait;

/// Generates an answer for `prompt` given the prior turns of the conversation.
///
/// Implementations report quota exhaustion as [`JugalError::QuotaExceeded`]
/// and every other failure as [`JugalError::RequestFailed`].
#[async_trait]
pub trait Responder: Send + Sync {
    async fn generate(&self, credential: &Credential, prompt: &str, history: &[Turn])
        -> Result<String>;
}

/// Map a provider failure onto the error taxonomy
pub fn classify_failure(status: Option<u16>, message: &str) -> JugalError {
    if is_quota_failure(status, message) {
        JugalError::QuotaExceeded
    } else {
        JugalError::RequestFailed(message.to_string())
    }
}

fn is_quota_failure(status: Option<u16>, message: &str) -> bool {
    if status == Some(429) {
        return true;
    }
    // Provider status codes arrive as RESOURCE_EXHAUSTED
    let normalized = message.to_lowercase().replace('_', " ");
    normalized.contains("429")
        || normalized.contains("resource exhausted")
        || normalized.contains("quota")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_429_is_quota() {
        assert_eq!(classify_failure(Some(429), "anything"), JugalError::QuotaExceeded);
    }

    #[test]
    fn test_message_markers_are_quota() {
        for message in [
            "Resource Exhausted",
            "RESOURCE_EXHAUSTED",
            "You exceeded your current QUOTA",
            "got HTTP 429 from upstream",
        ] {
            assert_eq!(classify_failure(None, message), JugalError::QuotaExceeded, "{}", message);
        }
    }

    #[test]
    fn test_other_failures() {
        let err = classify_failure(Some(500), "internal error");
        assert_eq!(err, JugalError::RequestFailed("internal error".to_string()));
    }
}
