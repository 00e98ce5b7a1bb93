//! User Confirmation Abstraction
//!
//! Destructive operations (overwriting a remote playlist) must be gated by an
//! explicit yes/no answer from the user. The host decides how to ask: a modal
//! dialog, a terminal prompt, or an automated policy in tests.

use async_trait::async_trait;

use crate::error::Result;

/// Description of the destructive action awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    /// Short title, e.g. `Overwrite "Road Trip"?`
    pub title: String,
    /// Longer explanation of what will happen
    pub message: String,
}

impl ConfirmationRequest {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Blocking yes/no gate provided by the host.
///
/// Implementations resolve only once the user has answered. `Ok(false)` means
/// the user declined; errors are reserved for failures to ask at all.
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    async fn confirm(&self, request: ConfirmationRequest) -> Result<bool>;
}

/// Prompt that always returns the same answer.
///
/// Useful for headless hosts that have already obtained consent out of band.
#[derive(Debug, Clone, Copy)]
pub struct FixedConfirmation(pub bool);

#[async_trait]
impl ConfirmationPrompt for FixedConfirmation {
    async fn confirm(&self, _request: ConfirmationRequest) -> Result<bool> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_confirmation() {
        let request = ConfirmationRequest::new("Overwrite?", "This replaces the order.");

        assert!(FixedConfirmation(true).confirm(request.clone()).await.unwrap());
        assert!(!FixedConfirmation(false).confirm(request).await.unwrap());
    }
}
