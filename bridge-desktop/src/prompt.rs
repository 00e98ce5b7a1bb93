//! Terminal confirmation prompt

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    prompt::{ConfirmationPrompt, ConfirmationRequest},
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

/// Asks on stdout and reads a single line from stdin.
///
/// Only `y`/`yes` (case-insensitive) confirms; anything else, including an
/// empty line or EOF, declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirmationPrompt;

impl TerminalConfirmationPrompt {
    fn is_affirmative(answer: &str) -> bool {
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

#[async_trait]
impl ConfirmationPrompt for TerminalConfirmationPrompt {
    async fn confirm(&self, request: ConfirmationRequest) -> Result<bool> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("{}\n\n{}\n[y/N] ", request.title, request.message).as_bytes())
            .await?;
        stdout.flush().await?;

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await?;

        let confirmed = Self::is_affirmative(&line);
        debug!(confirmed, "Confirmation answered");
        Ok(confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_answers() {
        assert!(TerminalConfirmationPrompt::is_affirmative("y\n"));
        assert!(TerminalConfirmationPrompt::is_affirmative(" YES "));
        assert!(!TerminalConfirmationPrompt::is_affirmative(""));
        assert!(!TerminalConfirmationPrompt::is_affirmative("no"));
        assert!(!TerminalConfirmationPrompt::is_affirmative("yep"));
    }
}
