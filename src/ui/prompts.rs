//! Confirmation prompt with CI fallback

use super::context::UiContext;
use crate::error::{StepError, StepResult};

/// Prompt for confirmation, returns `default` if non-interactive
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> StepResult<bool> {
    if ctx.auto_yes() {
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    // cliclack blocks on stdin
    let message = message.to_string();
    let result = tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| StepError::Internal(format!("Prompt task failed: {}", e)))?;

    result.map_err(|e| StepError::User(format!("Prompt failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn confirm_non_interactive_uses_default() {
        let ctx = UiContext::non_interactive();
        assert!(!confirm(&ctx, "Remove?", false).await.unwrap());
        assert!(confirm(&ctx, "Remove?", true).await.unwrap());
    }

    #[tokio::test]
    async fn confirm_auto_yes() {
        let ctx = UiContext::non_interactive().with_auto_yes(true);
        assert!(confirm(&ctx, "Remove?", false).await.unwrap());
    }
}
