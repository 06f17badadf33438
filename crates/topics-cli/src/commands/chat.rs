//! Chat command - interactive session that keeps history between turns

use std::future::Future;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use topics_stream::{ChatClient, Conversation};

use super::generate::{run_turn, TurnOutcome};
use crate::output::OutputContext;

/// What the prompt produced
#[derive(Debug, PartialEq, Eq)]
enum Prompt {
    /// A theme to generate topics for
    Theme(String),
    /// Empty line or end of input
    End,
    /// Ctrl+C while waiting for input
    Interrupted,
}

/// Read one theme per line and stream topics for each.
///
/// Every turn is sent with the previous turns as history. An empty line,
/// end of input or Ctrl+C ends the session; a failed turn is reported and
/// the session continues.
pub async fn chat(client: &ChatClient, count: u32, ctx: &OutputContext) -> Result<()> {
    ctx.info("Enter a theme per line (empty line or Ctrl+D to quit)");

    let mut conversation = Conversation::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        ctx.prompt();

        let theme = match next_theme(&mut lines, tokio::signal::ctrl_c()).await? {
            Prompt::Theme(theme) => theme,
            Prompt::End => break,
            Prompt::Interrupted => {
                ctx.warn("Cancelled");
                break;
            }
        };

        match run_turn(client, &mut conversation, &theme, count, false, ctx).await {
            Ok(TurnOutcome::Completed) => {}
            Ok(TurnOutcome::Cancelled) => {
                ctx.warn("Cancelled");
                break;
            }
            Err(e) => ctx.error(&format!("{:#}", e)),
        }
    }

    ctx.info(&format!(
        "Session ended after {} turn(s)",
        conversation.messages().len() / 2
    ));
    Ok(())
}

/// Wait for the next line, or for `interrupt` to fire first
async fn next_theme<R, I>(lines: &mut Lines<R>, interrupt: I) -> Result<Prompt>
where
    R: AsyncBufRead + Unpin,
    I: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        line = lines.next_line() => {
            let prompt = match line? {
                Some(line) if !line.trim().is_empty() => Prompt::Theme(line.trim().to_string()),
                _ => Prompt::End,
            };
            Ok(prompt)
        }
        _ = interrupt => Ok(Prompt::Interrupted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn never() -> impl Future<Output = std::io::Result<()>> {
        std::future::pending()
    }

    #[tokio::test]
    async fn test_next_theme_reads_lines() {
        let mut lines = BufReader::new(&b"  space travel \n\nunused\n"[..]).lines();

        assert_eq!(
            next_theme(&mut lines, never()).await.unwrap(),
            Prompt::Theme("space travel".to_string())
        );
        assert_eq!(next_theme(&mut lines, never()).await.unwrap(), Prompt::End);
    }

    #[tokio::test]
    async fn test_next_theme_end_of_input() {
        let mut lines = BufReader::new(&b""[..]).lines();
        assert_eq!(next_theme(&mut lines, never()).await.unwrap(), Prompt::End);
    }

    #[tokio::test]
    async fn test_interrupt_while_waiting_for_input() {
        // Writer kept alive so the read stays pending
        let (reader, _writer) = tokio::io::duplex(64);
        let mut lines = BufReader::new(reader).lines();

        let prompt = next_theme(&mut lines, async { Ok(()) }).await.unwrap();
        assert_eq!(prompt, Prompt::Interrupted);
    }
}
