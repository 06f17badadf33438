//! Generate command - stream one batch of topics

use std::cell::RefCell;

use anyhow::{Context, Result};
use topics_stream::conversation::FAILURE_MESSAGE;
use topics_stream::{ChatClient, Conversation};

use crate::output::{OutputContext, OutputFormat, ReplyDocument, TopicRow};

/// How a single turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The stream finished and the reply is complete
    Completed,
    /// Ctrl+C was pressed before the stream finished
    Cancelled,
}

/// Stream topics for a single theme
pub async fn generate(
    client: &ChatClient,
    theme: &str,
    count: u32,
    raw: bool,
    ctx: &OutputContext,
) -> Result<()> {
    let mut conversation = Conversation::new();

    match run_turn(client, &mut conversation, theme, count, raw, ctx).await? {
        TurnOutcome::Completed => Ok(()),
        TurnOutcome::Cancelled => {
            ctx.warn("Cancelled");
            Ok(())
        }
    }
}

/// Run one request/reply turn against `conversation`.
///
/// Tokens are echoed as they arrive in table mode; other formats print once
/// the reply is complete. Ctrl+C drops the in-flight stream.
pub async fn run_turn(
    client: &ChatClient,
    conversation: &mut Conversation,
    theme: &str,
    count: u32,
    raw: bool,
    ctx: &OutputContext,
) -> Result<TurnOutcome> {
    let request = conversation
        .begin(theme, count)
        .context("Invalid request")?;

    ctx.info(&format!(
        "Generating {} topic(s) about: {}",
        request.num_topics, request.theme
    ));

    let live = ctx.is_live();
    let state = RefCell::new(&mut *conversation);

    let result = tokio::select! {
        result = client.stream_chat(
            &request,
            |token| {
                state.borrow_mut().push_token(token);
                if live {
                    ctx.token(token);
                }
            },
            || state.borrow_mut().finish(),
        ) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    let conversation = state.into_inner();

    match result {
        Some(Ok(())) => {}
        Some(Err(e)) => {
            conversation.fail();
            if live {
                println!();
            }
            ctx.error(FAILURE_MESSAGE);
            let context = if e.is_transport() {
                "Chat stream failed"
            } else {
                "Chat request failed"
            };
            return Err(e).context(context);
        }
        None => {
            conversation.abandon();
            if live {
                println!();
            }
            return Ok(TurnOutcome::Cancelled);
        }
    }

    if live {
        println!();
    }

    let reply = conversation.current_reply().unwrap_or_default();
    let topics = topics_stream::conversation::parse_topics(reply);

    match ctx.format {
        OutputFormat::Json => ctx.print_reply(&ReplyDocument {
            theme: &request.theme,
            reply,
            topics: &topics,
        }),
        OutputFormat::Csv => ctx.print(&TopicRow::from_topics(&topics)),
        OutputFormat::Table => {
            if !raw && !ctx.quiet {
                println!();
                ctx.print(&TopicRow::from_topics(&topics));
            }
        }
    }

    ctx.success(&format!("{} topic(s) received", topics.len()));
    Ok(TurnOutcome::Completed)
}
