//! Newline-delimited JSON transport used by the `quote-bot` binary.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, warn};

use crate::dispatcher::QuoteBot;
use crate::error::BotError;
use crate::event::{InboundEvent, Reply};

/// Counters for one [`serve`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeSummary {
    /// Events decoded and dispatched.
    pub events: usize,
    /// Input lines that were not valid events.
    pub skipped: usize,
    /// Replies written.
    pub replies: usize,
}

/// Read one event per line from `input`, handle each on its own task and
/// write every reply as one JSON line to `output`.
///
/// Finished tasks are reaped while input is still being read. Returns once
/// input is closed and every task has finished.
pub async fn serve<R, W>(bot: QuoteBot, input: R, mut output: W) -> Result<ServeSummary, BotError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = ServeSummary::default();
    let mut handlers: JoinSet<Option<Reply>> = JoinSet::new();
    let mut lines = input.lines();

    loop {
        tokio::select! {
            biased;

            Some(done) = handlers.join_next(), if !handlers.is_empty() => {
                write_result(done, &mut output, &mut summary).await?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }

                let event = match parse_event(&line) {
                    Ok(event) => event,
                    Err(e) => {
                        warn!("Skipping input line: {}", e);
                        summary.skipped += 1;
                        continue;
                    }
                };

                summary.events += 1;
                let bot = bot.clone();
                handlers.spawn(async move {
                    match bot.handle(&event).await {
                        Ok(reply) => reply,
                        Err(e) => {
                            error!("Failed to handle message {}: {}", event.message_id, e);
                            None
                        }
                    }
                });
            }
        }
    }

    while let Some(done) = handlers.join_next().await {
        write_result(done, &mut output, &mut summary).await?;
    }

    debug!("Input closed: {:?}", summary);
    Ok(summary)
}

async fn write_result<W>(
    done: Result<Option<Reply>, JoinError>,
    output: &mut W,
    summary: &mut ServeSummary,
) -> Result<(), BotError>
where
    W: AsyncWrite + Unpin,
{
    let reply = match done {
        Ok(Some(reply)) => reply,
        Ok(None) => return Ok(()),
        Err(e) => {
            error!("Handler task failed: {}", e);
            return Ok(());
        }
    };

    let mut line = match serde_json::to_string(&reply) {
        Ok(line) => line,
        Err(e) => {
            error!("Failed to encode reply: {}", e);
            return Ok(());
        }
    };
    line.push('\n');
    output.write_all(line.as_bytes()).await?;
    output.flush().await?;
    summary.replies += 1;
    Ok(())
}

fn parse_event(line: &str) -> Result<InboundEvent, BotError> {
    serde_json::from_str(line).map_err(|e| BotError::InvalidEvent(e.to_string()))
}
