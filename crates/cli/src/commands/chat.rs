use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use shopdesk_agent::{ChatSession, HttpChatTransport, TurnOutcome};
use shopdesk_core::config::LoadOptions;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

use crate::commands::{build_runtime, load_config, CommandResult};
use crate::logging;
use crate::render::{render_message, render_transcript};

pub type SharedOutput = Arc<Mutex<dyn Write + Send>>;

const QUIT_COMMANDS: &[&str] = &["/quit", "/exit"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChatSummary {
    pub answered: usize,
    pub unreachable: usize,
    pub ignored: usize,
}

pub fn run(options: LoadOptions) -> CommandResult {
    let config = match load_config("chat", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    logging::init(&config);

    let runtime = match build_runtime("chat") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let transport = Arc::new(HttpChatTransport::from_config(&config.backend));
    let session = ChatSession::from_config(&config, transport);
    let output: SharedOutput = Arc::new(Mutex::new(std::io::stdout()));

    let result = runtime.block_on(async {
        let input = BufReader::new(tokio::io::stdin());
        converse(&session, input, output).await
    });

    match result {
        Ok(summary) => CommandResult::success(
            "chat",
            format!(
                "chat ended: {} answered, {} unreachable, {} ignored",
                summary.answered, summary.unreachable, summary.ignored
            ),
        ),
        Err(error) => CommandResult::failure("chat", "io", format!("{error:#}"), 1),
    }
}

/// Drives a session from line-oriented input until EOF or a quit command.
/// Every message appended to the transcript is written to `output` as it lands.
pub async fn converse<R>(
    session: &ChatSession,
    input: R,
    output: SharedOutput,
) -> Result<ChatSummary>
where
    R: AsyncBufRead + Unpin,
{
    {
        let existing = session.messages();
        if !existing.is_empty() {
            let mut out = output.lock().unwrap_or_else(PoisonError::into_inner);
            writeln!(out, "{}", render_transcript(&existing)).context("write transcript")?;
        }
    }

    let observer_output = Arc::clone(&output);
    session.store().subscribe(move |message| {
        let mut out = observer_output.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(out, "{}", render_message(message));
        let _ = out.flush();
    });

    let mut summary = ChatSummary::default();
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("read chat input")? {
        if QUIT_COMMANDS.contains(&line.trim()) {
            break;
        }

        session.set_draft(line);
        match session.send_draft().await {
            TurnOutcome::Answered(_) => summary.answered += 1,
            TurnOutcome::Unreachable { .. } => summary.unreachable += 1,
            TurnOutcome::Rejected(_) => summary.ignored += 1,
        }
    }

    info!(
        event_name = "chat.session.ended",
        customer_id = %session.settings().customer_id,
        answered = summary.answered,
        unreachable = summary.unreachable,
        "chat session ended"
    );

    Ok(summary)
}
