use std::sync::Arc;

use serde::Serialize;
use shopdesk_agent::{ChatSession, HttpChatTransport, SessionSettings, TurnOutcome, TurnRejection};
use shopdesk_core::config::LoadOptions;
use shopdesk_core::ChatMessage;

use crate::commands::{build_runtime, load_config, CommandResult};
use crate::logging;
use crate::render::render_transcript;

#[derive(Debug, Serialize)]
struct SendReport {
    command: &'static str,
    status: &'static str,
    error_class: Option<&'static str>,
    messages: Vec<ChatMessage>,
}

pub fn run(options: LoadOptions, text: &str, json_output: bool) -> CommandResult {
    let config = match load_config("send", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    logging::init(&config);

    let runtime = match build_runtime("send") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let transport = Arc::new(HttpChatTransport::from_config(&config.backend));
    let session = ChatSession::new(transport, SessionSettings::from_config(&config));
    let outcome = runtime.block_on(session.send(text));

    report(&outcome, session.messages(), json_output)
}

/// Answered → 0, unreachable backend → 3, rejected input → 2.
pub fn report(outcome: &TurnOutcome, messages: Vec<ChatMessage>, json_output: bool) -> CommandResult {
    let (exit_code, error_class) = match outcome {
        TurnOutcome::Answered(_) => (0, None),
        TurnOutcome::Unreachable { error, .. } => (3, Some(error.error_class())),
        TurnOutcome::Rejected(TurnRejection::EmptyInput) => (2, Some("empty_input")),
        TurnOutcome::Rejected(TurnRejection::Busy) => (2, Some("busy")),
    };

    if let TurnOutcome::Rejected(rejection) = outcome {
        if !json_output {
            let message = match rejection {
                TurnRejection::EmptyInput => "message was empty; nothing was sent",
                TurnRejection::Busy => "another message is still in flight",
            };
            return CommandResult::failure(
                "send",
                error_class.unwrap_or("input_rejected"),
                message,
                exit_code,
            );
        }
    }

    if !json_output {
        return CommandResult { exit_code, output: render_transcript(&messages) };
    }

    let report = SendReport {
        command: "send",
        status: if exit_code == 0 { "ok" } else { "error" },
        error_class,
        messages,
    };
    let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"send\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    });

    CommandResult { exit_code, output }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use shopdesk_agent::{TurnOutcome, TurnRejection};
    use shopdesk_core::{ChatMessage, TransportError, UNREACHABLE_TEXT};

    use super::report;

    #[test]
    fn answered_turn_prints_transcript() {
        let reply = ChatMessage::assistant("Hi there", Vec::new());
        let result = report(
            &TurnOutcome::Answered(reply.clone()),
            vec![ChatMessage::user("hello"), reply],
            false,
        );

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output, "you> hello\nassistant> Hi there");
    }

    #[test]
    fn unreachable_turn_exits_three_with_error_class() {
        let message = ChatMessage::assistant(UNREACHABLE_TEXT, Vec::new());
        let outcome = TurnOutcome::Unreachable {
            message: message.clone(),
            error: TransportError::Timeout { timeout_secs: 30 },
        };
        let result = report(&outcome, vec![ChatMessage::user("hello"), message], true);

        assert_eq!(result.exit_code, 3);
        let payload: Value = serde_json::from_str(&result.output).expect("json output");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "transport_timeout");
        assert_eq!(payload["messages"][1]["role"], "assistant");
        assert_eq!(payload["messages"][1]["text"], "⚠ Unable to connect to server.");
    }

    #[test]
    fn rejected_input_is_reported_as_failure() {
        let result =
            report(&TurnOutcome::Rejected(TurnRejection::EmptyInput), Vec::new(), false);

        assert_eq!(result.exit_code, 2);
        let payload: Value = serde_json::from_str(&result.output).expect("json output");
        assert_eq!(payload["error_class"], "empty_input");
    }
}
