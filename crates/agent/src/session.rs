use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use shopdesk_core::config::AppConfig;
use shopdesk_core::{ApiResponse, ChatMessage, ChatRequest, TransportError, DEFAULT_CHANNEL};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::normalizer::normalize;
use crate::store::ConversationStore;
use crate::transport::ChatTransport;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSettings {
    pub customer_id: String,
    pub channel: String,
    pub timeout: Duration,
}

impl SessionSettings {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            channel: DEFAULT_CHANNEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            customer_id: config.session.customer_id.clone(),
            channel: config.session.channel.clone(),
            timeout: config.backend.timeout(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnRejection {
    EmptyInput,
    Busy,
}

impl TurnRejection {
    fn as_str(self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::Busy => "busy",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Nothing was appended and no request was issued.
    Rejected(TurnRejection),
    Answered(ChatMessage),
    /// The backend could not be reached; `message` is the canned reply that was appended.
    Unreachable { message: ChatMessage, error: TransportError },
}

impl TurnOutcome {
    pub fn assistant_message(&self) -> Option<&ChatMessage> {
        match self {
            Self::Rejected(_) => None,
            Self::Answered(message) | Self::Unreachable { message, .. } => Some(message),
        }
    }
}

/// One chat session: the transcript, the draft input, and the single-flight
/// busy flag. `send` is the only path that talks to the backend.
pub struct ChatSession {
    transport: Arc<dyn ChatTransport>,
    settings: SessionSettings,
    store: ConversationStore,
    draft: Mutex<String>,
    busy: AtomicBool,
}

impl ChatSession {
    pub fn new(transport: Arc<dyn ChatTransport>, settings: SessionSettings) -> Self {
        Self {
            transport,
            settings,
            store: ConversationStore::new(),
            draft: Mutex::new(String::new()),
            busy: AtomicBool::new(false),
        }
    }

    /// Builds a session from config and seeds the configured greeting, if any.
    pub fn from_config(config: &AppConfig, transport: Arc<dyn ChatTransport>) -> Self {
        let session = Self::new(transport, SessionSettings::from_config(config));
        if let Some(greeting) = &config.session.greeting {
            session.store.append(ChatMessage::assistant(greeting.clone(), Vec::new()));
        }
        session
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.store.all()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        *self.draft.lock().unwrap_or_else(PoisonError::into_inner) = text.into();
    }

    pub fn draft(&self) -> String {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Sends the draft. The draft is cleared only when the turn is accepted.
    pub async fn send_draft(&self) -> TurnOutcome {
        let input = self.draft();
        let guard = match self.begin_turn(&input) {
            Ok(guard) => guard,
            Err(rejection) => return TurnOutcome::Rejected(rejection),
        };
        self.draft.lock().unwrap_or_else(PoisonError::into_inner).clear();

        self.run_turn(input, guard).await
    }

    pub async fn send(&self, raw_input: &str) -> TurnOutcome {
        let guard = match self.begin_turn(raw_input) {
            Ok(guard) => guard,
            Err(rejection) => return TurnOutcome::Rejected(rejection),
        };

        self.run_turn(raw_input.to_string(), guard).await
    }

    fn begin_turn(&self, raw_input: &str) -> Result<BusyGuard<'_>, TurnRejection> {
        let rejection = if raw_input.trim().is_empty() {
            Some(TurnRejection::EmptyInput)
        } else if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            Some(TurnRejection::Busy)
        } else {
            None
        };

        if let Some(rejection) = rejection {
            debug!(
                event_name = "chat.turn.rejected",
                reason = rejection.as_str(),
                customer_id = %self.settings.customer_id,
                "chat turn ignored"
            );
            return Err(rejection);
        }

        Ok(BusyGuard { busy: &self.busy })
    }

    async fn run_turn(&self, input: String, _guard: BusyGuard<'_>) -> TurnOutcome {
        let correlation_id = Uuid::new_v4();
        self.store.append(ChatMessage::user(input.clone()));

        info!(
            event_name = "chat.turn.started",
            correlation_id = %correlation_id,
            customer_id = %self.settings.customer_id,
            channel = %self.settings.channel,
            input_chars = input.chars().count(),
            "chat turn started"
        );

        let request = ChatRequest {
            channel: self.settings.channel.clone(),
            text: input,
            customer_id: self.settings.customer_id.clone(),
        };

        let outcome = match self.call_backend(&request).await {
            Ok(response) => {
                let reply = normalize(&response).into_message();
                info!(
                    event_name = "chat.turn.completed",
                    correlation_id = %correlation_id,
                    backend_session_id = response.session_id.as_deref().unwrap_or("unknown"),
                    products = reply.products().len(),
                    "chat turn completed"
                );
                TurnOutcome::Answered(reply)
            }
            Err(error) => {
                warn!(
                    event_name = "chat.turn.transport_failed",
                    correlation_id = %correlation_id,
                    error_class = error.error_class(),
                    error = %error,
                    "chat turn could not reach backend"
                );
                let message = ChatMessage::assistant(error.user_message(), Vec::new());
                TurnOutcome::Unreachable { message, error }
            }
        };

        if let Some(message) = outcome.assistant_message() {
            self.store.append(message.clone());
        }

        outcome
    }

    async fn call_backend(&self, request: &ChatRequest) -> Result<ApiResponse, TransportError> {
        match tokio::time::timeout(self.settings.timeout, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout { timeout_secs: self.settings.timeout.as_secs() }),
        }
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("settings", &self.settings)
            .field("store", &self.store)
            .field("busy", &self.is_busy())
            .finish()
    }
}

/// Clears the busy flag on every exit from a turn, including a dropped future.
struct BusyGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
