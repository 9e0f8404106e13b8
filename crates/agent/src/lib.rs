//! Chat Turn Pipeline - the conversational core behind the sales dashboard widget
//!
//! This crate owns everything between "the user pressed send" and "a message is
//! ready to render":
//! - Keeps the session transcript in insertion order (`store`)
//! - Runs one request/response cycle at a time per session (`session`)
//! - Talks to the sales backend over HTTP (`transport`)
//! - Reconciles the backend's optional reply/tool fields into one message (`normalizer`)
//! - Maps recommend-tool items onto product cards (`extractor`)
//!
//! # Architecture
//!
//! ```text
//! user text → ChatSession::send (guard) → ChatTransport → ApiResponse
//!                                                   ↓
//!                ConversationStore ← ChatMessage ← normalize (+ extract)
//! ```
//!
//! # Key Types
//!
//! - `ChatSession` - single-flight turn lifecycle and transcript owner
//! - `ChatTransport` - pluggable backend round trip (`HttpChatTransport` in production)
//! - `ConversationStore` - append-only log with on-append observers
//!
//! # Failure Principle
//!
//! A turn that passes the input guard always ends with exactly one assistant
//! message. Backend failures become a canned reply; they never escape `send`.

pub mod extractor;
pub mod normalizer;
pub mod session;
pub mod store;
pub mod transport;

pub use normalizer::{normalize, NormalizedReply};
pub use session::{ChatSession, SessionSettings, TurnOutcome, TurnRejection};
pub use store::ConversationStore;
pub use transport::{ChatTransport, HttpChatTransport};
