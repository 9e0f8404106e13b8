pub mod config;
pub mod domain;
pub mod errors;

pub use domain::message::{ChatMessage, Role, FALLBACK_TEXT, UNREACHABLE_TEXT};
pub use domain::product::{Price, Product};
pub use domain::wire::{
    Actions, ApiResponse, ChatRequest, RawItem, ToolOutput, ToolResult, DEFAULT_CHANNEL,
    RECOMMEND_TOOL,
};
pub use errors::TransportError;
