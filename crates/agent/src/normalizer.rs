//! Turns a backend response into the single assistant message shown for a turn.
//!
//! Precedence:
//! 1. `reply_text`, else `actions.reply`, else nothing.
//! 2. One line per tool result: its `result.message`, else its `error`.
//!    A non-empty `recommend` item list replaces the product cards.
//! 3. Reply followed by tool lines; tool lines alone; or the fallback text.

use shopdesk_core::{
    ApiResponse, ChatMessage, Product, ToolResult, FALLBACK_TEXT, RECOMMEND_TOOL,
};

use crate::extractor;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizedReply {
    pub text: String,
    pub products: Vec<Product>,
}

impl NormalizedReply {
    pub fn into_message(self) -> ChatMessage {
        ChatMessage::assistant(self.text, self.products)
    }
}

pub fn normalize(response: &ApiResponse) -> NormalizedReply {
    let reply = primary_reply(response);

    let mut tool_text = String::new();
    let mut products = Vec::new();
    for result in tool_results(response) {
        if let Some(line) = tool_line(result) {
            tool_text.push_str(&line);
        }

        if let Some(recommended) = recommended_products(result) {
            products = recommended;
        }
    }

    let text = if !reply.trim().is_empty() {
        format!("{reply}{tool_text}")
    } else if !tool_text.trim().is_empty() {
        tool_text
    } else {
        FALLBACK_TEXT.to_string()
    };

    NormalizedReply { text, products }
}

fn primary_reply(response: &ApiResponse) -> &str {
    present(response.reply_text.as_deref())
        .or_else(|| present(response.actions.as_ref().and_then(|actions| actions.reply.as_deref())))
        .unwrap_or("")
}

fn tool_results(response: &ApiResponse) -> &[ToolResult] {
    response.actions.as_ref().and_then(|actions| actions.tool_results.as_deref()).unwrap_or(&[])
}

fn tool_line(result: &ToolResult) -> Option<String> {
    let message = present(result.result.as_ref().and_then(|output| output.message.as_deref()));
    if let Some(message) = message {
        return Some(format!("\n🛠 {}: {message}", result.tool));
    }

    present(result.error.as_deref()).map(|error| format!("\n⚠ {} failed: {error}", result.tool))
}

fn recommended_products(result: &ToolResult) -> Option<Vec<Product>> {
    if result.tool != RECOMMEND_TOOL {
        return None;
    }

    let items = result.result.as_ref()?.items.as_deref()?;
    (!items.is_empty()).then(|| extractor::extract(items))
}

/// An empty string counts as absent, the same as a missing field.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
