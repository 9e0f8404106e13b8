use serde::{Deserialize, Serialize};

use crate::domain::product::Product;

pub const UNREACHABLE_TEXT: &str = "⚠ Unable to connect to server.";
pub const FALLBACK_TEXT: &str = "Sorry, I didn't understand that.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One line of the transcript. Fields are private so a message cannot be
/// edited after it has been appended to a conversation. Serialize-only: the
/// constructors are the only way to build one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    role: Role,
    text: String,
    products: Vec<Product>,
}

impl ChatMessage {
    /// User messages never carry products.
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into(), products: Vec::new() }
    }

    pub fn assistant(text: impl Into<String>, products: Vec<Product>) -> Self {
        Self { role: Role::Assistant, text: text.into(), products }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatMessage, Role};
    use crate::domain::product::{Price, Product};

    #[test]
    fn user_message_has_no_products() {
        let message = ChatMessage::user("show me shoes");
        assert_eq!(message.role(), Role::User);
        assert!(message.products().is_empty());
    }

    #[test]
    fn assistant_message_keeps_products_in_order() {
        let product = |sku: &str| Product {
            name: format!("Item {sku}"),
            price: Price::from(100),
            image: None,
            sku: sku.to_string(),
        };
        let message = ChatMessage::assistant("Found 2", vec![product("A"), product("B")]);

        assert_eq!(message.role(), Role::Assistant);
        let skus: Vec<&str> = message.products().iter().map(|item| item.sku.as_str()).collect();
        assert_eq!(skus, vec!["A", "B"]);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_value(ChatMessage::user("hi")).expect("serialize");
        assert_eq!(json["role"], "user");
        assert_eq!(json["products"], serde_json::json!([]));
    }
}
