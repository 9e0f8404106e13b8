use shopdesk_core::{ChatMessage, Product, Role};

pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/200";

const USER_PREFIX: &str = "you> ";
const ASSISTANT_PREFIX: &str = "assistant> ";

pub fn render_transcript(messages: &[ChatMessage]) -> String {
    messages.iter().map(render_message).collect::<Vec<_>>().join("\n")
}

/// Renders one message plus its product cards. Tool-only replies start with a
/// newline; that single newline is dropped for display.
pub fn render_message(message: &ChatMessage) -> String {
    let prefix = match message.role() {
        Role::User => USER_PREFIX,
        Role::Assistant => ASSISTANT_PREFIX,
    };
    let text = message.text().strip_prefix('\n').unwrap_or(message.text());
    let indent = " ".repeat(prefix.len());

    let mut lines = Vec::new();
    for (index, line) in text.split('\n').enumerate() {
        if index == 0 {
            lines.push(format!("{prefix}{line}"));
        } else {
            lines.push(format!("{indent}{line}"));
        }
    }
    lines.extend(message.products().iter().map(|product| render_product(product, &indent)));

    lines.join("\n")
}

fn render_product(product: &Product, indent: &str) -> String {
    let image = product.image.as_deref().filter(|url| !url.is_empty()).unwrap_or(PLACEHOLDER_IMAGE);
    format!("{indent}• {} [{}] ₹{} ({image})", product.name, product.sku, product.price)
}

#[cfg(test)]
mod tests {
    use shopdesk_core::{ChatMessage, Price, Product};

    use super::{render_message, render_transcript, PLACEHOLDER_IMAGE};

    #[test]
    fn user_and_assistant_lines_are_prefixed() {
        let transcript = render_transcript(&[
            ChatMessage::user("hello"),
            ChatMessage::assistant("Hi there", Vec::new()),
        ]);
        assert_eq!(transcript, "you> hello\nassistant> Hi there");
    }

    #[test]
    fn single_leading_newline_is_trimmed_for_display() {
        let rendered =
            render_message(&ChatMessage::assistant("\n⚠ lookup failed: timeout", Vec::new()));
        assert_eq!(rendered, "assistant> ⚠ lookup failed: timeout");
    }

    #[test]
    fn continuation_lines_are_indented() {
        let rendered =
            render_message(&ChatMessage::assistant("Here you go\n🛠 check_stock: 3 left", Vec::new()));
        assert_eq!(rendered, "assistant> Here you go\n           🛠 check_stock: 3 left");
    }

    #[test]
    fn products_render_with_price_and_image_fallback() {
        let products = vec![
            Product {
                name: "Runner".to_string(),
                price: Price::from(1499),
                image: None,
                sku: "S1".to_string(),
            },
            Product {
                name: "Trail".to_string(),
                price: Price::from("1,999"),
                image: Some("https://img/trail.png".to_string()),
                sku: "S2".to_string(),
            },
        ];
        let rendered = render_message(&ChatMessage::assistant("Options", products));

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].trim_start(), format!("• Runner [S1] ₹1499 ({PLACEHOLDER_IMAGE})"));
        assert_eq!(lines[2].trim_start(), "• Trail [S2] ₹1,999 (https://img/trail.png)");
    }
}
