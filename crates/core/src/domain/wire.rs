//! Request and response bodies exchanged with the sales backend chat endpoint.
//!
//! Every response field is optional: absence is normal input, not an error.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::product::Price;

pub const DEFAULT_CHANNEL: &str = "web";
pub const RECOMMEND_TOOL: &str = "recommend";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub channel: String,
    pub text: String,
    pub customer_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub reply_text: Option<String>,
    pub actions: Option<Actions>,
    /// Backend-assigned session handle. Carried for log correlation only.
    pub session_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actions {
    pub reply: Option<String>,
    pub tool_results: Option<Vec<ToolResult>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool: String,
    pub result: Option<ToolOutput>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub message: Option<String>,
    pub items: Option<Vec<RawItem>>,
}

/// Product as the recommend tool reports it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: Price,
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sku: String,
}

// The backend sends explicit nulls for unset columns; treat them like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ApiResponse, ChatRequest};
    use crate::domain::product::Price;

    #[test]
    fn empty_object_parses_to_all_absent() {
        let response: ApiResponse = serde_json::from_value(json!({})).expect("parse");
        assert_eq!(response, ApiResponse::default());
    }

    #[test]
    fn backend_shape_with_nulls_and_extra_fields_parses() {
        let response: ApiResponse = serde_json::from_value(json!({
            "session_id": "sid-abc123",
            "reply": "ignored duplicate",
            "reply_text": null,
            "actions": {
                "tool_results": [{
                    "tool": "recommend",
                    "result": {
                        "message": "Found 1 products for 'shoes' under ₹2000",
                        "items": [{ "sku": "S1", "name": "Shoe", "price": 999, "image_url": null, "stock": 4 }]
                    }
                }]
            }
        }))
        .expect("parse");

        assert_eq!(response.session_id.as_deref(), Some("sid-abc123"));
        assert!(response.reply_text.is_none());
        let results = response.actions.and_then(|actions| actions.tool_results).unwrap_or_default();
        let items = results[0].result.as_ref().and_then(|result| result.items.clone());
        let items = items.unwrap_or_default();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].price, Price::from(999));
        assert!(items[0].image_url.is_none());
    }

    #[test]
    fn sparse_item_fills_defaults() {
        let response: ApiResponse = serde_json::from_value(json!({
            "actions": { "tool_results": [{ "tool": "recommend", "result": { "items": [{}] } }] }
        }))
        .expect("parse");

        let item = response
            .actions
            .and_then(|actions| actions.tool_results)
            .and_then(|results| results.into_iter().next())
            .and_then(|result| result.result)
            .and_then(|output| output.items)
            .and_then(|items| items.into_iter().next())
            .expect("one item");
        assert_eq!(item.name, "");
        assert_eq!(item.sku, "");
        assert_eq!(item.price, Price::default());
    }

    #[test]
    fn null_item_and_tool_fields_fall_back_to_defaults() {
        let response: ApiResponse = serde_json::from_value(json!({
            "reply_text": "Here are some shirts",
            "actions": {
                "tool_results": [
                    { "tool": null, "result": { "message": "done" } },
                    {
                        "tool": "recommend",
                        "result": {
                            "message": "Found 1",
                            "items": [{ "sku": null, "name": null, "price": null, "image_url": null }]
                        }
                    }
                ]
            }
        }))
        .expect("nulls should parse");

        let results = response.actions.and_then(|actions| actions.tool_results).unwrap_or_default();
        assert_eq!(results[0].tool, "");
        let item = results[1]
            .result
            .as_ref()
            .and_then(|output| output.items.as_ref())
            .and_then(|items| items.first())
            .expect("one item");
        assert_eq!(item.name, "");
        assert_eq!(item.sku, "");
        assert_eq!(item.price, Price::default());
        assert!(item.image_url.is_none());
    }

    #[test]
    fn mistyped_item_field_is_still_rejected() {
        let parsed = serde_json::from_value::<ApiResponse>(json!({
            "actions": { "tool_results": [{ "tool": "recommend", "result": { "items": [{ "name": 7 }] } }] }
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn mistyped_field_is_rejected() {
        let parsed = serde_json::from_value::<ApiResponse>(json!({ "reply_text": 5 }));
        assert!(parsed.is_err());
    }

    #[test]
    fn chat_request_uses_backend_field_names() {
        let body = serde_json::to_value(ChatRequest {
            channel: "web".to_string(),
            text: "hello".to_string(),
            customer_id: "CUST-001".to_string(),
        })
        .expect("serialize");
        assert_eq!(body, json!({ "channel": "web", "text": "hello", "customer_id": "CUST-001" }));
    }
}
