use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Price as the backend sends it: either a JSON number or a preformatted label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(Number),
    Label(String),
}

impl Default for Price {
    fn default() -> Self {
        Self::Label(String::new())
    }
}

impl From<i64> for Price {
    fn from(value: i64) -> Self {
        Self::Amount(Number::from(value))
    }
}

impl From<&str> for Price {
    fn from(value: &str) -> Self {
        Self::Label(value.to_string())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(number) => write!(f, "{number}"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

/// A product card attached to an assistant message. `sku` is the list identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: Price,
    pub image: Option<String>,
    pub sku: String,
}
