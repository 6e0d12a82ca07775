use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body POSTed to the order-intake endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub name: String,
    pub phone: String,
    pub coffee_type: String,
    pub customization: Customization,
    pub mood: String,
    pub pickup_time: String,
    pub order_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customization {
    pub milk: String,
    pub sweetness: u8,
    pub ice: u8,
    pub shots: u8,
    pub addons: Vec<String>,
}

/// What the intake endpoint acknowledged. Any response shape is tolerated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderReceipt {
    pub order_id: Option<String>,
}

impl OrderReceipt {
    /// Extracts `orderId` from an arbitrary JSON response; empty or non-scalar ids count as absent.
    pub fn from_response(body: &Value) -> Self {
        let order_id = match body.get("orderId") {
            Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
            Some(Value::Number(id)) if id.as_f64() != Some(0.0) => Some(id.to_string()),
            _ => None,
        };
        Self { order_id }
    }
}
