//! Order models.
//!
//! Orders are owned by the order service and are read-only on the client,
//! apart from the status transition in
//! [`RestClient::confirm_order`](crate::rest::RestClient::confirm_order).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Lifecycle status of an order.
///
/// Statuses the client does not act on are kept verbatim in
/// [`OrderStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    PaymentPending,
    Confirmed,
    #[serde(untagged)]
    Other(String),
}

/// An order placed by a user.
///
/// Fields the client does not model are kept in `extra` and written back
/// unchanged when the order is sent to the order service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    /// Creation timestamp exactly as sent by the order service; empty when
    /// missing or null.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub created_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderLine>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    #[must_use]
    pub fn new(id: i64, user_id: i64, status: OrderStatus, lines: Vec<OrderLine>) -> Self {
        Self {
            id,
            user_id,
            status,
            created_date: String::new(),
            items: Some(lines),
            extra: Map::new(),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == OrderStatus::Confirmed
    }

    /// Returns the order lines, empty when the order carries none.
    pub fn lines(&self) -> &[OrderLine] {
        self.items.as_deref().unwrap_or_default()
    }

    /// Returns a copy of this order moved to [`OrderStatus::Confirmed`].
    #[must_use]
    pub fn to_confirmed(&self) -> Self {
        Self {
            status: OrderStatus::Confirmed,
            ..self.clone()
        }
    }
}

/// Body of an order placement request; the service assigns id and date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: i64,
    pub items: Vec<OrderLine>,
    pub status: OrderStatus,
}

impl NewOrder {
    /// An order awaiting payment, one line per cart entry.
    #[must_use]
    pub fn pending(user_id: i64, items: Vec<OrderLine>) -> Self {
        Self {
            user_id,
            items,
            status: OrderStatus::PaymentPending,
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One line of an order.
///
/// The order service is inconsistent about how a line refers to its item:
/// `{"itemId": 5, "quantity": 2}`, `{"item": {"id": 5}, "quantity": 2}`,
/// `{"item": 5}` and a bare item object `{"id": 5, "price": ...}` are all
/// seen. Decoding never fails; a line whose item id cannot be found keeps
/// `item_id == None`. A decoded line serializes back to the JSON it was
/// read from.
///
/// Two lines are equal when they resolve to the same item and quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct OrderLine {
    pub item_id: Option<i64>,
    pub quantity: Option<i64>,
    raw: Option<Value>,
}

impl PartialEq for OrderLine {
    fn eq(&self, other: &Self) -> bool {
        self.item_id == other.item_id && self.quantity == other.quantity
    }
}

impl Eq for OrderLine {}

impl OrderLine {
    #[must_use]
    pub fn new(item_id: i64, quantity: i64) -> Self {
        Self {
            item_id: Some(item_id),
            quantity: Some(quantity),
            raw: None,
        }
    }

    /// Quantity used for pricing; a missing or non-positive quantity counts as one.
    pub fn effective_quantity(&self) -> i64 {
        match self.quantity {
            Some(qty) if qty > 0 => qty,
            _ => 1,
        }
    }
}

impl From<Value> for OrderLine {
    fn from(value: Value) -> Self {
        let item_id = value
            .get("itemId")
            .and_then(item_ref)
            .or_else(|| value.get("item").and_then(item_ref))
            .or_else(|| item_ref(&value));
        let quantity = value.get("quantity").and_then(Value::as_i64);

        Self {
            item_id,
            quantity,
            raw: Some(value),
        }
    }
}

impl From<OrderLine> for Value {
    fn from(line: OrderLine) -> Self {
        if let Some(raw) = line.raw {
            return raw;
        }
        let mut map = Map::new();
        if let Some(item_id) = line.item_id {
            map.insert("itemId".to_string(), item_id.into());
        }
        if let Some(quantity) = line.quantity {
            map.insert("quantity".to_string(), quantity.into());
        }
        Value::Object(map)
    }
}

/// Resolves an item reference: a numeric id, a numeric string, or an object with `id`.
fn item_ref(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(map) => map.get("id").and_then(|id| match id {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }),
        _ => None,
    }
}
