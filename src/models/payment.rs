//! Payment record models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::Order;

/// Settlement status of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// One entry of a user's payment history.
///
/// Either returned by the payment service or derived from a confirmed
/// order (see [`crate::reconcile`]); both look the same to consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: i64,
    pub order_id: i64,
    pub user_id: i64,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub payment_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
}
