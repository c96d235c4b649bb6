//! Derivation of payment records from orders and the catalog.
//!
//! Pure functions: the same orders and catalog always produce the same
//! records, in the same order.

use std::collections::HashSet;

use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{Catalog, Order, OrderLine, PaymentRecord, PaymentStatus};

/// Derives one completed payment per confirmed order.
///
/// Orders that are not `CONFIRMED` are skipped, as are repeated order ids
/// after the first. Output order follows `orders`.
pub fn derive_payments(orders: &[Order], catalog: &Catalog) -> Vec<PaymentRecord> {
    let mut seen = HashSet::new();

    orders
        .iter()
        .filter(|order| order.is_confirmed())
        .filter(|order| seen.insert(order.id))
        .map(|order| derive_payment(order, catalog))
        .collect()
}

/// Builds the payment record standing in for a confirmed order.
pub fn derive_payment(order: &Order, catalog: &Catalog) -> PaymentRecord {
    PaymentRecord {
        id: order.id,
        order_id: order.id,
        user_id: order.user_id,
        amount: order_amount(order, catalog),
        status: PaymentStatus::Completed,
        payment_date: order.created_date.clone(),
        order: None,
    }
}

/// Sums the catalog price of every line of the order.
///
/// Lines that cannot be priced contribute zero. A line that would push the
/// total past the decimal range is left out.
pub fn order_amount(order: &Order, catalog: &Catalog) -> Decimal {
    order.lines().iter().fold(Decimal::ZERO, |total, line| {
        let amount = line_amount(line, catalog);
        total.checked_add(amount).unwrap_or_else(|| {
            warn!(order_id = order.id, %amount, "Order total overflowed, line left out");
            total
        })
    })
}

/// Price of one line: catalog price times quantity, or zero when the item
/// id is missing, unknown to the catalog, or the product overflows.
pub fn line_amount(line: &OrderLine, catalog: &Catalog) -> Decimal {
    let Some((item_id, price)) = line
        .item_id
        .and_then(|id| catalog.price_of(id).map(|price| (id, price)))
    else {
        return Decimal::ZERO;
    };
    let quantity = line.effective_quantity();

    price
        .checked_mul(Decimal::from(quantity))
        .unwrap_or_else(|| {
            warn!(item_id, %price, quantity, "Line amount overflowed, priced at zero");
            Decimal::ZERO
        })
}
