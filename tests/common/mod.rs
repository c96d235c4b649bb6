//! Shared test utilities: an in-memory [`StoreApi`] and model builders.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rust_decimal::Decimal;

use storefront::api::{FallbackReason, StoreApi};
use storefront::models::{Item, Order, OrderLine, OrderStatus, PaymentRecord, PaymentStatus};
use storefront::{Result, StorefrontError};

/// In-memory collaborators with call counters.
///
/// A `None` collection means the corresponding service is down. By default
/// the payment service is down and orders and catalog are empty.
pub struct MockApi {
    orders: Mutex<Option<Vec<Order>>>,
    items: Mutex<Option<Vec<Item>>>,
    payments: Mutex<Option<Vec<PaymentRecord>>>,
    delay: Option<Duration>,
    pub order_calls: AtomicUsize,
    pub item_calls: AtomicUsize,
    pub payment_calls: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            orders: Mutex::new(Some(Vec::new())),
            items: Mutex::new(Some(Vec::new())),
            payments: Mutex::new(None),
            delay: None,
            order_calls: AtomicUsize::new(0),
            item_calls: AtomicUsize::new(0),
            payment_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_orders(self, orders: Vec<Order>) -> Self {
        self.set_orders(Some(orders));
        self
    }

    pub fn with_items(self, items: Vec<Item>) -> Self {
        self.set_items(Some(items));
        self
    }

    pub fn with_payments(self, payments: Vec<PaymentRecord>) -> Self {
        self.set_payments(Some(payments));
        self
    }

    pub fn with_catalog_down(self) -> Self {
        self.set_items(None);
        self
    }

    pub fn with_orders_down(self) -> Self {
        self.set_orders(None);
        self
    }

    /// Every fetch sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_orders(&self, orders: Option<Vec<Order>>) {
        *self.orders.lock().unwrap() = orders;
    }

    pub fn set_items(&self, items: Option<Vec<Item>>) {
        *self.items.lock().unwrap() = items;
    }

    pub fn set_payments(&self, payments: Option<Vec<PaymentRecord>>) {
        *self.payments.lock().unwrap() = payments;
    }

    pub fn calls(&self) -> (usize, usize, usize) {
        (
            self.payment_calls.load(Ordering::SeqCst),
            self.order_calls.load(Ordering::SeqCst),
            self.item_calls.load(Ordering::SeqCst),
        )
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn service_down(path: &str) -> StorefrontError {
    StorefrontError::Status {
        status: 503,
        url: format!("http://mock{path}"),
    }
}

impl StoreApi for MockApi {
    async fn fetch_orders(&self, _user_id: i64) -> Result<Vec<Order>> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let orders = self.orders.lock().unwrap().clone();
        orders.ok_or_else(|| service_down("/api/orders"))
    }

    async fn fetch_items(&self) -> Result<Vec<Item>> {
        self.item_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let items = self.items.lock().unwrap().clone();
        items.ok_or_else(|| service_down("/api/items"))
    }

    async fn fetch_authoritative_payments(
        &self,
        _user_id: i64,
    ) -> std::result::Result<Vec<PaymentRecord>, FallbackReason> {
        self.payment_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let payments = self.payments.lock().unwrap().clone();
        payments.ok_or_else(|| FallbackReason::Unreachable("connection refused".to_string()))
    }
}

pub fn order(id: i64, user_id: i64, status: OrderStatus, lines: Vec<OrderLine>) -> Order {
    let mut order = Order::new(id, user_id, status, lines);
    order.created_date = format!("2024-06-{id:02}T09:30:00");
    order
}

pub fn confirmed(id: i64, lines: Vec<OrderLine>) -> Order {
    order(id, 7, OrderStatus::Confirmed, lines)
}

pub fn item(id: i64, price: Decimal) -> Item {
    Item {
        id,
        name: format!("item-{id}"),
        price,
        description: None,
    }
}

pub fn payment(id: i64, order_id: i64, amount: Decimal) -> PaymentRecord {
    PaymentRecord {
        id,
        order_id,
        user_id: 7,
        amount,
        status: PaymentStatus::Completed,
        payment_date: "2024-06-30T12:00:00".to_string(),
        order: None,
    }
}
