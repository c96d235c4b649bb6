//! Catalog item models.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// A purchasable item from the catalog service.
///
/// A missing, null, unparseable or negative price decodes as zero so one bad
/// entry never rejects the rest of the catalog.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn lenient_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(Decimal::ZERO);
    }
    match serde_json::from_value::<Decimal>(value.clone()) {
        Ok(price) if price.is_sign_negative() => {
            warn!(%price, "Negative catalog price, treated as zero");
            Ok(Decimal::ZERO)
        }
        Ok(price) => Ok(price),
        Err(e) => {
            warn!(%value, error = %e, "Unreadable catalog price, treated as zero");
            Ok(Decimal::ZERO)
        }
    }
}

/// Price lookup built from one catalog fetch.
///
/// When the same id appears more than once, the first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    prices: HashMap<i64, Decimal>,
}

impl Catalog {
    /// Creates a catalog with no items; every lookup misses.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the price of the item with the given id.
    pub fn price_of(&self, item_id: i64) -> Option<Decimal> {
        self.prices.get(&item_id).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl<'a> FromIterator<&'a Item> for Catalog {
    fn from_iter<I: IntoIterator<Item = &'a Item>>(iter: I) -> Self {
        let mut prices = HashMap::new();
        for item in iter {
            prices.entry(item.id).or_insert(item.price);
        }
        Self { prices }
    }
}

impl From<&[Item]> for Catalog {
    fn from(items: &[Item]) -> Self {
        items.iter().collect()
    }
}
