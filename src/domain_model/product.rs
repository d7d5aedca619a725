use super::key::{StorageKey, shown_id};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl ProductId {
    pub fn key(&self) -> StorageKey {
        StorageKey::from_public_id(self.0)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub key: StorageKey,
    pub name: String,
    pub cost: Decimal,
    pub quantity_stock: i32,
    pub guarantees: DateTime<Utc>,
    pub country: String,
    pub likes: i64,
}

/// Public view of a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub cost: Decimal,
    pub quantity_stock: i32,
    pub guarantees: DateTime<Utc>,
    pub country: String,
    pub likes: i64,
}

impl From<ProductRecord> for Product {
    fn from(rec: ProductRecord) -> Self {
        Product {
            id: shown_id(&rec.key),
            name: rec.name,
            cost: rec.cost,
            quantity_stock: rec.quantity_stock,
            guarantees: rec.guarantees,
            country: rec.country,
            likes: rec.likes,
        }
    }
}
