use super::key::{StorageKey, shown_id};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseId(pub u64);

impl PurchaseId {
    pub fn key(&self) -> StorageKey {
        StorageKey::from_public_id(self.0)
    }
}

impl fmt::Display for PurchaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseRecord {
    pub key: StorageKey,
    pub user_key: StorageKey,
    pub product_key: StorageKey,
    pub created_at: DateTime<Utc>,
    /// Purchaser's balance right after the debit.
    pub wallet_snapshot: Decimal,
    pub cost: Decimal,
}

/// Correctable columns of a purchase row.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseAmendment {
    pub product_key: StorageKey,
    pub created_at: DateTime<Utc>,
    pub wallet_snapshot: Decimal,
    pub cost: Decimal,
}

/// Public view of a purchase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Purchase {
    pub id: u64,
    pub user_id: u64,
    pub product_id: u64,
    pub created_at: DateTime<Utc>,
    pub wallet_snapshot: Decimal,
    pub cost: Decimal,
}

impl From<PurchaseRecord> for Purchase {
    fn from(rec: PurchaseRecord) -> Self {
        Purchase {
            id: shown_id(&rec.key),
            user_id: shown_id(&rec.user_key),
            product_id: shown_id(&rec.product_key),
            created_at: rec.created_at,
            wallet_snapshot: rec.wallet_snapshot,
            cost: rec.cost,
        }
    }
}
