use super::key::{StorageKey, shown_id};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer user identifier exposed at the API boundary.
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl UserId {
    pub fn key(&self) -> StorageKey {
        StorageKey::from_public_id(self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(UserId)
    }
}

/// A user row as stored, credentials included. Never serialised.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub key: StorageKey,
    pub login: String,
    pub name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
    pub wallet: Decimal,
    pub purchase_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Profile columns written by an update. Credentials are not part of it.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub key: StorageKey,
    pub login: String,
    pub name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub wallet: Decimal,
    pub purchase_count: i64,
}

/// Balance and counter of a wallet row locked for settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wallet {
    pub balance: Decimal,
    pub purchase_count: i64,
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: u64,
    pub login: String,
    pub name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub wallet: Decimal,
    pub purchase_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(rec: UserRecord) -> Self {
        User {
            id: shown_id(&rec.key),
            login: rec.login,
            name: rec.name,
            last_name: rec.last_name,
            phone_number: rec.phone_number,
            email: rec.email,
            wallet: rec.wallet,
            purchase_count: rec.purchase_count,
            created_at: rec.created_at,
        }
    }
}
