use crate::domain_model::{PageRequest, ProductId, Purchase, PurchaseId, UserId};
use crate::domain_port::StoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[derive(Debug, thiserror::Error)]
pub enum PurchaseError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("purchaser not found")]
    UserNotFound,
    #[error("product not found")]
    ProductNotFound,
    #[error("purchase not found")]
    PurchaseNotFound,
    #[error("insufficient funds: balance {balance}, cost {cost}")]
    InsufficientFunds { balance: Decimal, cost: Decimal },
    #[error("store error: {0}")]
    Store(String),
}

impl From<StoreError> for PurchaseError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => PurchaseError::PurchaseNotFound,
            StoreError::Duplicate(what) | StoreError::Referenced(what) => PurchaseError::Store(what),
            StoreError::Backend(msg) => PurchaseError::Store(msg),
        }
    }
}

/// Administrative correction of a purchase row. Settlement is not re-run.
#[derive(Debug, Clone)]
pub struct PurchaseUpdate {
    pub id: PurchaseId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
    pub wallet_snapshot: Decimal,
    pub cost: Decimal,
}

#[async_trait::async_trait]
pub trait PurchaseService: Send + Sync {
    /// Funds check, debit and insert as one transaction.
    async fn create(&self, purchaser: UserId, product: ProductId)
    -> Result<Purchase, PurchaseError>;
    async fn get(&self, id: PurchaseId) -> Result<Purchase, PurchaseError>;
    async fn list(&self, page: Option<PageRequest>) -> Result<Vec<Purchase>, PurchaseError>;
    async fn update(&self, update: PurchaseUpdate) -> Result<Purchase, PurchaseError>;
    async fn delete(&self, id: PurchaseId) -> Result<(), PurchaseError>;
}
