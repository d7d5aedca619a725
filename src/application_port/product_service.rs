use crate::domain_model::{PageRequest, Product, ProductId};
use crate::domain_port::StoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("product not found")]
    NotFound,
    #[error("product in use: {0}")]
    InUse(String),
    #[error("store error: {0}")]
    Store(String),
}

impl From<StoreError> for ProductError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ProductError::NotFound,
            StoreError::Duplicate(what) => ProductError::Store(what),
            StoreError::Referenced(what) => ProductError::InUse(what),
            StoreError::Backend(msg) => ProductError::Store(msg),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub cost: Decimal,
    pub quantity_stock: i32,
    pub guarantees: DateTime<Utc>,
    pub country: String,
}

#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub id: ProductId,
    pub name: String,
    pub cost: Decimal,
    pub quantity_stock: i32,
    pub guarantees: DateTime<Utc>,
    pub country: String,
}

#[async_trait::async_trait]
pub trait ProductService: Send + Sync {
    async fn create(&self, product: NewProduct) -> Result<Product, ProductError>;
    async fn get(&self, id: ProductId) -> Result<Product, ProductError>;
    async fn list(&self, page: Option<PageRequest>) -> Result<Vec<Product>, ProductError>;
    async fn find_by_name(&self, name: &str) -> Result<Vec<Product>, ProductError>;
    async fn update(&self, update: ProductUpdate) -> Result<Product, ProductError>;
    async fn delete(&self, id: ProductId) -> Result<(), ProductError>;
    async fn add_like(&self, id: ProductId) -> Result<(), ProductError>;
    async fn remove_like(&self, id: ProductId) -> Result<(), ProductError>;
}
