use super::{StorageTx, StoreError};
use crate::domain_model::*;
use rust_decimal::Decimal;

#[async_trait::async_trait]
pub trait ProductRepo: Send + Sync {
    async fn create_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        product: &ProductRecord,
    ) -> Result<(), StoreError>;

    async fn get(&self, key: StorageKey) -> Result<ProductRecord, StoreError>;

    async fn list(&self, page: Option<PageRequest>) -> Result<Vec<ProductRecord>, StoreError>;

    async fn find_by_name(&self, name: &str) -> Result<Vec<ProductRecord>, StoreError>;

    /// Overwrite every column except the like counter.
    async fn update_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        product: &ProductRecord,
    ) -> Result<(), StoreError>;

    async fn delete_in_tx(&self, tx: &mut dyn StorageTx, key: StorageKey)
    -> Result<(), StoreError>;

    async fn id_exists_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<bool, StoreError>;

    async fn get_cost_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<Decimal, StoreError>;

    async fn add_like_in_tx(&self, tx: &mut dyn StorageTx, key: StorageKey)
    -> Result<(), StoreError>;

    /// Decrement the like counter, never below zero.
    async fn remove_like_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<(), StoreError>;
}
