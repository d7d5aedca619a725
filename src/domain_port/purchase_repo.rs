use super::{StorageTx, StoreError};
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait PurchaseRepo: Send + Sync {
    async fn create_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        purchase: &PurchaseRecord,
    ) -> Result<(), StoreError>;

    async fn get(&self, key: StorageKey) -> Result<PurchaseRecord, StoreError>;

    async fn list(&self, page: Option<PageRequest>) -> Result<Vec<PurchaseRecord>, StoreError>;

    /// Rewrite the correctable columns. The purchaser never changes.
    async fn update_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
        amendment: &PurchaseAmendment,
    ) -> Result<(), StoreError>;

    async fn delete_in_tx(&self, tx: &mut dyn StorageTx, key: StorageKey)
    -> Result<(), StoreError>;

    async fn id_exists_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<bool, StoreError>;
}
