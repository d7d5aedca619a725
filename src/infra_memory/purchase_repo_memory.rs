use super::repo_tx_memory::{MemoryStore, paginate, tables};
use crate::domain_model::*;
use crate::domain_port::*;

pub struct MemoryPurchaseRepo {
    store: MemoryStore,
}

impl MemoryPurchaseRepo {
    pub fn new(store: MemoryStore) -> Self {
        MemoryPurchaseRepo { store }
    }
}

#[async_trait::async_trait]
impl PurchaseRepo for MemoryPurchaseRepo {
    async fn create_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        purchase: &PurchaseRecord,
    ) -> Result<(), StoreError> {
        let t = tables(tx)?;
        if t.purchases.contains_key(&purchase.key) {
            return Err(StoreError::Duplicate(format!("purchase {}", purchase.key)));
        }
        t.purchases.insert(purchase.key, purchase.clone());
        Ok(())
    }

    async fn get(&self, key: StorageKey) -> Result<PurchaseRecord, StoreError> {
        self.store
            .lock()
            .await
            .purchases
            .get(&key)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self, page: Option<PageRequest>) -> Result<Vec<PurchaseRecord>, StoreError> {
        let mut rows: Vec<PurchaseRecord> =
            self.store.lock().await.purchases.values().cloned().collect();
        rows.sort_by(|a, b| (a.created_at, a.key).cmp(&(b.created_at, b.key)));
        Ok(paginate(rows, page))
    }

    async fn update_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
        amendment: &PurchaseAmendment,
    ) -> Result<(), StoreError> {
        let row = tables(tx)?.purchases.get_mut(&key).ok_or(StoreError::NotFound)?;
        row.product_key = amendment.product_key;
        row.created_at = amendment.created_at;
        row.wallet_snapshot = amendment.wallet_snapshot;
        row.cost = amendment.cost;
        Ok(())
    }

    async fn delete_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<(), StoreError> {
        tables(tx)?
            .purchases
            .remove(&key)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn id_exists_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<bool, StoreError> {
        Ok(tables(tx)?.purchases.contains_key(&key))
    }
}
