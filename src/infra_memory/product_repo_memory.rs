use super::repo_tx_memory::{MemoryStore, paginate, tables};
use crate::domain_model::*;
use crate::domain_port::*;
use rust_decimal::Decimal;

pub struct MemoryProductRepo {
    store: MemoryStore,
}

impl MemoryProductRepo {
    pub fn new(store: MemoryStore) -> Self {
        MemoryProductRepo { store }
    }
}

fn by_name(rows: &mut [ProductRecord]) {
    rows.sort_by(|a, b| (&a.name, a.key).cmp(&(&b.name, b.key)));
}

#[async_trait::async_trait]
impl ProductRepo for MemoryProductRepo {
    async fn create_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        product: &ProductRecord,
    ) -> Result<(), StoreError> {
        let t = tables(tx)?;
        if t.products.contains_key(&product.key) {
            return Err(StoreError::Duplicate(format!("product {}", product.key)));
        }
        t.products.insert(product.key, product.clone());
        Ok(())
    }

    async fn get(&self, key: StorageKey) -> Result<ProductRecord, StoreError> {
        self.store
            .lock()
            .await
            .products
            .get(&key)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self, page: Option<PageRequest>) -> Result<Vec<ProductRecord>, StoreError> {
        let mut rows: Vec<ProductRecord> =
            self.store.lock().await.products.values().cloned().collect();
        by_name(&mut rows);
        Ok(paginate(rows, page))
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<ProductRecord>, StoreError> {
        let mut rows: Vec<ProductRecord> = self
            .store
            .lock()
            .await
            .products
            .values()
            .filter(|p| p.name == name)
            .cloned()
            .collect();
        by_name(&mut rows);
        Ok(rows)
    }

    async fn update_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        product: &ProductRecord,
    ) -> Result<(), StoreError> {
        let row = tables(tx)?
            .products
            .get_mut(&product.key)
            .ok_or(StoreError::NotFound)?;
        row.name = product.name.clone();
        row.cost = product.cost;
        row.quantity_stock = product.quantity_stock;
        row.guarantees = product.guarantees;
        row.country = product.country.clone();
        Ok(())
    }

    async fn delete_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<(), StoreError> {
        let t = tables(tx)?;
        if t.purchases.values().any(|p| p.product_key == key) {
            return Err(StoreError::Referenced(format!("product {key} has purchases")));
        }
        t.products.remove(&key).ok_or(StoreError::NotFound)?;
        Ok(())
    }

    async fn id_exists_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<bool, StoreError> {
        Ok(tables(tx)?.products.contains_key(&key))
    }

    async fn get_cost_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<Decimal, StoreError> {
        tables(tx)?
            .products
            .get(&key)
            .map(|p| p.cost)
            .ok_or(StoreError::NotFound)
    }

    async fn add_like_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<(), StoreError> {
        let row = tables(tx)?.products.get_mut(&key).ok_or(StoreError::NotFound)?;
        row.likes += 1;
        Ok(())
    }

    async fn remove_like_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<(), StoreError> {
        let row = tables(tx)?.products.get_mut(&key).ok_or(StoreError::NotFound)?;
        row.likes = (row.likes - 1).max(0);
        Ok(())
    }
}
