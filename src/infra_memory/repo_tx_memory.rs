use crate::domain_model::*;
use crate::domain_port::{StorageTx, StoreError, TxManager};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub users: BTreeMap<StorageKey, UserRecord>,
    pub products: BTreeMap<StorageKey, ProductRecord>,
    pub purchases: BTreeMap<StorageKey, PurchaseRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) async fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().await
    }
}

pub struct MemoryTxManager {
    store: MemoryStore,
}

impl MemoryTxManager {
    pub fn new(store: MemoryStore) -> Self {
        MemoryTxManager { store }
    }
}

#[async_trait::async_trait]
impl TxManager for MemoryTxManager {
    async fn begin(&self) -> Result<Box<dyn StorageTx>, StoreError> {
        let guard = self.store.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait::async_trait]
impl StorageTx for MemoryTx {
    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Working copy of the tables inside `tx`.
pub(super) fn tables<'a>(tx: &'a mut dyn StorageTx) -> Result<&'a mut Tables, StoreError> {
    tx.as_any_mut()
        .downcast_mut::<MemoryTx>()
        .map(|tx| &mut tx.working)
        .ok_or_else(|| StoreError::Backend("transaction is not a memory transaction".to_string()))
}

pub(super) fn paginate<T>(rows: Vec<T>, page: Option<PageRequest>) -> Vec<T> {
    match page {
        Some(page) => rows
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect(),
        None => rows,
    }
}
