use super::util::map_sqlx;
use crate::domain_port::{StorageTx, StoreError, TxManager};
use sqlx::{MySql, MySqlConnection, MySqlPool, Transaction};
use std::any::Any;

pub struct MySqlTxManager {
    pool: MySqlPool,
}

impl MySqlTxManager {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlTxManager { pool }
    }
}

#[async_trait::async_trait]
impl TxManager for MySqlTxManager {
    async fn begin(&self) -> Result<Box<dyn StorageTx>, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx("begin transaction", e))?;
        Ok(Box::new(MySqlTx::new(tx)))
    }
}

/// A pooled connection inside an open transaction. Dropping it without
/// commit rolls back.
pub struct MySqlTx {
    inner: Transaction<'static, MySql>,
}

impl MySqlTx {
    pub fn new(inner: Transaction<'static, MySql>) -> Self {
        MySqlTx { inner }
    }

    pub fn conn(&mut self) -> &mut MySqlConnection {
        self.inner.as_mut()
    }
}

#[async_trait::async_trait]
impl StorageTx for MySqlTx {
    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.inner.commit().await.map_err(|e| map_sqlx("commit", e))
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.inner.rollback().await.map_err(|e| map_sqlx("rollback", e))
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
