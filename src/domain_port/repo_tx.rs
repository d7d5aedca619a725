use super::StoreError;
use std::any::Any;

#[async_trait::async_trait]
pub trait TxManager: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn StorageTx>, StoreError>;
}

/// An open transaction. Dropping it without `commit` rolls it back.
#[async_trait::async_trait]
pub trait StorageTx: Send + Any {
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;

    /// Lets a backend recover its concrete transaction type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
