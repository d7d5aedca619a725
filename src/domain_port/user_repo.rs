use super::{StorageTx, StoreError};
use crate::domain_model::*;
use rust_decimal::Decimal;

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a row. Unique login/email violations surface as [`StoreError::Duplicate`].
    async fn create_in_tx(&self, tx: &mut dyn StorageTx, user: &UserRecord)
    -> Result<(), StoreError>;

    async fn get(&self, key: StorageKey) -> Result<UserRecord, StoreError>;

    async fn get_by_email(&self, email: &str) -> Result<UserRecord, StoreError>;

    /// Fetch by login (for authentication).
    async fn get_by_login(&self, login: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn list(&self, page: Option<PageRequest>) -> Result<Vec<UserRecord>, StoreError>;

    async fn update_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        profile: &UserProfile,
    ) -> Result<(), StoreError>;

    async fn delete_in_tx(&self, tx: &mut dyn StorageTx, key: StorageKey)
    -> Result<(), StoreError>;

    async fn id_exists(&self, key: StorageKey) -> Result<bool, StoreError>;

    async fn id_exists_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<bool, StoreError>;

    async fn email_exists_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        email: &str,
    ) -> Result<bool, StoreError>;

    async fn login_exists_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        login: &str,
    ) -> Result<bool, StoreError>;

    /// Read the wallet and hold a write lock on the row until the transaction ends.
    async fn lock_wallet_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<Wallet, StoreError>;

    /// Subtract `amount` from the wallet and count one more purchase.
    async fn debit_wallet_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
        amount: Decimal,
    ) -> Result<(), StoreError>;
}
