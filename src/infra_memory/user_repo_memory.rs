use super::repo_tx_memory::{MemoryStore, Tables, paginate, tables};
use crate::domain_model::*;
use crate::domain_port::*;
use rust_decimal::Decimal;

/// Login and email columns use a case-insensitive collation in MySQL.
fn same_text(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

pub struct MemoryUserRepo {
    store: MemoryStore,
}

impl MemoryUserRepo {
    pub fn new(store: MemoryStore) -> Self {
        MemoryUserRepo { store }
    }

    /// Emulates the unique indexes on login and email.
    fn check_unique(
        t: &Tables,
        key: StorageKey,
        login: &str,
        email: &str,
    ) -> Result<(), StoreError> {
        for other in t.users.values().filter(|u| u.key != key) {
            if same_text(&other.login, login) {
                return Err(StoreError::Duplicate(format!("login {login}")));
            }
            if same_text(&other.email, email) {
                return Err(StoreError::Duplicate(format!("email {email}")));
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryUserRepo {
    async fn create_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        user: &UserRecord,
    ) -> Result<(), StoreError> {
        let t = tables(tx)?;
        if t.users.contains_key(&user.key) {
            return Err(StoreError::Duplicate(format!("user {}", user.key)));
        }
        Self::check_unique(t, user.key, &user.login, &user.email)?;
        t.users.insert(user.key, user.clone());
        Ok(())
    }

    async fn get(&self, key: StorageKey) -> Result<UserRecord, StoreError> {
        self.store
            .lock()
            .await
            .users
            .get(&key)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_by_email(&self, email: &str) -> Result<UserRecord, StoreError> {
        self.store
            .lock()
            .await
            .users
            .values()
            .find(|u| same_text(&u.email, email))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_by_login(&self, login: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .store
            .lock()
            .await
            .users
            .values()
            .find(|u| same_text(&u.login, login))
            .cloned())
    }

    async fn list(&self, page: Option<PageRequest>) -> Result<Vec<UserRecord>, StoreError> {
        let mut rows: Vec<UserRecord> = self.store.lock().await.users.values().cloned().collect();
        rows.sort_by(|a, b| (a.created_at, a.key).cmp(&(b.created_at, b.key)));
        Ok(paginate(rows, page))
    }

    async fn update_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        profile: &UserProfile,
    ) -> Result<(), StoreError> {
        let t = tables(tx)?;
        Self::check_unique(t, profile.key, &profile.login, &profile.email)?;
        let row = t.users.get_mut(&profile.key).ok_or(StoreError::NotFound)?;
        row.login = profile.login.clone();
        row.name = profile.name.clone();
        row.last_name = profile.last_name.clone();
        row.phone_number = profile.phone_number.clone();
        row.email = profile.email.clone();
        row.wallet = profile.wallet;
        row.purchase_count = profile.purchase_count;
        Ok(())
    }

    async fn delete_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<(), StoreError> {
        let t = tables(tx)?;
        t.users.remove(&key).ok_or(StoreError::NotFound)?;
        t.purchases.retain(|_, p| p.user_key != key);
        Ok(())
    }

    async fn id_exists(&self, key: StorageKey) -> Result<bool, StoreError> {
        Ok(self.store.lock().await.users.contains_key(&key))
    }

    async fn id_exists_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<bool, StoreError> {
        Ok(tables(tx)?.users.contains_key(&key))
    }

    async fn email_exists_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        email: &str,
    ) -> Result<bool, StoreError> {
        Ok(tables(tx)?.users.values().any(|u| same_text(&u.email, email)))
    }

    async fn login_exists_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        login: &str,
    ) -> Result<bool, StoreError> {
        Ok(tables(tx)?.users.values().any(|u| same_text(&u.login, login)))
    }

    async fn lock_wallet_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<Wallet, StoreError> {
        // The transaction already holds the whole store.
        let row = tables(tx)?.users.get(&key).ok_or(StoreError::NotFound)?;
        Ok(Wallet {
            balance: row.wallet,
            purchase_count: row.purchase_count,
        })
    }

    async fn debit_wallet_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
        amount: Decimal,
    ) -> Result<(), StoreError> {
        let row = tables(tx)?.users.get_mut(&key).ok_or(StoreError::NotFound)?;
        row.wallet -= amount;
        row.purchase_count += 1;
        Ok(())
    }
}
