use super::util::{downcast, map_sqlx};
use crate::domain_model::*;
use crate::domain_port::*;
use rust_decimal::Decimal;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlUserRepo {
    pool: MySqlPool,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }
}

const USER_COLUMNS: &str = "user_id, login, name, last_name, phone_number, email, \
     password_hash, password_salt, wallet, purchase_count, created_at";

fn user_from_row(row: &MySqlRow) -> Result<UserRecord, sqlx::Error> {
    Ok(UserRecord {
        key: row.try_get("user_id")?,
        login: row.try_get("login")?,
        name: row.try_get("name")?,
        last_name: row.try_get("last_name")?,
        phone_number: row.try_get("phone_number")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        password_salt: row.try_get("password_salt")?,
        wallet: row.try_get("wallet")?,
        purchase_count: row.try_get("purchase_count")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn create_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        user: &UserRecord,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx)?;

        sqlx::query(
            r#"
INSERT INTO user (user_id, login, name, last_name, phone_number, email,
                  password_hash, password_salt, wallet, purchase_count, created_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(user.key)
        .bind(&user.login)
        .bind(&user.name)
        .bind(&user.last_name)
        .bind(&user.phone_number)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.password_salt)
        .bind(user.wallet)
        .bind(user.purchase_count)
        .bind(user.created_at)
        .execute(tx.conn())
        .await
        .map_err(|e| map_sqlx("insert user", e))?;

        Ok(())
    }

    async fn get(&self, key: StorageKey) -> Result<UserRecord, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM user WHERE user_id = ?"))
            .bind(key)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx("query user", e))?;

        user_from_row(&row).map_err(|e| map_sqlx("decode user", e))
    }

    async fn get_by_email(&self, email: &str) -> Result<UserRecord, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM user WHERE email = ?"))
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx("query user by email", e))?;

        user_from_row(&row).map_err(|e| map_sqlx("decode user", e))
    }

    async fn get_by_login(&self, login: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM user WHERE login = ?"))
            .bind(login)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx("query user by login", e))?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(|e| map_sqlx("decode user", e))
    }

    async fn list(&self, page: Option<PageRequest>) -> Result<Vec<UserRecord>, StoreError> {
        let rows = match page {
            Some(page) => {
                sqlx::query(&format!(
                    "SELECT {USER_COLUMNS} FROM user ORDER BY created_at, user_id LIMIT ? OFFSET ?"
                ))
                .bind(page.limit)
                .bind(page.offset)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {USER_COLUMNS} FROM user ORDER BY created_at, user_id"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| map_sqlx("list users", e))?;

        rows.iter()
            .map(user_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx("decode user", e))
    }

    async fn update_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        profile: &UserProfile,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx)?;

        sqlx::query(
            r#"
UPDATE user
SET login = ?, name = ?, last_name = ?, phone_number = ?, email = ?,
    wallet = ?, purchase_count = ?
WHERE user_id = ?
"#,
        )
        .bind(&profile.login)
        .bind(&profile.name)
        .bind(&profile.last_name)
        .bind(&profile.phone_number)
        .bind(&profile.email)
        .bind(profile.wallet)
        .bind(profile.purchase_count)
        .bind(profile.key)
        .execute(tx.conn())
        .await
        .map_err(|e| map_sqlx("update user", e))?;

        Ok(())
    }

    async fn delete_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx)?;

        // purchase rows go with it (ON DELETE CASCADE)
        let res = sqlx::query("DELETE FROM user WHERE user_id = ?")
            .bind(key)
            .execute(tx.conn())
            .await
            .map_err(|e| map_sqlx("delete user", e))?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn id_exists(&self, key: StorageKey) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM user WHERE user_id = ?")
            .bind(key)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx("count user", e))?;

        Ok(count > 0)
    }

    async fn id_exists_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<bool, StoreError> {
        let tx = downcast(tx)?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM user WHERE user_id = ?")
            .bind(key)
            .fetch_one(tx.conn())
            .await
            .map_err(|e| map_sqlx("count user", e))?;

        Ok(count > 0)
    }

    async fn email_exists_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        email: &str,
    ) -> Result<bool, StoreError> {
        let tx = downcast(tx)?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM user WHERE email = ?")
            .bind(email)
            .fetch_one(tx.conn())
            .await
            .map_err(|e| map_sqlx("count email", e))?;

        Ok(count > 0)
    }

    async fn login_exists_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        login: &str,
    ) -> Result<bool, StoreError> {
        let tx = downcast(tx)?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM user WHERE login = ?")
            .bind(login)
            .fetch_one(tx.conn())
            .await
            .map_err(|e| map_sqlx("count login", e))?;

        Ok(count > 0)
    }

    async fn lock_wallet_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<Wallet, StoreError> {
        let tx = downcast(tx)?;

        let row = sqlx::query("SELECT wallet, purchase_count FROM user WHERE user_id = ? FOR UPDATE")
            .bind(key)
            .fetch_one(tx.conn())
            .await
            .map_err(|e| map_sqlx("lock wallet", e))?;

        Ok(Wallet {
            balance: row.try_get("wallet").map_err(|e| map_sqlx("decode wallet", e))?,
            purchase_count: row
                .try_get("purchase_count")
                .map_err(|e| map_sqlx("decode wallet", e))?,
        })
    }

    async fn debit_wallet_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
        amount: Decimal,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx)?;

        let res = sqlx::query(
            r#"
UPDATE user
SET wallet = wallet - ?, purchase_count = purchase_count + 1
WHERE user_id = ?
"#,
        )
        .bind(amount)
        .bind(key)
        .execute(tx.conn())
        .await
        .map_err(|e| map_sqlx("debit wallet", e))?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
