use super::util::{downcast, map_sqlx};
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlPurchaseRepo {
    pool: MySqlPool,
}

impl MySqlPurchaseRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlPurchaseRepo { pool }
    }
}

const PURCHASE_COLUMNS: &str =
    "purchase_id, user_id, product_id, created_at, wallet_snapshot, cost";

fn purchase_from_row(row: &MySqlRow) -> Result<PurchaseRecord, sqlx::Error> {
    Ok(PurchaseRecord {
        key: row.try_get("purchase_id")?,
        user_key: row.try_get("user_id")?,
        product_key: row.try_get("product_id")?,
        created_at: row.try_get("created_at")?,
        wallet_snapshot: row.try_get("wallet_snapshot")?,
        cost: row.try_get("cost")?,
    })
}

#[async_trait::async_trait]
impl PurchaseRepo for MySqlPurchaseRepo {
    async fn create_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        purchase: &PurchaseRecord,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx)?;

        sqlx::query(
            r#"
INSERT INTO purchase (purchase_id, user_id, product_id, created_at, wallet_snapshot, cost)
VALUES (?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(purchase.key)
        .bind(purchase.user_key)
        .bind(purchase.product_key)
        .bind(purchase.created_at)
        .bind(purchase.wallet_snapshot)
        .bind(purchase.cost)
        .execute(tx.conn())
        .await
        .map_err(|e| map_sqlx("insert purchase", e))?;

        Ok(())
    }

    async fn get(&self, key: StorageKey) -> Result<PurchaseRecord, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchase WHERE purchase_id = ?"
        ))
        .bind(key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx("query purchase", e))?;

        purchase_from_row(&row).map_err(|e| map_sqlx("decode purchase", e))
    }

    async fn list(&self, page: Option<PageRequest>) -> Result<Vec<PurchaseRecord>, StoreError> {
        let rows = match page {
            Some(page) => {
                sqlx::query(&format!(
                    "SELECT {PURCHASE_COLUMNS} FROM purchase \
                     ORDER BY created_at, purchase_id LIMIT ? OFFSET ?"
                ))
                .bind(page.limit)
                .bind(page.offset)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {PURCHASE_COLUMNS} FROM purchase ORDER BY created_at, purchase_id"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| map_sqlx("list purchases", e))?;

        rows.iter()
            .map(purchase_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx("decode purchase", e))
    }

    async fn update_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
        amendment: &PurchaseAmendment,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx)?;

        sqlx::query(
            r#"
UPDATE purchase
SET product_id = ?, created_at = ?, wallet_snapshot = ?, cost = ?
WHERE purchase_id = ?
"#,
        )
        .bind(amendment.product_key)
        .bind(amendment.created_at)
        .bind(amendment.wallet_snapshot)
        .bind(amendment.cost)
        .bind(key)
        .execute(tx.conn())
        .await
        .map_err(|e| map_sqlx("update purchase", e))?;

        Ok(())
    }

    async fn delete_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx)?;

        let res = sqlx::query("DELETE FROM purchase WHERE purchase_id = ?")
            .bind(key)
            .execute(tx.conn())
            .await
            .map_err(|e| map_sqlx("delete purchase", e))?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn id_exists_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<bool, StoreError> {
        let tx = downcast(tx)?;

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM purchase WHERE purchase_id = ?")
                .bind(key)
                .fetch_one(tx.conn())
                .await
                .map_err(|e| map_sqlx("count purchase", e))?;

        Ok(count > 0)
    }
}
