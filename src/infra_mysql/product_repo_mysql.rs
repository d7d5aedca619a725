use super::util::{downcast, map_sqlx};
use crate::domain_model::*;
use crate::domain_port::*;
use rust_decimal::Decimal;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlProductRepo {
    pool: MySqlPool,
}

impl MySqlProductRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlProductRepo { pool }
    }
}

const PRODUCT_COLUMNS: &str =
    "product_id, name, cost, quantity_stock, guarantees, country, likes";

fn product_from_row(row: &MySqlRow) -> Result<ProductRecord, sqlx::Error> {
    Ok(ProductRecord {
        key: row.try_get("product_id")?,
        name: row.try_get("name")?,
        cost: row.try_get("cost")?,
        quantity_stock: row.try_get("quantity_stock")?,
        guarantees: row.try_get("guarantees")?,
        country: row.try_get("country")?,
        likes: row.try_get("likes")?,
    })
}

fn products_from_rows(rows: &[MySqlRow]) -> Result<Vec<ProductRecord>, StoreError> {
    rows.iter()
        .map(product_from_row)
        .collect::<Result<_, _>>()
        .map_err(|e| map_sqlx("decode product", e))
}

#[async_trait::async_trait]
impl ProductRepo for MySqlProductRepo {
    async fn create_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        product: &ProductRecord,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx)?;

        sqlx::query(
            r#"
INSERT INTO product (product_id, name, cost, quantity_stock, guarantees, country, likes)
VALUES (?, ?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(product.key)
        .bind(&product.name)
        .bind(product.cost)
        .bind(product.quantity_stock)
        .bind(product.guarantees)
        .bind(&product.country)
        .bind(product.likes)
        .execute(tx.conn())
        .await
        .map_err(|e| map_sqlx("insert product", e))?;

        Ok(())
    }

    async fn get(&self, key: StorageKey) -> Result<ProductRecord, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE product_id = ?"
        ))
        .bind(key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx("query product", e))?;

        product_from_row(&row).map_err(|e| map_sqlx("decode product", e))
    }

    async fn list(&self, page: Option<PageRequest>) -> Result<Vec<ProductRecord>, StoreError> {
        let rows = match page {
            Some(page) => {
                sqlx::query(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM product ORDER BY name, product_id LIMIT ? OFFSET ?"
                ))
                .bind(page.limit)
                .bind(page.offset)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM product ORDER BY name, product_id"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| map_sqlx("list products", e))?;

        products_from_rows(&rows)
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<ProductRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE name = ? ORDER BY name, product_id"
        ))
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx("query products by name", e))?;

        products_from_rows(&rows)
    }

    async fn update_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        product: &ProductRecord,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx)?;

        sqlx::query(
            r#"
UPDATE product
SET name = ?, cost = ?, quantity_stock = ?, guarantees = ?, country = ?
WHERE product_id = ?
"#,
        )
        .bind(&product.name)
        .bind(product.cost)
        .bind(product.quantity_stock)
        .bind(product.guarantees)
        .bind(&product.country)
        .bind(product.key)
        .execute(tx.conn())
        .await
        .map_err(|e| map_sqlx("update product", e))?;

        Ok(())
    }

    async fn delete_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx)?;

        let res = sqlx::query("DELETE FROM product WHERE product_id = ?")
            .bind(key)
            .execute(tx.conn())
            .await
            .map_err(|e| map_sqlx("delete product", e))?;

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

        let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM product WHERE product_id = ?")
            .bind(key)
            .fetch_one(tx.conn())
            .await
            .map_err(|e| map_sqlx("count product", e))?;

        Ok(count > 0)
    }

    async fn get_cost_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<Decimal, StoreError> {
        let tx = downcast(tx)?;

        sqlx::query_scalar("SELECT cost FROM product WHERE product_id = ?")
            .bind(key)
            .fetch_one(tx.conn())
            .await
            .map_err(|e| map_sqlx("query product cost", e))
    }

    async fn add_like_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx)?;

        let res = sqlx::query("UPDATE product SET likes = likes + 1 WHERE product_id = ?")
            .bind(key)
            .execute(tx.conn())
            .await
            .map_err(|e| map_sqlx("add like", e))?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn remove_like_in_tx(
        &self,
        tx: &mut dyn StorageTx,
        key: StorageKey,
    ) -> Result<(), StoreError> {
        let tx = downcast(tx)?;

        // zero rows affected is fine here: the counter was already at 0
        sqlx::query("UPDATE product SET likes = likes - 1 WHERE product_id = ? AND likes > 0")
            .bind(key)
            .execute(tx.conn())
            .await
            .map_err(|e| map_sqlx("remove like", e))?;

        Ok(())
    }
}
