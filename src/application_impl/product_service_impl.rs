use super::validation::validate_non_negative;
use crate::application_port::{NewProduct, ProductError, ProductService, ProductUpdate};
use crate::domain_model::*;
use crate::domain_port::{ProductRepo, TxManager};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

pub struct RealProductService {
    product_repo: Arc<dyn ProductRepo>,
    tx_manager: Arc<dyn TxManager>,
}

impl RealProductService {
    pub fn new(product_repo: Arc<dyn ProductRepo>, tx_manager: Arc<dyn TxManager>) -> Self {
        RealProductService {
            product_repo,
            tx_manager,
        }
    }
}

fn validate_product(name: &str, cost: Decimal, quantity_stock: i32) -> Result<(), ProductError> {
    if name.trim().is_empty() {
        return Err(ProductError::Validation("name is required".to_string()));
    }
    validate_non_negative("cost", cost).map_err(ProductError::Validation)?;
    if quantity_stock < 0 {
        return Err(ProductError::Validation(
            "quantity_stock must not be negative".to_string(),
        ));
    }
    Ok(())
}

#[async_trait::async_trait]
impl ProductService for RealProductService {
    async fn create(&self, product: NewProduct) -> Result<Product, ProductError> {
        validate_product(&product.name, product.cost, product.quantity_stock)?;

        let (id, key) = StorageKey::mint();
        let record = ProductRecord {
            key,
            name: product.name,
            cost: product.cost,
            quantity_stock: product.quantity_stock,
            guarantees: product.guarantees,
            country: product.country,
            likes: 0,
        };

        let mut tx = self.tx_manager.begin().await?;
        self.product_repo.create_in_tx(&mut *tx, &record).await?;
        tx.commit().await?;

        info!(product_id = id, name = %record.name, "product created");
        Ok(Product::from(record))
    }

    async fn get(&self, id: ProductId) -> Result<Product, ProductError> {
        let rec = self.product_repo.get(id.key()).await?;
        Ok(Product::from(rec))
    }

    async fn list(&self, page: Option<PageRequest>) -> Result<Vec<Product>, ProductError> {
        let rows = self.product_repo.list(page).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Product>, ProductError> {
        let rows = self.product_repo.find_by_name(name).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn update(&self, update: ProductUpdate) -> Result<Product, ProductError> {
        validate_product(&update.name, update.cost, update.quantity_stock)?;

        let record = ProductRecord {
            key: update.id.key(),
            name: update.name,
            cost: update.cost,
            quantity_stock: update.quantity_stock,
            guarantees: update.guarantees,
            country: update.country,
            likes: 0, // not written
        };

        let mut tx = self.tx_manager.begin().await?;

        if !self.product_repo.id_exists_in_tx(&mut *tx, record.key).await? {
            return Err(ProductError::NotFound);
        }
        self.product_repo.update_in_tx(&mut *tx, &record).await?;

        tx.commit().await?;

        info!(product_id = %update.id, "product updated");
        self.get(update.id).await
    }

    async fn delete(&self, id: ProductId) -> Result<(), ProductError> {
        let mut tx = self.tx_manager.begin().await?;

        if !self.product_repo.id_exists_in_tx(&mut *tx, id.key()).await? {
            return Err(ProductError::NotFound);
        }
        self.product_repo.delete_in_tx(&mut *tx, id.key()).await?;

        tx.commit().await?;

        info!(product_id = %id, "product deleted");
        Ok(())
    }

    async fn add_like(&self, id: ProductId) -> Result<(), ProductError> {
        let mut tx = self.tx_manager.begin().await?;

        if !self.product_repo.id_exists_in_tx(&mut *tx, id.key()).await? {
            return Err(ProductError::NotFound);
        }
        self.product_repo.add_like_in_tx(&mut *tx, id.key()).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn remove_like(&self, id: ProductId) -> Result<(), ProductError> {
        let mut tx = self.tx_manager.begin().await?;

        if !self.product_repo.id_exists_in_tx(&mut *tx, id.key()).await? {
            return Err(ProductError::NotFound);
        }
        self.product_repo.remove_like_in_tx(&mut *tx, id.key()).await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::application_port::*;
    use crate::domain_model::*;
    use crate::test_support::{TestContext, new_product};
    use rust_decimal::Decimal;
    use testresult::TestResult;

    #[tokio::test]
    async fn create_then_get() -> TestResult {
        let ctx = TestContext::new();
        let created = ctx.products.create(new_product("kettle", 25)).await?;

        assert_eq!(created.likes, 0);
        assert_eq!(ctx.products.get(ProductId(created.id)).await?, created);
        Ok(())
    }

    #[tokio::test]
    async fn create_validates_fields() {
        let ctx = TestContext::new();

        let res = ctx.products.create(new_product("  ", 1)).await;
        assert!(matches!(res, Err(ProductError::Validation(_))));

        let res = ctx.products.create(new_product("kettle", -1)).await;
        assert!(matches!(res, Err(ProductError::Validation(_))));

        let mut no_stock = new_product("kettle", 1);
        no_stock.quantity_stock = -3;
        let res = ctx.products.create(no_stock).await;
        assert!(matches!(res, Err(ProductError::Validation(_))));
    }

    #[tokio::test]
    async fn find_by_name_and_list() -> TestResult {
        let ctx = TestContext::new();
        ctx.products.create(new_product("toaster", 30)).await?;
        ctx.products.create(new_product("kettle", 25)).await?;
        ctx.products.create(new_product("kettle", 40)).await?;

        let kettles = ctx.products.find_by_name("kettle").await?;
        assert_eq!(kettles.len(), 2);
        assert!(ctx.products.find_by_name("fridge").await?.is_empty());

        let all = ctx.products.list(None).await?;
        let names: Vec<&str> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["kettle", "kettle", "toaster"]);
        Ok(())
    }

    #[tokio::test]
    async fn update_keeps_likes() -> TestResult {
        let ctx = TestContext::new();
        let created = ctx.products.create(new_product("kettle", 25)).await?;
        let id = ProductId(created.id);
        ctx.products.add_like(id).await?;

        let updated = ctx
            .products
            .update(ProductUpdate {
                id,
                name: "kettle pro".to_string(),
                cost: Decimal::new(35, 0),
                quantity_stock: created.quantity_stock,
                guarantees: created.guarantees,
                country: created.country.clone(),
            })
            .await?;
        assert_eq!(updated.name, "kettle pro");
        assert_eq!(updated.cost, Decimal::new(35, 0));
        assert_eq!(updated.likes, 1);
        Ok(())
    }

    #[tokio::test]
    async fn likes_never_go_negative() -> TestResult {
        let ctx = TestContext::new();
        let id = ProductId(ctx.products.create(new_product("kettle", 25)).await?.id);

        ctx.products.add_like(id).await?;
        ctx.products.add_like(id).await?;
        assert_eq!(ctx.products.get(id).await?.likes, 2);

        for _ in 0..3 {
            ctx.products.remove_like(id).await?;
        }
        assert_eq!(ctx.products.get(id).await?.likes, 0);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_products_are_not_found() {
        let ctx = TestContext::new();
        let ghost = ProductId(424_242);

        assert!(matches!(ctx.products.get(ghost).await, Err(ProductError::NotFound)));
        assert!(matches!(ctx.products.add_like(ghost).await, Err(ProductError::NotFound)));
        assert!(matches!(ctx.products.remove_like(ghost).await, Err(ProductError::NotFound)));
        assert!(matches!(ctx.products.delete(ghost).await, Err(ProductError::NotFound)));
    }

    #[tokio::test]
    async fn purchased_products_cannot_be_deleted() -> TestResult {
        let ctx = TestContext::new();
        let buyer = ctx.funded_user("jane", Decimal::new(100, 0)).await?;
        let product = ctx.products.create(new_product("kettle", 25)).await?;
        ctx.purchases.create(buyer, ProductId(product.id)).await?;

        let res = ctx.products.delete(ProductId(product.id)).await;
        assert!(matches!(res, Err(ProductError::InUse(_))));
        Ok(())
    }
}
