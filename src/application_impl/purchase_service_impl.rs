use crate::application_port::{PurchaseError, PurchaseService, PurchaseUpdate};
use crate::domain_model::*;
use crate::domain_port::{ProductRepo, PurchaseRepo, StoreError, TxManager, UserRepo};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

pub struct RealPurchaseService {
    purchase_repo: Arc<dyn PurchaseRepo>,
    user_repo: Arc<dyn UserRepo>,
    product_repo: Arc<dyn ProductRepo>,
    tx_manager: Arc<dyn TxManager>,
}

impl RealPurchaseService {
    pub fn new(
        purchase_repo: Arc<dyn PurchaseRepo>,
        user_repo: Arc<dyn UserRepo>,
        product_repo: Arc<dyn ProductRepo>,
        tx_manager: Arc<dyn TxManager>,
    ) -> Self {
        RealPurchaseService {
            purchase_repo,
            user_repo,
            product_repo,
            tx_manager,
        }
    }
}

/// Re-labels a repository miss as the given domain error.
fn missing_as(err: PurchaseError) -> impl FnOnce(StoreError) -> PurchaseError {
    move |e| match e {
        StoreError::NotFound => err,
        other => other.into(),
    }
}

#[async_trait::async_trait]
impl PurchaseService for RealPurchaseService {
    async fn create(
        &self,
        purchaser: UserId,
        product: ProductId,
    ) -> Result<Purchase, PurchaseError> {
        let user_key = purchaser.key();
        let product_key = product.key();

        let mut tx = self.tx_manager.begin().await?;

        // Held until commit or rollback, so concurrent settlements on the
        // same wallet queue up here.
        let wallet = self
            .user_repo
            .lock_wallet_in_tx(&mut *tx, user_key)
            .await
            .map_err(missing_as(PurchaseError::UserNotFound))?;

        let cost = self
            .product_repo
            .get_cost_in_tx(&mut *tx, product_key)
            .await
            .map_err(missing_as(PurchaseError::ProductNotFound))?;

        if wallet.balance < cost {
            tx.rollback().await?;
            warn!(user_id = %purchaser, product_id = %product, %cost, "insufficient funds");
            return Err(PurchaseError::InsufficientFunds {
                balance: wallet.balance,
                cost,
            });
        }

        self.user_repo
            .debit_wallet_in_tx(&mut *tx, user_key, cost)
            .await?;

        let (id, key) = StorageKey::mint();
        let record = PurchaseRecord {
            key,
            user_key,
            product_key,
            created_at: Utc::now(),
            wallet_snapshot: wallet.balance - cost,
            cost,
        };
        self.purchase_repo.create_in_tx(&mut *tx, &record).await?;

        tx.commit().await?;

        info!(
            purchase_id = id,
            user_id = %purchaser,
            product_id = %product,
            %cost,
            "purchase settled"
        );
        Ok(Purchase::from(record))
    }

    async fn get(&self, id: PurchaseId) -> Result<Purchase, PurchaseError> {
        let rec = self.purchase_repo.get(id.key()).await?;
        Ok(Purchase::from(rec))
    }

    async fn list(&self, page: Option<PageRequest>) -> Result<Vec<Purchase>, PurchaseError> {
        let rows = self.purchase_repo.list(page).await?;
        Ok(rows.into_iter().map(Purchase::from).collect())
    }

    async fn update(&self, update: PurchaseUpdate) -> Result<Purchase, PurchaseError> {
        if update.cost.is_sign_negative() {
            return Err(PurchaseError::Validation(
                "cost must not be negative".to_string(),
            ));
        }

        let key = update.id.key();
        let amendment = PurchaseAmendment {
            product_key: update.product_id.key(),
            created_at: update.created_at,
            wallet_snapshot: update.wallet_snapshot,
            cost: update.cost,
        };

        let mut tx = self.tx_manager.begin().await?;

        if !self.purchase_repo.id_exists_in_tx(&mut *tx, key).await? {
            return Err(PurchaseError::PurchaseNotFound);
        }
        if !self
            .product_repo
            .id_exists_in_tx(&mut *tx, amendment.product_key)
            .await?
        {
            return Err(PurchaseError::ProductNotFound);
        }
        self.purchase_repo
            .update_in_tx(&mut *tx, key, &amendment)
            .await?;

        tx.commit().await?;

        info!(purchase_id = %update.id, "purchase amended");
        self.get(update.id).await
    }

    async fn delete(&self, id: PurchaseId) -> Result<(), PurchaseError> {
        let mut tx = self.tx_manager.begin().await?;

        if !self.purchase_repo.id_exists_in_tx(&mut *tx, id.key()).await? {
            return Err(PurchaseError::PurchaseNotFound);
        }
        self.purchase_repo.delete_in_tx(&mut *tx, id.key()).await?;

        tx.commit().await?;

        info!(purchase_id = %id, "purchase deleted");
        Ok(())
    }
}
