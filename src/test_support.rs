use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::{TxManager, UserRepo};
use crate::infra_memory::*;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

pub const TEST_SIGNING_KEY: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        issuer: "storefront-test".to_string(),
        audience: "storefront-api".to_string(),
        access_ttl: std::time::Duration::from_secs(3600),
        signing_key: SigningKey::new(TEST_SIGNING_KEY.to_vec()).unwrap(),
    }
}

/// Services wired over a fresh in-memory store.
pub struct TestContext {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserService>,
    pub products: Arc<dyn ProductService>,
    pub purchases: Arc<dyn PurchaseService>,
    pub user_repo: Arc<dyn UserRepo>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_hasher(Arc::new(Sha256CredentialHasher))
    }

    pub fn with_hasher(credential_hasher: Arc<dyn CredentialHasher>) -> Self {
        let store = MemoryStore::new();
        let tx_manager: Arc<dyn TxManager> = Arc::new(MemoryTxManager::new(store.clone()));
        let user_repo: Arc<dyn UserRepo> = Arc::new(MemoryUserRepo::new(store.clone()));
        let product_repo = Arc::new(MemoryProductRepo::new(store.clone()));
        let purchase_repo = Arc::new(MemoryPurchaseRepo::new(store));

        let auth = Arc::new(RealAuthService::new(
            user_repo.clone(),
            credential_hasher,
            Arc::new(JwtHs256Codec::new(test_jwt_config())),
            tx_manager.clone(),
        ));
        let users = Arc::new(RealUserService::new(user_repo.clone(), tx_manager.clone()));
        let products = Arc::new(RealProductService::new(
            product_repo.clone(),
            tx_manager.clone(),
        ));
        let purchases = Arc::new(RealPurchaseService::new(
            purchase_repo,
            user_repo.clone(),
            product_repo,
            tx_manager,
        ));

        TestContext {
            auth,
            users,
            products,
            purchases,
            user_repo,
        }
    }

    /// Signs up `login` and sets the wallet to `balance`.
    pub async fn funded_user(&self, login: &str, balance: Decimal) -> anyhow::Result<UserId> {
        let user = self
            .auth
            .signup(new_user(login, &format!("{login}@example.com")))
            .await?;
        self.users
            .update(UserUpdate {
                id: UserId(user.id),
                login: user.login,
                name: user.name,
                last_name: user.last_name,
                phone_number: user.phone_number,
                email: user.email,
                password: "secret-pw".to_string(),
                wallet: balance,
                purchase_count: user.purchase_count,
            })
            .await?;
        Ok(UserId(user.id))
    }
}

/// Signup payload with password `secret-pw`.
pub fn new_user(login: &str, email: &str) -> NewUser {
    NewUser {
        login: login.to_string(),
        name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        phone_number: "+15550100".to_string(),
        email: email.to_string(),
        password: "secret-pw".to_string(),
    }
}

/// Product costing `cost` whole units.
pub fn new_product(name: &str, cost: i64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        cost: Decimal::new(cost, 0),
        quantity_stock: 10,
        guarantees: Utc::now() + Duration::days(365),
        country: "PT".to_string(),
    }
}
