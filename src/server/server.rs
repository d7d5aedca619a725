use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::settings::{HasherKind, Settings, StorageBackend};
use anyhow::anyhow;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use std::time::Duration;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub product_service: Arc<dyn ProductService>,
    pub purchase_service: Arc<dyn PurchaseService>,
    pool: Option<Pool<MySql>>,
}

struct Storage {
    user_repo: Arc<dyn UserRepo>,
    product_repo: Arc<dyn ProductRepo>,
    purchase_repo: Arc<dyn PurchaseRepo>,
    tx_manager: Arc<dyn TxManager>,
    pool: Option<Pool<MySql>>,
}

impl Storage {
    fn memory() -> Self {
        let store = MemoryStore::new();
        Storage {
            user_repo: Arc::new(MemoryUserRepo::new(store.clone())),
            product_repo: Arc::new(MemoryProductRepo::new(store.clone())),
            purchase_repo: Arc::new(MemoryPurchaseRepo::new(store.clone())),
            tx_manager: Arc::new(MemoryTxManager::new(store)),
            pool: None,
        }
    }

    async fn mysql(dsn: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect(dsn)
            .await?;
        Ok(Storage {
            user_repo: Arc::new(MySqlUserRepo::new(pool.clone())),
            product_repo: Arc::new(MySqlProductRepo::new(pool.clone())),
            purchase_repo: Arc::new(MySqlPurchaseRepo::new(pool.clone())),
            tx_manager: Arc::new(MySqlTxManager::new(pool.clone())),
            pool: Some(pool),
        })
    }
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let secret = std::env::var(&settings.auth.signing_key_env).map_err(|_| {
            anyhow!(
                "signing key variable {} is not set",
                settings.auth.signing_key_env
            )
        })?;
        let signing_key = SigningKey::new(secret.into_bytes()).map_err(|e| anyhow!(e))?;

        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: settings.auth.issuer.clone(),
            audience: settings.auth.audience.clone(),
            access_ttl: Duration::from_secs(settings.auth.token_ttl_secs),
            signing_key,
        }));

        let credential_hasher: Arc<dyn CredentialHasher> = match settings.auth.hasher {
            HasherKind::Argon2 => Arc::new(Argon2CredentialHasher),
            HasherKind::Sha256 => {
                warn!("legacy sha256 credential hasher selected");
                Arc::new(Sha256CredentialHasher)
            }
        };

        let storage = match settings.storage.backend {
            StorageBackend::Memory => Storage::memory(),
            StorageBackend::Mysql => {
                Storage::mysql(&settings.storage.dsn, settings.storage.max_connections).await?
            }
        };

        info!(backend = ?settings.storage.backend, hasher = ?settings.auth.hasher, "server started");
        Ok(Self::assemble(storage, credential_hasher, token_codec))
    }

    /// All services over a fresh in-memory store.
    pub fn in_memory(credential_hasher: Arc<dyn CredentialHasher>, jwt: JwtConfig) -> Self {
        Self::assemble(
            Storage::memory(),
            credential_hasher,
            Arc::new(JwtHs256Codec::new(jwt)),
        )
    }

    fn assemble(
        storage: Storage,
        credential_hasher: Arc<dyn CredentialHasher>,
        token_codec: Arc<dyn TokenCodec>,
    ) -> Self {
        let Storage {
            user_repo,
            product_repo,
            purchase_repo,
            tx_manager,
            pool,
        } = storage;

        let auth_service = Arc::new(RealAuthService::new(
            user_repo.clone(),
            credential_hasher,
            token_codec,
            tx_manager.clone(),
        ));
        let user_service = Arc::new(RealUserService::new(user_repo.clone(), tx_manager.clone()));
        let product_service = Arc::new(RealProductService::new(
            product_repo.clone(),
            tx_manager.clone(),
        ));
        let purchase_service = Arc::new(RealPurchaseService::new(
            purchase_repo,
            user_repo,
            product_repo,
            tx_manager,
        ));

        Self {
            auth_service,
            user_service,
            product_service,
            purchase_service,
            pool,
        }
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
