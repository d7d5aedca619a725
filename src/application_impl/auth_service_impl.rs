use super::validation::{validate_credentials, validate_email};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::{TxManager, UserRepo};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

pub struct RealAuthService {
    user_repo: Arc<dyn UserRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
    token_codec: Arc<dyn TokenCodec>,
    tx_manager: Arc<dyn TxManager>,
}

impl RealAuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
        token_codec: Arc<dyn TokenCodec>,
        tx_manager: Arc<dyn TxManager>,
    ) -> Self {
        Self {
            user_repo,
            credential_hasher,
            token_codec,
            tx_manager,
        }
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn signup(&self, request: NewUser) -> Result<User, AuthError> {
        let NewUser {
            login,
            name,
            last_name,
            phone_number,
            email,
            password,
        } = request;

        validate_credentials(&login, &password).map_err(AuthError::Validation)?;
        validate_email(&email).map_err(AuthError::Validation)?;

        // No transaction is open while the KDF runs.
        let credential = self.credential_hasher.hash_password(&password).await?;
        drop(password);

        let mut tx = self.tx_manager.begin().await?;

        if self.user_repo.email_exists_in_tx(&mut *tx, &email).await? {
            return Err(AuthError::Conflict("email already registered".to_string()));
        }
        if self.user_repo.login_exists_in_tx(&mut *tx, &login).await? {
            return Err(AuthError::Conflict("login already taken".to_string()));
        }

        let (id, key) = StorageKey::mint();
        let record = UserRecord {
            key,
            login,
            name,
            last_name,
            phone_number,
            email,
            password_hash: credential.digest_hex,
            password_salt: credential.salt_hex,
            wallet: Decimal::ZERO,
            purchase_count: 0,
            created_at: Utc::now(),
        };
        self.user_repo.create_in_tx(&mut *tx, &record).await?;

        tx.commit().await?;

        info!(user_id = id, login = %record.login, "user signed up");
        Ok(User::from(record))
    }

    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError> {
        let LoginInput { login, password } = request;
        if login.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let rec = self
            .user_repo
            .get_by_login(&login)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let ok = match self
            .credential_hasher
            .verify_password(&password, &rec.password_hash, &rec.password_salt)
            .await
        {
            Ok(ok) => ok,
            Err(AuthError::MalformedCredential(e)) => {
                warn!(login = %login, "stored credential unreadable: {e}");
                false
            }
            Err(e) => return Err(e),
        };
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        // Only keys minted by this service carry an exact id a token can name.
        let user_id = rec.key.public_id().map(UserId).ok_or_else(|| {
            AuthError::InternalError(format!("user key {} has no public id", rec.key))
        })?;

        let (access_token, expires_at) = self.token_codec.issue_access_token(user_id).await?;

        info!(%user_id, "login succeeded");
        Ok(LoginResult {
            user_id,
            access_token,
            expires_at,
        })
    }

    async fn verify_token(&self, token: &str) -> Result<UserId, AuthError> {
        let user_id = self
            .token_codec
            .verify_access_token(&AccessToken(token.to_string()))
            .await?;

        if !self.user_repo.id_exists(user_id.key()).await? {
            return Err(AuthError::UserNotFound);
        }

        Ok(user_id)
    }
}
