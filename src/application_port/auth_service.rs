use crate::domain_model::{User, UserId};
use crate::domain_port::StoreError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Client-facing text for a unique-index violation on login or email.
pub const LOGIN_OR_EMAIL_IN_USE: &str = "email or login already in use";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user not found")]
    UserNotFound,
    #[error("token signature invalid")]
    TokenInvalidSignature,
    #[error("token expired")]
    TokenExpired,
    #[error("token malformed")]
    TokenMalformed,
    #[error("randomness unavailable: {0}")]
    RandomnessUnavailable(String),
    #[error("malformed stored credential: {0}")]
    MalformedCredential(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => AuthError::UserNotFound,
            StoreError::Duplicate(what) | StoreError::Referenced(what) => {
                // The driver message names the index and echoes the value.
                tracing::warn!("constraint rejected write: {what}");
                AuthError::Conflict(LOGIN_OR_EMAIL_IN_USE.to_string())
            }
            StoreError::Backend(msg) => AuthError::Store(msg),
        }
    }
}

/// Signup candidate. Consumed by [`AuthService::signup`]; the plaintext
/// password does not outlive the call.
#[derive(Clone)]
pub struct NewUser {
    pub login: String,
    pub name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("login", &self.login)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct LoginInput {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user_id: UserId,
    pub access_token: AccessToken,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct AccessToken(pub String);

/// Hex-encoded digest and salt stored on the user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordCredential {
    pub digest_hex: String,
    pub salt_hex: String,
}

#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    async fn issue_access_token(
        &self,
        user: UserId,
    ) -> Result<(AccessToken, DateTime<Utc>), AuthError>;
    async fn verify_access_token(&self, token: &AccessToken) -> Result<UserId, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Salt with fresh CSPRNG bytes and digest `password`.
    async fn hash_password(&self, password: &str) -> Result<PasswordCredential, AuthError>;
    /// Recompute with the stored salt and compare in constant time.
    async fn verify_password(
        &self,
        password: &str,
        digest_hex: &str,
        salt_hex: &str,
    ) -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn signup(&self, request: NewUser) -> Result<User, AuthError>;
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError>;
    async fn verify_token(&self, token: &str) -> Result<UserId, AuthError>;
}
