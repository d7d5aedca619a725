use crate::domain_model::{PageRequest, User, UserId};
use super::LOGIN_OR_EMAIL_IN_USE;
use crate::domain_port::StoreError;
use rust_decimal::Decimal;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("user not found")]
    NotFound,
    #[error("store error: {0}")]
    Store(String),
}

impl From<StoreError> for UserError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => UserError::NotFound,
            StoreError::Duplicate(what) | StoreError::Referenced(what) => {
                // The driver message names the index and echoes the value.
                tracing::warn!("constraint rejected write: {what}");
                UserError::Conflict(LOGIN_OR_EMAIL_IN_USE.to_string())
            }
            StoreError::Backend(msg) => UserError::Store(msg),
        }
    }
}

/// Full profile replacement. `password` is validated like at signup but
/// never stored or re-hashed.
#[derive(Clone)]
pub struct UserUpdate {
    pub id: UserId,
    pub login: String,
    pub name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub password: String,
    pub wallet: Decimal,
    pub purchase_count: i64,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn get(&self, id: UserId) -> Result<User, UserError>;
    async fn get_by_email(&self, email: &str) -> Result<User, UserError>;
    async fn list(&self, page: Option<PageRequest>) -> Result<Vec<User>, UserError>;
    async fn update(&self, update: UserUpdate) -> Result<User, UserError>;
    async fn delete(&self, id: UserId) -> Result<(), UserError>;
}
