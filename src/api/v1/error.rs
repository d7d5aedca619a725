use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let (code, message) = if let Some(failure) = err.find::<ApiFailure>() {
        (failure.code, failure.message.clone())
    } else if err.is_not_found() {
        (ApiErrorCode::NotFound, "no such route".to_string())
    } else if let Some(e) = err.find::<warp::reject::MissingHeader>() {
        (ApiErrorCode::Unauthorized, e.to_string())
    } else if let Some(e) = err.find::<warp::body::BodyDeserializeError>() {
        (ApiErrorCode::BadRequest, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        (ApiErrorCode::BadRequest, e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (ApiErrorCode::MethodNotAllowed, "method not allowed".to_string())
    } else {
        warn!("unhandled rejection: {err:?}");
        (ApiErrorCode::InternalError, ApiErrorCode::InternalError.to_string())
    };

    let json = warp::reply::json(&ApiResponse::<()>::err(code, message));
    Ok(warp::reply::with_status(json, code.status()))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("Invalid request")]
    BadRequest,
    #[error("Invalid login or password")]
    InvalidCredentials,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Authorization required")]
    Unauthorized,
    #[error("Not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Conflict")]
    Conflict,
    #[error("Insufficient funds")]
    InsufficientFunds,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ApiErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::InvalidCredentials
            | ApiErrorCode::InvalidToken
            | ApiErrorCode::TokenExpired
            | ApiErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::Conflict => StatusCode::CONFLICT,
            ApiErrorCode::InsufficientFunds => StatusCode::UNPROCESSABLE_ENTITY,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A service error translated for the wire. Storage and internal details
/// stay in the log.
#[derive(Debug)]
pub struct ApiFailure {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiFailure {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiFailure {
            code,
            message: message.into(),
        }
    }

    pub fn bare(code: ApiErrorCode) -> Self {
        ApiFailure::new(code, code.to_string())
    }

    pub fn internal<E: std::fmt::Display>(error: E) -> Self {
        warn!("Internal error: {}", error);
        ApiFailure::bare(ApiErrorCode::InternalError)
    }
}

impl reject::Reject for ApiFailure {}

impl From<AuthError> for ApiFailure {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Validation(msg) => ApiFailure::new(ApiErrorCode::BadRequest, msg),
            AuthError::Conflict(msg) => ApiFailure::new(ApiErrorCode::Conflict, msg),
            AuthError::InvalidCredentials => ApiFailure::bare(ApiErrorCode::InvalidCredentials),
            AuthError::UserNotFound
            | AuthError::TokenInvalidSignature
            | AuthError::TokenMalformed => ApiFailure::bare(ApiErrorCode::InvalidToken),
            AuthError::TokenExpired => ApiFailure::bare(ApiErrorCode::TokenExpired),
            AuthError::RandomnessUnavailable(e)
            | AuthError::MalformedCredential(e)
            | AuthError::Store(e)
            | AuthError::InternalError(e) => ApiFailure::internal(e),
        }
    }
}

impl From<UserError> for ApiFailure {
    fn from(error: UserError) -> Self {
        match error {
            UserError::Validation(msg) => ApiFailure::new(ApiErrorCode::BadRequest, msg),
            UserError::Conflict(msg) => ApiFailure::new(ApiErrorCode::Conflict, msg),
            UserError::NotFound => ApiFailure::new(ApiErrorCode::NotFound, "user not found"),
            UserError::Store(e) => ApiFailure::internal(e),
        }
    }
}

impl From<ProductError> for ApiFailure {
    fn from(error: ProductError) -> Self {
        match error {
            ProductError::Validation(msg) => ApiFailure::new(ApiErrorCode::BadRequest, msg),
            ProductError::NotFound => ApiFailure::new(ApiErrorCode::NotFound, "product not found"),
            ProductError::InUse(e) => {
                warn!("product delete refused: {e}");
                ApiFailure::new(ApiErrorCode::Conflict, "product has purchases")
            }
            ProductError::Store(e) => ApiFailure::internal(e),
        }
    }
}

impl From<PurchaseError> for ApiFailure {
    fn from(error: PurchaseError) -> Self {
        match error {
            PurchaseError::Validation(msg) => ApiFailure::new(ApiErrorCode::BadRequest, msg),
            PurchaseError::UserNotFound => ApiFailure::new(ApiErrorCode::NotFound, "user not found"),
            PurchaseError::ProductNotFound => {
                ApiFailure::new(ApiErrorCode::NotFound, "product not found")
            }
            PurchaseError::PurchaseNotFound => {
                ApiFailure::new(ApiErrorCode::NotFound, "purchase not found")
            }
            e @ PurchaseError::InsufficientFunds { .. } => {
                ApiFailure::new(ApiErrorCode::InsufficientFunds, e.to_string())
            }
            PurchaseError::Store(e) => ApiFailure::internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_port::StoreError;
    use rust_decimal::Decimal;

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (ApiFailure::from(AuthError::Validation("x".into())), 400),
            (ApiFailure::from(AuthError::InvalidCredentials), 401),
            (ApiFailure::from(AuthError::TokenExpired), 401),
            (ApiFailure::from(UserError::NotFound), 404),
            (ApiFailure::from(AuthError::Conflict("email".into())), 409),
            (ApiFailure::from(ProductError::InUse("fk".into())), 409),
            (
                ApiFailure::from(PurchaseError::InsufficientFunds {
                    balance: Decimal::new(30, 0),
                    cost: Decimal::new(50, 0),
                }),
                422,
            ),
            (ApiFailure::from(PurchaseError::Store("db down".into())), 500),
        ];
        for (failure, status) in cases {
            assert_eq!(failure.code.status().as_u16(), status, "{failure:?}");
        }
    }

    #[test]
    fn storage_details_stay_off_the_wire() {
        let failure = ApiFailure::from(UserError::Store("insert user: secret dsn".into()));
        assert_eq!(failure.code, ApiErrorCode::InternalError);
        assert!(!failure.message.contains("dsn"));
    }

    #[test]
    fn duplicate_key_detail_stays_off_the_wire() {
        let raw = "insert user: error returned from database: 1062 (23000): \
                   Duplicate entry 'jane@example.com' for key 'user.uq_user_email'";

        let signup = ApiFailure::from(AuthError::from(StoreError::Duplicate(raw.into())));
        let update = ApiFailure::from(UserError::from(StoreError::Duplicate(raw.into())));
        for failure in [signup, update] {
            assert_eq!(failure.code, ApiErrorCode::Conflict);
            assert_eq!(failure.message, LOGIN_OR_EMAIL_IN_USE);
        }
    }
}
