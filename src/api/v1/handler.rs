use super::error::*;
use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        ApiResponse {
            success: false,
            message: message.clone(),
            data: None,
            error: Some(ApiError { code, message }),
        }
    }
}

fn reply<T: Serialize>(
    status: StatusCode,
    data: T,
    message: &str,
) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(&ApiResponse::ok(data, message)), status)
}

/// `?offset=&limit=`; both absent means everything.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl ListQuery {
    fn page(&self) -> Result<Option<PageRequest>, ApiFailure> {
        match (self.offset, self.limit) {
            (None, None) => Ok(None),
            (offset, limit) => {
                let limit = limit.unwrap_or(MAX_PAGE_LIMIT);
                PageRequest::new(offset.unwrap_or(0), limit)
                    .map(Some)
                    .ok_or_else(|| {
                        ApiFailure::new(
                            ApiErrorCode::BadRequest,
                            format!("limit must be between 1 and {MAX_PAGE_LIMIT}"),
                        )
                    })
            }
        }
    }
}

// ---- users ----

#[derive(Deserialize)]
pub struct SignupRequest {
    pub login: String,
    pub name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub password: String,
}

pub async fn signup(
    body: SignupRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let new_user = NewUser {
        login: body.login,
        name: body.name,
        last_name: body.last_name,
        phone_number: body.phone_number,
        email: body.email,
        password: body.password,
    };
    let user = auth_service
        .signup(new_user)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;

    Ok(reply(StatusCode::CREATED, user, "user created"))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: UserId,
    pub access_token: AccessToken,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

pub async fn login(
    body: LoginRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let login_input = LoginInput {
        login: body.login,
        password: body.password,
    };
    let login_result = auth_service
        .login(login_input)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;

    let response = LoginResponse {
        user_id: login_result.user_id,
        access_token: login_result.access_token,
        token_type: "Bearer",
        expires_at: login_result.expires_at,
    };
    Ok(reply(StatusCode::OK, response, "logged in"))
}

pub async fn list_users(
    query: ListQuery,
    _caller: UserId,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    // ?email= narrows the listing to that one account
    let users = match &query.email {
        Some(email) => vec![
            user_service
                .get_by_email(email)
                .await
                .map_err(ApiFailure::from)
                .map_err(reject::custom)?,
        ],
        None => {
            let page = query.page().map_err(reject::custom)?;
            user_service
                .list(page)
                .await
                .map_err(ApiFailure::from)
                .map_err(reject::custom)?
        }
    };
    Ok(reply(StatusCode::OK, users, "users"))
}

pub async fn get_user(
    id: u64,
    _caller: UserId,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user = user_service
        .get(UserId(id))
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(reply(StatusCode::OK, user, "user"))
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub login: String,
    pub name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    pub password: String,
    pub wallet: Decimal,
    pub purchase_count: i64,
}

pub async fn update_user(
    id: u64,
    _caller: UserId,
    body: UpdateUserRequest,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let update = UserUpdate {
        id: UserId(id),
        login: body.login,
        name: body.name,
        last_name: body.last_name,
        phone_number: body.phone_number,
        email: body.email,
        password: body.password,
        wallet: body.wallet,
        purchase_count: body.purchase_count,
    };
    let user = user_service
        .update(update)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(reply(StatusCode::OK, user, "user updated"))
}

pub async fn delete_user(
    id: u64,
    _caller: UserId,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    user_service
        .delete(UserId(id))
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(reply(StatusCode::OK, (), "user deleted"))
}

// ---- products ----

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub cost: Decimal,
    pub quantity_stock: i32,
    pub guarantees: DateTime<Utc>,
    pub country: String,
}

pub async fn create_product(
    _caller: UserId,
    body: ProductRequest,
    product_service: Arc<dyn ProductService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let product = product_service
        .create(NewProduct {
            name: body.name,
            cost: body.cost,
            quantity_stock: body.quantity_stock,
            guarantees: body.guarantees,
            country: body.country,
        })
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(reply(StatusCode::CREATED, product, "product created"))
}

pub async fn list_products(
    query: ListQuery,
    _caller: UserId,
    product_service: Arc<dyn ProductService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let products = match &query.name {
        Some(name) => product_service.find_by_name(name).await,
        None => {
            let page = query.page().map_err(reject::custom)?;
            product_service.list(page).await
        }
    }
    .map_err(ApiFailure::from)
    .map_err(reject::custom)?;
    Ok(reply(StatusCode::OK, products, "products"))
}

pub async fn get_product(
    id: u64,
    _caller: UserId,
    product_service: Arc<dyn ProductService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let product = product_service
        .get(ProductId(id))
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(reply(StatusCode::OK, product, "product"))
}

pub async fn update_product(
    id: u64,
    _caller: UserId,
    body: ProductRequest,
    product_service: Arc<dyn ProductService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let product = product_service
        .update(ProductUpdate {
            id: ProductId(id),
            name: body.name,
            cost: body.cost,
            quantity_stock: body.quantity_stock,
            guarantees: body.guarantees,
            country: body.country,
        })
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(reply(StatusCode::OK, product, "product updated"))
}

pub async fn delete_product(
    id: u64,
    _caller: UserId,
    product_service: Arc<dyn ProductService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    product_service
        .delete(ProductId(id))
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(reply(StatusCode::OK, (), "product deleted"))
}

pub async fn like_product(
    id: u64,
    _caller: UserId,
    product_service: Arc<dyn ProductService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    product_service
        .add_like(ProductId(id))
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(reply(StatusCode::OK, (), "like added"))
}

pub async fn unlike_product(
    id: u64,
    _caller: UserId,
    product_service: Arc<dyn ProductService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    product_service
        .remove_like(ProductId(id))
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(reply(StatusCode::OK, (), "like removed"))
}

// ---- purchases ----

#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub product_id: u64,
}

/// The purchaser is always the token subject.
pub async fn create_purchase(
    purchaser: UserId,
    body: PurchaseRequest,
    purchase_service: Arc<dyn PurchaseService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let purchase = purchase_service
        .create(purchaser, ProductId(body.product_id))
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(reply(StatusCode::CREATED, purchase, "purchase settled"))
}

pub async fn list_purchases(
    query: ListQuery,
    _caller: UserId,
    purchase_service: Arc<dyn PurchaseService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let page = query.page().map_err(reject::custom)?;
    let purchases = purchase_service
        .list(page)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(reply(StatusCode::OK, purchases, "purchases"))
}

pub async fn get_purchase(
    id: u64,
    _caller: UserId,
    purchase_service: Arc<dyn PurchaseService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let purchase = purchase_service
        .get(PurchaseId(id))
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(reply(StatusCode::OK, purchase, "purchase"))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePurchaseRequest {
    pub product_id: u64,
    pub created_at: DateTime<Utc>,
    pub wallet_snapshot: Decimal,
    pub cost: Decimal,
}

pub async fn update_purchase(
    id: u64,
    _caller: UserId,
    body: UpdatePurchaseRequest,
    purchase_service: Arc<dyn PurchaseService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let purchase = purchase_service
        .update(PurchaseUpdate {
            id: PurchaseId(id),
            product_id: ProductId(body.product_id),
            created_at: body.created_at,
            wallet_snapshot: body.wallet_snapshot,
            cost: body.cost,
        })
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(reply(StatusCode::OK, purchase, "purchase updated"))
}

pub async fn delete_purchase(
    id: u64,
    _caller: UserId,
    purchase_service: Arc<dyn PurchaseService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    purchase_service
        .delete(PurchaseId(id))
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(reply(StatusCode::OK, (), "purchase deleted"))
}
