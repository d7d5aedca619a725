use super::error::*;
use super::handler;
use crate::application_port::AuthService;
use crate::domain_model::UserId;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, http, reject};

/// Every `/api/v1` route. Paths are relative to the version prefix.
pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let auth = || with_verification(server.auth_service.clone());

    let signup = warp::post()
        .and(warp::path("users"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::signup);

    let login = warp::post()
        .and(warp::path("users"))
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::login);

    let list_users = warp::get()
        .and(warp::path("users"))
        .and(warp::path::end())
        .and(warp::query::<handler::ListQuery>())
        .and(auth())
        .and(with(server.user_service.clone()))
        .and_then(handler::list_users);

    let get_user = warp::get()
        .and(warp::path("users"))
        .and(warp::path::param::<u64>())
        .and(warp::path::end())
        .and(auth())
        .and(with(server.user_service.clone()))
        .and_then(handler::get_user);

    let update_user = warp::put()
        .and(warp::path("users"))
        .and(warp::path::param::<u64>())
        .and(warp::path::end())
        .and(auth())
        .and(warp::body::json())
        .and(with(server.user_service.clone()))
        .and_then(handler::update_user);

    let delete_user = warp::delete()
        .and(warp::path("users"))
        .and(warp::path::param::<u64>())
        .and(warp::path::end())
        .and(auth())
        .and(with(server.user_service.clone()))
        .and_then(handler::delete_user);

    let create_product = warp::post()
        .and(warp::path("products"))
        .and(warp::path::end())
        .and(auth())
        .and(warp::body::json())
        .and(with(server.product_service.clone()))
        .and_then(handler::create_product);

    let list_products = warp::get()
        .and(warp::path("products"))
        .and(warp::path::end())
        .and(warp::query::<handler::ListQuery>())
        .and(auth())
        .and(with(server.product_service.clone()))
        .and_then(handler::list_products);

    let get_product = warp::get()
        .and(warp::path("products"))
        .and(warp::path::param::<u64>())
        .and(warp::path::end())
        .and(auth())
        .and(with(server.product_service.clone()))
        .and_then(handler::get_product);

    let update_product = warp::put()
        .and(warp::path("products"))
        .and(warp::path::param::<u64>())
        .and(warp::path::end())
        .and(auth())
        .and(warp::body::json())
        .and(with(server.product_service.clone()))
        .and_then(handler::update_product);

    let delete_product = warp::delete()
        .and(warp::path("products"))
        .and(warp::path::param::<u64>())
        .and(warp::path::end())
        .and(auth())
        .and(with(server.product_service.clone()))
        .and_then(handler::delete_product);

    let like_product = warp::patch()
        .and(warp::path("products"))
        .and(warp::path::param::<u64>())
        .and(warp::path("like"))
        .and(warp::path::end())
        .and(auth())
        .and(with(server.product_service.clone()))
        .and_then(handler::like_product);

    let unlike_product = warp::delete()
        .and(warp::path("products"))
        .and(warp::path::param::<u64>())
        .and(warp::path("like"))
        .and(warp::path::end())
        .and(auth())
        .and(with(server.product_service.clone()))
        .and_then(handler::unlike_product);

    let create_purchase = warp::post()
        .and(warp::path("purchases"))
        .and(warp::path::end())
        .and(auth())
        .and(warp::body::json())
        .and(with(server.purchase_service.clone()))
        .and_then(handler::create_purchase);

    let list_purchases = warp::get()
        .and(warp::path("purchases"))
        .and(warp::path::end())
        .and(warp::query::<handler::ListQuery>())
        .and(auth())
        .and(with(server.purchase_service.clone()))
        .and_then(handler::list_purchases);

    let get_purchase = warp::get()
        .and(warp::path("purchases"))
        .and(warp::path::param::<u64>())
        .and(warp::path::end())
        .and(auth())
        .and(with(server.purchase_service.clone()))
        .and_then(handler::get_purchase);

    let update_purchase = warp::put()
        .and(warp::path("purchases"))
        .and(warp::path::param::<u64>())
        .and(warp::path::end())
        .and(auth())
        .and(warp::body::json())
        .and(with(server.purchase_service.clone()))
        .and_then(handler::update_purchase);

    let delete_purchase = warp::delete()
        .and(warp::path("purchases"))
        .and(warp::path::param::<u64>())
        .and(warp::path::end())
        .and(auth())
        .and(with(server.purchase_service.clone()))
        .and_then(handler::delete_purchase);

    let user_routes = signup
        .or(login)
        .or(list_users)
        .or(get_user)
        .or(update_user)
        .or(delete_user);
    let product_routes = create_product
        .or(list_products)
        .or(get_product)
        .or(update_product)
        .or(delete_product)
        .or(like_product)
        .or(unlike_product);
    let purchase_routes = create_purchase
        .or(list_purchases)
        .or(get_purchase)
        .or(update_purchase)
        .or(delete_purchase);

    user_routes
        .or(product_routes)
        .or(purchase_routes)
        .with(warp::trace::request())
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_verification(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (UserId,), Error = warp::Rejection> + Clone {
    warp::header::<String>(http::header::AUTHORIZATION.as_ref()).and_then(move |token: String| {
        let auth_service = auth_service.clone();
        async move {
            if let Some(token) = token.strip_prefix("Bearer ") {
                let user_id = auth_service
                    .verify_token(token)
                    .await
                    .map_err(ApiFailure::from)
                    .map_err(reject::custom)?;
                Ok(user_id)
            } else {
                Err(reject::custom(ApiFailure::bare(ApiErrorCode::InvalidToken)))
            }
        }
    })
}
