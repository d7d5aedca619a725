use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use storefront::api;
use storefront::application_impl::{JwtConfig, Sha256CredentialHasher, SigningKey};
use storefront::server::Server;
use testresult::TestResult;
use warp::Filter;
use warp::http::StatusCode;

fn app() -> impl Filter<Extract = (impl warp::Reply,), Error = std::convert::Infallible> + Clone {
    let jwt = JwtConfig {
        issuer: "storefront-test".to_string(),
        audience: "storefront-api".to_string(),
        access_ttl: Duration::from_secs(600),
        signing_key: SigningKey::new(vec![7u8; 32]).unwrap(),
    };
    let server = Arc::new(Server::in_memory(Arc::new(Sha256CredentialHasher), jwt));
    warp::path("api")
        .and(warp::path("v1"))
        .and(api::v1::routes(server))
        .recover(api::v1::recover_error)
}

fn body(res: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
    serde_json::from_slice(res.body()).unwrap()
}

async fn signup_and_login<F>(app: &F, login: &str) -> TestResult<(u64, String)>
where
    F: Filter + 'static,
    F::Extract: warp::Reply + Send,
{
    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/users")
        .json(&json!({
            "login": login,
            "name": "Jane",
            "last_name": "Doe",
            "phone_number": "+15550100",
            "email": format!("{login}@example.com"),
            "password": "secret-pw",
        }))
        .reply(app)
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/users/login")
        .json(&json!({ "login": login, "password": "secret-pw" }))
        .reply(app)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let v = body(&res);
    let id = v["data"]["user_id"].as_u64().ok_or("user_id")?;
    let token = v["data"]["access_token"].as_str().ok_or("access_token")?;
    Ok((id, token.to_string()))
}

#[tokio::test]
async fn signup_login_then_authenticated_read() -> TestResult {
    let app = app();
    let (id, token) = signup_and_login(&app, "jane").await?;

    let res = warp::test::request()
        .method("GET")
        .path(&format!("/api/v1/users/{id}"))
        .header("authorization", format!("Bearer {token}"))
        .reply(&app)
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let v = body(&res);
    assert_eq!(v["success"], true);
    assert_eq!(v["data"]["id"].as_u64(), Some(id));
    assert_eq!(v["data"]["login"], "jane");
    assert!(v["data"].get("password_hash").is_none());
    assert!(v["data"].get("password_salt").is_none());
    Ok(())
}

#[tokio::test]
async fn missing_or_bad_bearer_is_unauthorized() {
    let app = app();

    let res = warp::test::request()
        .method("GET")
        .path("/api/v1/products")
        .reply(&app)
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = warp::test::request()
        .method("GET")
        .path("/api/v1/products")
        .header("authorization", "Bearer not.a.token")
        .reply(&app)
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&res)["success"], false);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> TestResult {
    let app = app();
    signup_and_login(&app, "jane").await?;

    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/users/login")
        .json(&json!({ "login": "jane", "password": "nope" }))
        .reply(&app)
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&res)["error"]["code"], "InvalidCredentials");
    Ok(())
}

#[tokio::test]
async fn duplicate_signup_conflicts() -> TestResult {
    let app = app();
    signup_and_login(&app, "jane").await?;

    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/users")
        .json(&json!({
            "login": "jane2",
            "name": "Jane",
            "last_name": "Doe",
            "phone_number": "+15550100",
            "email": "jane@example.com",
            "password": "secret-pw",
        }))
        .reply(&app)
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn purchase_without_funds_is_unprocessable() -> TestResult {
    let app = app();
    let (_, token) = signup_and_login(&app, "jane").await?;
    let bearer = format!("Bearer {token}");

    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/products")
        .header("authorization", &bearer)
        .json(&json!({
            "name": "kettle",
            "cost": "50.00",
            "quantity_stock": 3,
            "guarantees": "2030-01-01T00:00:00Z",
            "country": "PT",
        }))
        .reply(&app)
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let product_id = body(&res)["data"]["id"].as_u64().ok_or("product id")?;

    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/purchases")
        .header("authorization", &bearer)
        .json(&json!({ "product_id": product_id }))
        .reply(&app)
        .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body(&res)["error"]["code"], "InsufficientFunds");

    let res = warp::test::request()
        .method("PATCH")
        .path(&format!("/api/v1/products/{product_id}/like"))
        .header("authorization", &bearer)
        .reply(&app)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn unknown_ids_are_not_found() -> TestResult {
    let app = app();
    let (id, token) = signup_and_login(&app, "jane").await?;

    let res = warp::test::request()
        .method("DELETE")
        .path(&format!("/api/v1/users/{}", id + 1))
        .header("authorization", format!("Bearer {token}"))
        .reply(&app)
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
