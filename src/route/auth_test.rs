use std::sync::Arc;

use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    core::test_utils::{generate_test_user, provision_user},
    init_openapi_route,
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_auth_login_api(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let client = redis::Client::open(config.redis_url.clone()).unwrap();
    let redis_pool = r2d2::Pool::builder().build(client).unwrap();
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
    });
    let mut db = app_state.db.acquire().await?;
    provision_user(&mut db, "login_user", "correct horse", "dispatcher").await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json!({
            "user_name": "login_user",
            "password": "correct horse",
        }))
        .send()
        .await;

    // Expect 1
    resp.assert_status_is_ok();
    let json_resp = resp.json().await;
    let body = json_resp.value().object();
    assert_eq!(body.get("token_type").string(), "Bearer");
    assert!(!body.get("token").string().is_empty());
    assert!(!body.get("refresh_token").string().is_empty());

    // When 2: wrong password
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json!({
            "user_name": "login_user",
            "password": "wrong horse",
        }))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When 3: unknown username
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json!({
            "user_name": "nobody",
            "password": "whatever",
        }))
        .send()
        .await;

    // Expect 3
    resp.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[sqlx::test]
async fn test_auth_login_disabled_user(pool: PgPool) -> anyhow::Result<()> {
    // Given: a provisioned account that has been disabled
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let client = redis::Client::open(config.redis_url.clone()).unwrap();
    let redis_pool = r2d2::Pool::builder().build(client).unwrap();
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
    });
    let mut db = app_state.db.acquire().await?;
    let user = provision_user(&mut db, "disabled_user", "password", "dispatcher").await?;
    sqlx::query("UPDATE public.users SET is_active = FALSE WHERE id = $1")
        .bind(user.id)
        .execute(&mut *db)
        .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json!({
            "user_name": "disabled_user",
            "password": "password",
        }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[sqlx::test]
async fn test_auth_refresh_token_api(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let client = redis::Client::open(config.redis_url.clone()).unwrap();
    let redis_pool = r2d2::Pool::builder().build(client).unwrap();
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
    });
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "refresh_user",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/auth/refresh-token")
        .body_json(&json!({ "refresh_token": test_user.refresh_token }))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json_resp = resp.json().await;
    let body = json_resp.value().object();
    assert!(!body.get("token").string().is_empty());

    // When 2: garbage refresh token
    let resp = cli
        .post("/api/auth/refresh-token")
        .body_json(&json!({ "refresh_token": "not-a-jwt" }))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}

#[sqlx::test]
async fn test_auth_logout_api(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let client = redis::Client::open(config.redis_url.clone()).unwrap();
    let redis_pool = r2d2::Pool::builder().build(client).unwrap();
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
    });
    let mut db = app_state.db.acquire().await?;
    let mut redis_conn = app_state.redis_conn.get()?;
    let test_user = generate_test_user(
        &mut db,
        &mut redis_conn,
        config.clone(),
        "logout_user",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1
    let resp = cli
        .post("/api/auth/logout")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 1
    resp.assert_status(StatusCode::NO_CONTENT);

    // When 2: the session is gone, so the token no longer authenticates
    let resp = cli
        .post("/api/auth/logout")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}
