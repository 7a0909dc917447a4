use std::sync::Arc;

use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::test_utils::generate_test_user,
    factory::permission::PermissionFactory,
    init_openapi_route,
    model::permission::TABLE_NAME,
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_paginate_permission_api(pool: PgPool) -> anyhow::Result<()> {
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
        "test_user",
        "password",
    )
    .await?;
    let mut permission_factory = PermissionFactory::new();
    permission_factory.generate_many(&app_state.db, 10, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .get("/api/permission")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    assert_eq!(body.get("counts").i64(), 10);
    assert_eq!(body.get("results").array().len(), 10);
    Ok(())
}

#[sqlx::test]
async fn test_create_permission_api(pool: PgPool) -> anyhow::Result<()> {
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
        "test_user",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/permission")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "name": "carrier_detail_view",
            "type": "route",
            "module": "carrier",
            "resource": "carrier_detail",
            "action": "view",
            "description": "see the carrier detail screen"
        }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::CREATED);
    let json_resp = resp.json().await;
    let new_id = json_resp.value().object().get_opt("id");
    assert!(new_id.is_some());
    let new_id: Uuid = new_id.unwrap().deserialize();
    let row: Option<(String, String, String, String, String)> = sqlx::query_as(
        format!(
            r#"
    SELECT name, type, module, resource, action
    FROM {}
    WHERE id = $1"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(new_id)
    .fetch_optional(&mut *db)
    .await?;
    assert!(row.is_some());
    let row = row.unwrap();
    assert_eq!(row.0, "carrier_detail_view".to_string());
    assert_eq!(row.1, "route".to_string());
    assert_eq!(row.2, "carrier".to_string());
    assert_eq!(row.3, "carrier_detail".to_string());
    assert_eq!(row.4, "view".to_string());

    // When 2: same name again
    let resp = cli
        .post("/api/permission")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "name": "carrier_detail_view",
            "type": "route",
            "module": "carrier",
            "resource": "carrier_detail",
            "action": "view",
        }))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::CONFLICT);
    Ok(())
}

#[sqlx::test]
async fn test_create_permission_api_rejects_bad_enums(pool: PgPool) -> anyhow::Result<()> {
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
        "test_user",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1: unknown type
    let resp = cli
        .post("/api/permission")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "name": "broken_permission",
            "type": "widget",
            "module": "carrier",
            "resource": "carrier_detail",
            "action": "view",
        }))
        .send()
        .await;

    // Expect 1
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When 2: unknown action
    let resp = cli
        .post("/api/permission")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "name": "broken_permission",
            "type": "route",
            "module": "carrier",
            "resource": "carrier_detail",
            "action": "approve",
        }))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::BAD_REQUEST);

    // Nothing reached storage
    let count: (i64,) = sqlx::query_as(
        format!("SELECT count(id) FROM {}", TABLE_NAME).as_str(),
    )
    .fetch_one(&mut *db)
    .await?;
    assert_eq!(count.0, 0);
    Ok(())
}

#[sqlx::test]
async fn test_get_detail_permission_api(pool: PgPool) -> anyhow::Result<()> {
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
        "test_user",
        "password",
    )
    .await?;
    let mut permission_factory = PermissionFactory::<()>::new();
    let permission = permission_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1
    let resp = cli
        .get("/api/permission/detail")
        .query("id", &permission.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 1
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    assert_eq!(body.get("id").string(), permission.id.to_string());
    assert_eq!(body.get("type").string(), permission.kind.as_str());
    assert_eq!(body.get("action").string(), permission.action.as_str());

    // When 2
    let resp = cli
        .get("/api/permission/detail")
        .query("id", &Uuid::now_v7().to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test]
async fn test_update_and_delete_permission_api(pool: PgPool) -> anyhow::Result<()> {
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
        "test_user",
        "password",
    )
    .await?;
    let mut permission_factory = PermissionFactory::<()>::new();
    let permission = permission_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1: update
    let resp = cli
        .put("/api/permission")
        .query("id", &permission.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "name": "invoice_send_update",
            "type": "feature",
            "module": "invoice",
            "resource": "invoice_send",
            "action": "update",
        }))
        .send()
        .await;

    // Expect 1
    resp.assert_status_is_ok();
    let row: (String, String, String) = sqlx::query_as(
        format!(
            "SELECT name, type, action FROM {} WHERE id = $1",
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(permission.id)
    .fetch_one(&mut *db)
    .await?;
    assert_eq!(row.0, "invoice_send_update".to_string());
    assert_eq!(row.1, "feature".to_string());
    assert_eq!(row.2, "update".to_string());

    // When 2: delete
    let resp = cli
        .delete("/api/permission")
        .query("id", &permission.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::NO_CONTENT);
    let resp = cli
        .delete("/api/permission")
        .query("id", &permission.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}
