use std::sync::Arc;

use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::test_utils::generate_test_user,
    factory::carrier::CarrierFactory,
    init_openapi_route,
    model::carrier::TABLE_NAME,
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_paginate_carrier_api(pool: PgPool) -> anyhow::Result<()> {
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
    let mut carrier_factory = CarrierFactory::new();
    carrier_factory.generate_many(&app_state.db, 10, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .get("/api/carrier")
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
async fn test_create_carrier_api(pool: PgPool) -> anyhow::Result<()> {
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
        .post("/api/carrier")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "name": "Bluegrass Freight LLC",
            "mc_number": "MC123456",
            "dot_number": "DOT778899",
            "contact_email": "dispatch@bluegrassfreight.test",
            "contact_phone": "555-0134",
        }))
        .send()
        .await;

    // Expect: carrier row plus its first history row in one commit
    resp.assert_status(StatusCode::CREATED);
    let json_resp = resp.json().await;
    let body = json_resp.value().object();
    assert_eq!(body.get("status").string(), "created");
    let carrier_id: Uuid = body.get("id").deserialize();
    let row: Option<(String, Option<String>)> = sqlx::query_as(
        format!("SELECT name, mc_number FROM {} WHERE id = $1", TABLE_NAME).as_str(),
    )
    .bind(carrier_id)
    .fetch_optional(&mut *db)
    .await?;
    assert!(row.is_some());
    let history: Vec<(String, Option<Uuid>)> = sqlx::query_as(
        "SELECT action, action_by_user_id FROM public.carrier_approval_history WHERE carrier_id = $1",
    )
    .bind(carrier_id)
    .fetch_all(&mut *db)
    .await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].0, "created".to_string());
    assert_eq!(history[0].1, Some(test_user.user.id));

    // When 2: duplicate mc_number
    let resp = cli
        .post("/api/carrier")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "name": "Bluegrass Freight Clone",
            "mc_number": "MC123456",
        }))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::CONFLICT);

    // When 3: malformed contact email never reaches storage
    let resp = cli
        .post("/api/carrier")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "name": "Bad Email Carrier",
            "contact_email": "not-an-email",
        }))
        .send()
        .await;

    // Expect 3
    resp.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[sqlx::test]
async fn test_carrier_approval_flow_api(pool: PgPool) -> anyhow::Result<()> {
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
        "manager_user",
        "password",
    )
    .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);
    let resp = cli
        .post("/api/carrier")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "name": "Flatbed Express",
            "mc_number": "MC445566",
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);
    let json_resp = resp.json().await;
    let carrier_id = json_resp.value().object().get("id").string().to_string();

    // When: walk the lifecycle, status always follows the newest row
    for (action, expected_status) in [
        ("manager_approved", "manager_approved"),
        ("accounts_approved", "accounts_approved"),
        ("disabled", "disabled"),
        ("enabled", "enabled"),
    ] {
        let resp = cli
            .post("/api/carrier/approval-action")
            .query("id", &carrier_id)
            .header("authorization", format!("Bearer {}", test_user.token))
            .body_json(&json!({ "action": action }))
            .send()
            .await;
        resp.assert_status(StatusCode::CREATED);

        let resp = cli
            .get("/api/carrier/status")
            .query("id", &carrier_id)
            .header("authorization", format!("Bearer {}", test_user.token))
            .send()
            .await;
        resp.assert_status_is_ok();
        resp.assert_json(&json!({
            "carrier_id": carrier_id,
            "status": expected_status,
        }))
        .await;
    }

    // Rejection keeps its reason
    let resp = cli
        .post("/api/carrier/approval-action")
        .query("id", &carrier_id)
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "action": "rejected",
            "rejection_reason": "insurance certificate expired",
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);

    // Expect: full log, newest first, nothing mutated
    let resp = cli
        .get("/api/carrier/history")
        .query("id", &carrier_id)
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json_resp = resp.json().await;
    let rows = json_resp.value().array();
    assert_eq!(rows.len(), 6);
    let first = rows.get(0).object();
    assert_eq!(first.get("action").string(), "rejected");
    assert_eq!(
        first.get("rejection_reason").string(),
        "insurance certificate expired"
    );
    let last = rows.get(5).object();
    assert_eq!(last.get("action").string(), "created");

    // When: action outside the closed set
    let resp = cli
        .post("/api/carrier/approval-action")
        .query("id", &carrier_id)
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({ "action": "archived" }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When: unknown carrier
    let resp = cli
        .post("/api/carrier/approval-action")
        .query("id", &Uuid::now_v7().to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({ "action": "manager_approved" }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test]
async fn test_get_detail_carrier_api(pool: PgPool) -> anyhow::Result<()> {
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
    let mut carrier_factory = CarrierFactory::<()>::new();
    let carrier = carrier_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1: factory carrier has no history yet, so no status
    let resp = cli
        .get("/api/carrier/detail")
        .query("id", &carrier.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 1
    resp.assert_status_is_ok();
    let json_resp = resp.json().await;
    let body = json_resp.value().object();
    assert_eq!(body.get("id").string(), carrier.id.to_string());
    assert_eq!(body.get("name").string(), carrier.name);
    let status = body
        .get_opt("status")
        .and_then(|v| v.deserialize::<Option<String>>());
    assert!(status.is_none());

    // When 2
    let resp = cli
        .get("/api/carrier/detail")
        .query("id", &Uuid::now_v7().to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test]
async fn test_update_carrier_api(pool: PgPool) -> anyhow::Result<()> {
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
    let mut carrier_factory = CarrierFactory::<()>::new();
    let carrier = carrier_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .put("/api/carrier")
        .query("id", &carrier.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "name": "Renamed Carrier Inc",
            "mc_number": "MC999111",
        }))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let row: (String, Option<String>) = sqlx::query_as(
        format!("SELECT name, mc_number FROM {} WHERE id = $1", TABLE_NAME).as_str(),
    )
    .bind(carrier.id)
    .fetch_one(&mut *db)
    .await?;
    assert_eq!(row.0, "Renamed Carrier Inc".to_string());
    assert_eq!(row.1, Some("MC999111".to_string()));
    Ok(())
}
