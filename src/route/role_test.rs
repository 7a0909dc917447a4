use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::test_utils::{generate_random, generate_test_user},
    factory::{permission::PermissionFactory, role::RoleFactory},
    init_openapi_route,
    model::role::{Role, TABLE_NAME},
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_paginate_role_api(pool: PgPool) -> anyhow::Result<()> {
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
    let mut role_factory = RoleFactory::new();
    role_factory.modified_many(|data, _, _| Role {
        id: data.id,
        name: data.name.clone(),
        guard_name: data.guard_name.clone(),
        description: data.description.clone(),
        is_system_role: data.is_system_role,
        created_at: data.created_at,
        updated_at: Some(generate_random::<DateTime<FixedOffset>>()),
    });
    role_factory.generate_many(&app_state.db, 10, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .get("/api/role")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect: 10 factory roles plus the test user's role
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    assert_eq!(body.get("counts").i64(), 11);
    assert_eq!(body.get("page").i64(), 1);
    assert_eq!(body.get("page_count").i64(), 2);
    assert_eq!(body.get("results").array().len(), 10);
    Ok(())
}

#[sqlx::test]
async fn test_dropdown_role_api(pool: PgPool) -> anyhow::Result<()> {
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
    let mut role_factory = RoleFactory::new();
    role_factory.generate_many(&app_state.db, 5, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .get("/api/role/dropdown")
        .query("limit", &3)
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    assert_eq!(json.value().array().len(), 3);
    Ok(())
}

#[sqlx::test]
async fn test_get_detail_role_api(pool: PgPool) -> anyhow::Result<()> {
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
    let mut role_factory = RoleFactory::<()>::new();
    let role = role_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1
    let resp = cli
        .get("/api/role/detail")
        .query("id", &role.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 1
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    assert_eq!(body.get("id").string(), role.id.to_string());
    assert_eq!(body.get("name").string(), role.name);
    assert_eq!(body.get("is_system_role").bool(), false);

    // When 2
    let resp = cli
        .get("/api/role/detail")
        .query("id", &"aaaa-bbbb-cccc")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test]
async fn test_create_role_api(pool: PgPool) -> anyhow::Result<()> {
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
    let permissions = permission_factory.generate_many(&app_state.db, 2, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When: role plus its initial grant set in one request
    let resp = cli
        .post("/api/role")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "name": "dispatcher_lead",
            "description": "role description",
            "permission_ids": [
                permissions[0].id.to_string(),
                permissions[1].id.to_string(),
            ]
        }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::CREATED);
    let json_resp = resp.json().await;
    let new_role_id = json_resp.value().object().get_opt("id");
    assert!(new_role_id.is_some());
    let new_role_id: Uuid = new_role_id.unwrap().deserialize();
    let new_role: Option<(String, Option<String>, bool)> = sqlx::query_as(
        format!(
            r#"
    SELECT name, description, is_system_role
    FROM {}
    WHERE id = $1"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(new_role_id)
    .fetch_optional(&mut *db)
    .await?;
    assert!(new_role.is_some());
    let new_role = new_role.unwrap();
    assert_eq!(new_role.0, "dispatcher_lead".to_string());
    assert_eq!(new_role.1, Some("role description".to_string()));
    assert!(!new_role.2);
    let grants: (i64,) =
        sqlx::query_as("SELECT count(id) FROM public.role_permissions WHERE role_id = $1")
            .bind(new_role_id)
            .fetch_one(&mut *db)
            .await?;
    assert_eq!(grants.0, 2);

    // When 2: same name again
    let resp = cli
        .post("/api/role")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "name": "dispatcher_lead",
            "description": "duplicate",
        }))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::CONFLICT);
    Ok(())
}

#[sqlx::test]
async fn test_update_role_api(pool: PgPool) -> anyhow::Result<()> {
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
    let mut role_factory = RoleFactory::<()>::new();
    let role = role_factory.generate_one(&app_state.db, ()).await?;
    let mut system_role_factory = RoleFactory::new();
    system_role_factory.modified_one(|data, _| Role {
        id: data.id,
        name: "admin".to_string(),
        guard_name: data.guard_name.clone(),
        description: data.description.clone(),
        is_system_role: true,
        created_at: data.created_at,
        updated_at: data.updated_at,
    });
    let system_role = system_role_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1: plain role rename
    let resp = cli
        .put("/api/role")
        .query("id", &role.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "name": "renamed role",
            "description": "role description",
        }))
        .send()
        .await;

    // Expect 1
    resp.assert_status_is_ok();
    let updated_role: Option<(String,)> = sqlx::query_as(
        format!("SELECT name FROM {} WHERE id = $1", TABLE_NAME).as_str(),
    )
    .bind(role.id)
    .fetch_optional(&mut *db)
    .await?;
    assert_eq!(updated_role.unwrap().0, "renamed role".to_string());

    // When 2: renaming a system role is a policy violation
    let resp = cli
        .put("/api/role")
        .query("id", &system_role.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "name": "not admin anymore",
            "description": "role description",
        }))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::FORBIDDEN);

    // When 3: unknown id
    let resp = cli
        .put("/api/role")
        .query("id", &"aaaa-bbbb-cccc")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "name": "whatever",
            "description": "role description",
        }))
        .send()
        .await;

    // Expect 3
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test]
async fn test_delete_role_api(pool: PgPool) -> anyhow::Result<()> {
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
    let mut role_factory = RoleFactory::<()>::new();
    let role = role_factory.generate_one(&app_state.db, ()).await?;
    let mut system_role_factory = RoleFactory::new();
    system_role_factory.modified_one(|data, _| Role {
        id: data.id,
        name: "admin".to_string(),
        guard_name: data.guard_name.clone(),
        description: data.description.clone(),
        is_system_role: true,
        created_at: data.created_at,
        updated_at: data.updated_at,
    });
    let system_role = system_role_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1: unreferenced non-system role
    let resp = cli
        .delete("/api/role")
        .query("id", &role.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 1
    resp.assert_status(StatusCode::NO_CONTENT);
    let deleted_role: Option<(Uuid,)> = sqlx::query_as(
        format!("SELECT id FROM {} WHERE id = $1", TABLE_NAME).as_str(),
    )
    .bind(role.id)
    .fetch_optional(&mut *db)
    .await?;
    assert!(deleted_role.is_none());

    // When 2: second delete of the same id
    let resp = cli
        .delete("/api/role")
        .query("id", &role.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::NOT_FOUND);

    // When 3: system role
    let resp = cli
        .delete("/api/role")
        .query("id", &system_role.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 3
    resp.assert_status(StatusCode::FORBIDDEN);

    // When 4: the test user's own role still has a holder
    let resp = cli
        .delete("/api/role")
        .query("id", &test_user.user.role_id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 4
    resp.assert_status(StatusCode::CONFLICT);
    Ok(())
}
