use std::sync::Arc;

use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::test_utils::generate_test_user,
    factory::permission::PermissionFactory,
    init_openapi_route,
    model::permission::{Permission, PermissionAction, PermissionKind},
    settings::get_config,
    AppState,
};

#[sqlx::test]
async fn test_grant_and_revoke_role_permission_api(pool: PgPool) -> anyhow::Result<()> {
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
    let role_id = test_user.user.role_id;
    let mut permission_factory = PermissionFactory::<()>::new();
    let permission = permission_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When 1: grant
    let resp = cli
        .post("/api/role-permissions")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "role_id": role_id.to_string(),
            "permission_id": permission.id.to_string(),
        }))
        .send()
        .await;

    // Expect 1
    resp.assert_status(StatusCode::CREATED);

    // When 2: granting the same pair twice is a conflict and leaves the
    // grant count unchanged
    let resp = cli
        .post("/api/role-permissions")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "role_id": role_id.to_string(),
            "permission_id": permission.id.to_string(),
        }))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::CONFLICT);
    let grants: (i64,) =
        sqlx::query_as("SELECT count(id) FROM public.role_permissions WHERE role_id = $1")
            .bind(role_id)
            .fetch_one(&mut *db)
            .await?;
    assert_eq!(grants.0, 1);

    // When 3: list the role's grants
    let resp = cli
        .get("/api/role-permissions")
        .query("role_id", &role_id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 3
    resp.assert_status_is_ok();
    let json_resp = resp.json().await;
    let body = json_resp.value().object();
    assert_eq!(body.get("counts").i64(), 1);

    // When 4: revoke
    let resp = cli
        .delete("/api/role-permissions")
        .query("role_id", &role_id.to_string())
        .query("permission_id", &permission.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 4
    resp.assert_status(StatusCode::NO_CONTENT);
    let resp = cli
        .delete("/api/role-permissions")
        .query("role_id", &role_id.to_string())
        .query("permission_id", &permission.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test]
async fn test_grant_unknown_ids_role_permission_api(pool: PgPool) -> anyhow::Result<()> {
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

    // When 1: role id that does not exist
    let resp = cli
        .post("/api/role-permissions")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "role_id": Uuid::now_v7().to_string(),
            "permission_id": permission.id.to_string(),
        }))
        .send()
        .await;

    // Expect 1
    resp.assert_status(StatusCode::NOT_FOUND);

    // When 2: permission id that does not exist
    let resp = cli
        .post("/api/role-permissions")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "role_id": test_user.user.role_id.to_string(),
            "permission_id": Uuid::now_v7().to_string(),
        }))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test]
async fn test_get_user_permissions_api(pool: PgPool) -> anyhow::Result<()> {
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
    let role_id = test_user.user.role_id;
    let mut permission_factory = PermissionFactory::new();
    let permissions = permission_factory.generate_many(&app_state.db, 3, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);
    for permission in &permissions {
        let resp = cli
            .post("/api/role-permissions")
            .header("authorization", format!("Bearer {}", test_user.token))
            .body_json(&json!({
                "role_id": role_id.to_string(),
                "permission_id": permission.id.to_string(),
            }))
            .send()
            .await;
        resp.assert_status(StatusCode::CREATED);
    }

    // When 1: the effective grant set of the user's single role
    let resp = cli
        .get("/api/user-permissions")
        .query("user_id", &test_user.user.id.to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 1
    resp.assert_status_is_ok();
    let json_resp = resp.json().await;
    assert_eq!(json_resp.value().array().len(), 3);

    // When 2: missing user is an error, not an empty set
    let resp = cli
        .get("/api/user-permissions")
        .query("user_id", &Uuid::now_v7().to_string())
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 2
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test]
async fn test_authorize_api(pool: PgPool) -> anyhow::Result<()> {
    // Given: a dispatcher that may only view the carrier detail screen
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
        "dispatcher_user",
        "password",
    )
    .await?;
    let mut permission_factory = PermissionFactory::new();
    permission_factory.modified_one(|data: &Permission, _| Permission {
        id: data.id,
        name: "carrier_detail_view".to_string(),
        kind: PermissionKind::Route,
        module: "carrier".to_string(),
        resource: "carrier_detail".to_string(),
        action: PermissionAction::View,
        description: data.description.clone(),
        created_at: data.created_at,
        updated_at: data.updated_at,
    });
    let permission = permission_factory.generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);
    let resp = cli
        .post("/api/role-permissions")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({
            "role_id": test_user.user.role_id.to_string(),
            "permission_id": permission.id.to_string(),
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);

    // When 1: the granted tuple
    let resp = cli
        .get("/api/authorize")
        .query("user_id", &test_user.user.id.to_string())
        .query("module", &"carrier")
        .query("resource", &"carrier_detail")
        .query("action", &"view")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 1
    resp.assert_status_is_ok();
    resp.assert_json(&json!({ "authorized": true })).await;

    // When 2: same resource, different action. Denied, not an error.
    let resp = cli
        .get("/api/authorize")
        .query("user_id", &test_user.user.id.to_string())
        .query("module", &"carrier")
        .query("resource", &"carrier_detail")
        .query("action", &"delete")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 2
    resp.assert_status_is_ok();
    resp.assert_json(&json!({ "authorized": false })).await;

    // When 3: user id that does not exist is 404, not false
    let resp = cli
        .get("/api/authorize")
        .query("user_id", &Uuid::now_v7().to_string())
        .query("module", &"carrier")
        .query("resource", &"carrier_detail")
        .query("action", &"view")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 3
    resp.assert_status(StatusCode::NOT_FOUND);

    // When 4: action outside the closed set
    let resp = cli
        .get("/api/authorize")
        .query("user_id", &test_user.user.id.to_string())
        .query("module", &"carrier")
        .query("resource", &"carrier_detail")
        .query("action", &"approve")
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect 4
    resp.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}
