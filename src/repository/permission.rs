use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::permission::{Permission, PermissionAction, PermissionKind, TABLE_NAME},
};

pub async fn paginate_permissions(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    search: Option<String>,
    module: Option<String>,
) -> anyhow::Result<(Vec<Permission>, u32, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];

    if let Some(search) = search {
        binds.push(SqlxBinds::String(format!("%{}%", search)));
        filters.push(format!("name ILIKE ${}", binds.len()));
    }
    if let Some(module) = module {
        binds.push(SqlxBinds::String(module));
        filters.push(format!("module = ${}", binds.len()));
    }

    let limit = page_size;
    let offset = (page - 1) * page_size;
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["updated_at DESC".to_string()],
        Some(limit),
        Some(offset),
    );
    let stmt_count = query_builder(
        Some("count(id)".to_string()),
        TABLE_NAME,
        &filters,
        vec![],
        None,
        None,
    );

    let q = binds_query_as::<Permission>(&stmt, binds.clone());
    let q_count = binds_query_as::<(i64,)>(&stmt_count, binds);
    let data = q.fetch_all(&mut **tx).await?;
    let count = q_count.fetch_one(&mut **tx).await?;
    let num_page = (count.0 as u32).div_ceil(page_size);
    Ok((data, count.0 as u32, num_page))
}

pub async fn get_dropdown_permissions(
    tx: &mut Transaction<'_, Postgres>,
    limit: Option<u32>,
    search: Option<String>,
) -> anyhow::Result<Vec<Permission>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];

    if let Some(search) = search {
        binds.push(SqlxBinds::String(format!("%{}%", search)));
        filters.push(format!("name ILIKE ${}", binds.len()));
    }

    let limit = limit.unwrap_or(10);

    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["name ASC".to_string()],
        Some(limit),
        None,
    );
    let q = binds_query_as::<Permission>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn get_permission_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Permission>> {
    let data = sqlx::query_as(format!("SELECT * FROM {} WHERE id = $1", TABLE_NAME).as_str())
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn get_permission_by_name(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> anyhow::Result<Option<Permission>> {
    let data = sqlx::query_as(format!("SELECT * FROM {} WHERE name = $1", TABLE_NAME).as_str())
        .bind(name)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

#[allow(clippy::too_many_arguments)]
pub async fn create_permission(
    tx: &mut Transaction<'_, Postgres>,
    id: Option<Uuid>,
    name: String,
    kind: PermissionKind,
    module: String,
    resource: String,
    action: PermissionAction,
    description: Option<String>,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<Permission> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let new_permission = Permission {
        id: id.unwrap_or(Uuid::now_v7()),
        name,
        kind,
        module,
        resource,
        action,
        description,
        created_at: Some(now),
        updated_at: Some(now),
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, name, type, module, resource, action, description, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(new_permission.id)
    .bind(&new_permission.name)
    .bind(new_permission.kind)
    .bind(&new_permission.module)
    .bind(&new_permission.resource)
    .bind(new_permission.action)
    .bind(&new_permission.description)
    .bind(new_permission.created_at)
    .bind(new_permission.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(new_permission)
}

#[allow(clippy::too_many_arguments)]
pub async fn update_permission(
    tx: &mut Transaction<'_, Postgres>,
    permission: &mut Permission,
    name: String,
    kind: PermissionKind,
    module: String,
    resource: String,
    action: PermissionAction,
    description: Option<String>,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    permission.name = name;
    permission.kind = kind;
    permission.module = module;
    permission.resource = resource;
    permission.action = action;
    permission.description = description;
    permission.updated_at = Some(now);
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET name = $1, type = $2, module = $3, resource = $4, action = $5, description = $6, updated_at = $7
        WHERE id = $8"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&permission.name)
    .bind(permission.kind)
    .bind(&permission.module)
    .bind(&permission.resource)
    .bind(permission.action)
    .bind(&permission.description)
    .bind(permission.updated_at)
    .bind(permission.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Hard delete. Grants referencing the permission cascade.
pub async fn delete_permission(
    tx: &mut Transaction<'_, Postgres>,
    permission: &Permission,
) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE id = $1", TABLE_NAME).as_str())
        .bind(permission.id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
