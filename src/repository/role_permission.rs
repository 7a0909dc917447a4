use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::{
        permission::{Permission, TABLE_NAME as PERMISSION_TABLE_NAME},
        role_permission::{RolePermission, TABLE_NAME},
    },
};

pub async fn get_all_role_permissions(
    tx: &mut Transaction<'_, Postgres>,
    page: Option<u32>,
    page_size: Option<u32>,
    role_id: &Uuid,
    all: Option<bool>,
) -> anyhow::Result<(Vec<RolePermission>, u32, u32)> {
    let page = page.unwrap_or(1);
    let page_size = page_size.unwrap_or(10);
    let all = all.unwrap_or(false);
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];

    binds.push(SqlxBinds::Uuid(*role_id));
    filters.push(format!("role_id = ${}", binds.len()));

    let limit = match all {
        true => None,
        false => Some(page_size),
    };
    let offset = match all {
        true => None,
        false => Some((page - 1) * page_size),
    };

    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["updated_at DESC".to_string()],
        limit,
        offset,
    );
    let stmt_count = query_builder(
        Some("count(*)".to_string()),
        TABLE_NAME,
        &filters,
        vec![],
        None,
        None,
    );

    let q = binds_query_as::<RolePermission>(&stmt, binds.clone());
    let q_count = binds_query_as::<(i64,)>(&stmt_count, binds);
    let data = q.fetch_all(&mut **tx).await?;
    let count = q_count.fetch_one(&mut **tx).await?;
    let num_page = match all {
        true => 0,
        false => (count.0 as u32).div_ceil(page_size),
    };
    Ok((data, count.0 as u32, num_page))
}

pub async fn get_detail_role_permission(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
    permission_id: &Uuid,
) -> anyhow::Result<Option<RolePermission>> {
    Ok(sqlx::query_as(
        format!(
            "SELECT * FROM {} WHERE role_id = $1 AND permission_id = $2",
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(role_id)
    .bind(permission_id)
    .fetch_optional(&mut **tx)
    .await?)
}

/// The full grant set of a role. (role_id, permission_id) uniqueness keeps
/// the result duplicate-free.
pub async fn get_permissions_for_role(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
) -> anyhow::Result<Vec<Permission>> {
    let data = sqlx::query_as(
        format!(
            r#"
    SELECT p.*
    FROM {} p
    JOIN {} rp ON rp.permission_id = p.id
    WHERE rp.role_id = $1"#,
            PERMISSION_TABLE_NAME, TABLE_NAME
        )
        .as_str(),
    )
    .bind(role_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(data)
}

pub async fn create_role_permission(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
    permission_id: &Uuid,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<RolePermission> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let new_role_permission = RolePermission {
        id: Uuid::now_v7(),
        role_id: *role_id,
        permission_id: *permission_id,
        created_at: Some(now),
        updated_at: Some(now),
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, role_id, permission_id, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(new_role_permission.id)
    .bind(new_role_permission.role_id)
    .bind(new_role_permission.permission_id)
    .bind(new_role_permission.created_at)
    .bind(new_role_permission.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(new_role_permission)
}

pub async fn delete_role_permission(
    tx: &mut Transaction<'_, Postgres>,
    role_permission: &RolePermission,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            "DELETE FROM {} WHERE role_id = $1 AND permission_id = $2",
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(role_permission.role_id)
    .bind(role_permission.permission_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
