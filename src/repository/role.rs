use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::{
        role::{Role, DEFAULT_GUARD_NAME, TABLE_NAME},
        user::TABLE_NAME as USER_TABLE_NAME,
    },
};

pub async fn paginate_roles(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    search: Option<String>,
) -> anyhow::Result<(Vec<Role>, u32, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];

    if let Some(search) = search {
        binds.push(SqlxBinds::String(format!("%{}%", search)));
        filters.push(format!("name ILIKE ${}", binds.len()));
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

    let q = binds_query_as::<Role>(&stmt, binds.clone());
    let q_count = binds_query_as::<(i64,)>(&stmt_count, binds);
    let data = q.fetch_all(&mut **tx).await?;
    let count = q_count.fetch_one(&mut **tx).await?;
    let num_page = (count.0 as u32).div_ceil(page_size);
    Ok((data, count.0 as u32, num_page))
}

pub async fn get_dropdown_roles(
    tx: &mut Transaction<'_, Postgres>,
    limit: Option<u32>,
    search: Option<String>,
) -> anyhow::Result<Vec<Role>> {
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
    let q = binds_query_as::<Role>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn get_role_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Role>> {
    let data = sqlx::query_as(format!("SELECT * FROM {} WHERE id = $1", TABLE_NAME).as_str())
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn get_role_by_name(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> anyhow::Result<Option<Role>> {
    let data = sqlx::query_as(format!("SELECT * FROM {} WHERE name = $1", TABLE_NAME).as_str())
        .bind(name)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

#[allow(clippy::too_many_arguments)]
pub async fn create_role(
    tx: &mut Transaction<'_, Postgres>,
    id: Option<Uuid>,
    name: String,
    guard_name: Option<String>,
    description: Option<String>,
    is_system_role: bool,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<Role> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let new_role = Role {
        id: id.unwrap_or(Uuid::now_v7()),
        name,
        guard_name: guard_name.unwrap_or(DEFAULT_GUARD_NAME.to_string()),
        description,
        is_system_role,
        created_at: Some(now),
        updated_at: Some(now),
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, name, guard_name, description, is_system_role, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(new_role.id)
    .bind(&new_role.name)
    .bind(&new_role.guard_name)
    .bind(&new_role.description)
    .bind(new_role.is_system_role)
    .bind(new_role.created_at)
    .bind(new_role.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(new_role)
}

pub async fn update_role(
    tx: &mut Transaction<'_, Postgres>,
    role: &mut Role,
    name: String,
    description: Option<String>,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    role.name = name;
    role.description = description;
    role.updated_at = Some(now);
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET name = $1, description = $2, updated_at = $3
        WHERE id = $4"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&role.name)
    .bind(&role.description)
    .bind(role.updated_at)
    .bind(role.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Hard delete. Grants cascade via the role_permissions foreign key.
pub async fn delete_role(tx: &mut Transaction<'_, Postgres>, role: &Role) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE id = $1", TABLE_NAME).as_str())
        .bind(role.id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn count_users_with_role(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
) -> anyhow::Result<i64> {
    let count: (i64,) = sqlx::query_as(
        format!(
            "SELECT count(id) FROM {} WHERE role_id = $1",
            USER_TABLE_NAME
        )
        .as_str(),
    )
    .bind(role_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(count.0)
}
