use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::user::{User, TABLE_NAME},
};

pub async fn paginate_users(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    search: Option<String>,
) -> anyhow::Result<(Vec<User>, u32, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];

    if let Some(search) = search {
        binds.push(SqlxBinds::String(format!("%{}%", search)));
        filters.push(format!("user_name ILIKE ${}", binds.len()));
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

    let q = binds_query_as::<User>(&stmt, binds.clone());
    let q_count = binds_query_as::<(i64,)>(&stmt_count, binds);
    let data = q.fetch_all(&mut **tx).await?;
    let count = q_count.fetch_one(&mut **tx).await?;
    let num_page = (count.0 as u32).div_ceil(page_size);
    Ok((data, count.0 as u32, num_page))
}

pub async fn get_user_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<User>> {
    let data = sqlx::query_as(format!("SELECT * FROM {} WHERE id = $1", TABLE_NAME).as_str())
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn get_user_by_username(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
) -> anyhow::Result<Option<User>> {
    let data = sqlx::query_as(format!("SELECT * FROM {} WHERE user_name = $1", TABLE_NAME).as_str())
        .bind(username)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn create_user(tx: &mut Transaction<'_, Postgres>, user: &User) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, user_name, email, password, role_id, is_active, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user.id)
    .bind(&user.user_name)
    .bind(&user.email)
    .bind(&user.password)
    .bind(user.role_id)
    .bind(user.is_active)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update_user(
    tx: &mut Transaction<'_, Postgres>,
    user: &mut User,
    email: Option<String>,
    role_id: Uuid,
    is_active: bool,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    user.email = email;
    user.role_id = role_id;
    user.is_active = is_active;
    user.updated_at = Some(now);
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET email = $1, role_id = $2, is_active = $3, updated_at = $4
        WHERE id = $5"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&user.email)
    .bind(user.role_id)
    .bind(user.is_active)
    .bind(user.updated_at)
    .bind(user.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
