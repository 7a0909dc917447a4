use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::carrier::{Carrier, TABLE_NAME},
};

pub async fn paginate_carriers(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    search: Option<String>,
) -> anyhow::Result<(Vec<Carrier>, u32, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];

    if let Some(search) = search {
        binds.push(SqlxBinds::String(format!("%{}%", search)));
        filters.push(format!(
            "(name ILIKE ${} OR mc_number ILIKE ${})",
            binds.len(),
            binds.len()
        ));
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

    let q = binds_query_as::<Carrier>(&stmt, binds.clone());
    let q_count = binds_query_as::<(i64,)>(&stmt_count, binds);
    let data = q.fetch_all(&mut **tx).await?;
    let count = q_count.fetch_one(&mut **tx).await?;
    let num_page = (count.0 as u32).div_ceil(page_size);
    Ok((data, count.0 as u32, num_page))
}

pub async fn get_carrier_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Carrier>> {
    let data = sqlx::query_as(format!("SELECT * FROM {} WHERE id = $1", TABLE_NAME).as_str())
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

#[allow(clippy::too_many_arguments)]
pub async fn create_carrier(
    tx: &mut Transaction<'_, Postgres>,
    id: Option<Uuid>,
    name: String,
    mc_number: Option<String>,
    dot_number: Option<String>,
    contact_email: Option<String>,
    contact_phone: Option<String>,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<Carrier> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let new_carrier = Carrier {
        id: id.unwrap_or(Uuid::now_v7()),
        name,
        mc_number,
        dot_number,
        contact_email,
        contact_phone,
        created_at: Some(now),
        updated_at: Some(now),
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, name, mc_number, dot_number, contact_email, contact_phone, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(new_carrier.id)
    .bind(&new_carrier.name)
    .bind(&new_carrier.mc_number)
    .bind(&new_carrier.dot_number)
    .bind(&new_carrier.contact_email)
    .bind(&new_carrier.contact_phone)
    .bind(new_carrier.created_at)
    .bind(new_carrier.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(new_carrier)
}

#[allow(clippy::too_many_arguments)]
pub async fn update_carrier(
    tx: &mut Transaction<'_, Postgres>,
    carrier: &mut Carrier,
    name: String,
    mc_number: Option<String>,
    dot_number: Option<String>,
    contact_email: Option<String>,
    contact_phone: Option<String>,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    carrier.name = name;
    carrier.mc_number = mc_number;
    carrier.dot_number = dot_number;
    carrier.contact_email = contact_email;
    carrier.contact_phone = contact_phone;
    carrier.updated_at = Some(now);
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET name = $1, mc_number = $2, dot_number = $3, contact_email = $4, contact_phone = $5, updated_at = $6
        WHERE id = $7"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&carrier.name)
    .bind(&carrier.mc_number)
    .bind(&carrier.dot_number)
    .bind(&carrier.contact_email)
    .bind(&carrier.contact_phone)
    .bind(carrier.updated_at)
    .bind(carrier.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
