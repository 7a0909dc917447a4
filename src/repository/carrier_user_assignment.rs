use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::carrier_user_assignment::{CarrierUserAssignment, TABLE_NAME},
};

pub async fn get_assignments_for_carrier(
    tx: &mut Transaction<'_, Postgres>,
    carrier_id: &Uuid,
) -> anyhow::Result<Vec<CarrierUserAssignment>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*carrier_id)];
    let filters: Vec<String> = vec!["carrier_id = $1".to_string()];
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["assigned_at DESC".to_string()],
        None,
        None,
    );
    let q = binds_query_as::<CarrierUserAssignment>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn get_assignments_for_user(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> anyhow::Result<Vec<CarrierUserAssignment>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*user_id)];
    let filters: Vec<String> = vec!["user_id = $1".to_string()];
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["assigned_at DESC".to_string()],
        None,
        None,
    );
    let q = binds_query_as::<CarrierUserAssignment>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn get_detail_assignment(
    tx: &mut Transaction<'_, Postgres>,
    carrier_id: &Uuid,
    user_id: &Uuid,
) -> anyhow::Result<Option<CarrierUserAssignment>> {
    Ok(sqlx::query_as(
        format!(
            "SELECT * FROM {} WHERE carrier_id = $1 AND user_id = $2",
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(carrier_id)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?)
}

pub async fn create_assignment(
    tx: &mut Transaction<'_, Postgres>,
    carrier_id: &Uuid,
    user_id: &Uuid,
    assigned_by: Option<Uuid>,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<CarrierUserAssignment> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let new_assignment = CarrierUserAssignment {
        id: Uuid::now_v7(),
        carrier_id: *carrier_id,
        user_id: *user_id,
        assigned_by,
        assigned_at: Some(now),
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, carrier_id, user_id, assigned_by, assigned_at)
    VALUES ($1, $2, $3, $4, $5)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(new_assignment.id)
    .bind(new_assignment.carrier_id)
    .bind(new_assignment.user_id)
    .bind(new_assignment.assigned_by)
    .bind(new_assignment.assigned_at)
    .execute(&mut **tx)
    .await?;
    Ok(new_assignment)
}

pub async fn delete_assignment(
    tx: &mut Transaction<'_, Postgres>,
    assignment: &CarrierUserAssignment,
) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE id = $1", TABLE_NAME).as_str())
        .bind(assignment.id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
