use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::model::carrier_approval_history::{ApprovalAction, CarrierApprovalHistory, TABLE_NAME};

// Append-only: insert and read, no update or delete.

#[allow(clippy::too_many_arguments)]
pub async fn create_history_row(
    tx: &mut Transaction<'_, Postgres>,
    carrier_id: &Uuid,
    action: ApprovalAction,
    action_by_user_id: Option<Uuid>,
    notes: Option<String>,
    rejection_reason: Option<String>,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<CarrierApprovalHistory> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let new_row = CarrierApprovalHistory {
        id: Uuid::now_v7(),
        carrier_id: *carrier_id,
        action,
        action_by_user_id,
        action_at: now,
        notes,
        rejection_reason,
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, carrier_id, action, action_by_user_id, action_at, notes, rejection_reason)
    VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(new_row.id)
    .bind(new_row.carrier_id)
    .bind(new_row.action)
    .bind(new_row.action_by_user_id)
    .bind(new_row.action_at)
    .bind(&new_row.notes)
    .bind(&new_row.rejection_reason)
    .execute(&mut **tx)
    .await?;
    Ok(new_row)
}

pub async fn get_history_for_carrier(
    tx: &mut Transaction<'_, Postgres>,
    carrier_id: &Uuid,
) -> anyhow::Result<Vec<CarrierApprovalHistory>> {
    let data = sqlx::query_as(
        format!(
            "SELECT * FROM {} WHERE carrier_id = $1 ORDER BY action_at DESC, id DESC",
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(carrier_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(data)
}

/// The newest row for a carrier. Ties on action_at break on the v7 uuid,
/// which sorts by insert order.
pub async fn get_latest_for_carrier(
    tx: &mut Transaction<'_, Postgres>,
    carrier_id: &Uuid,
) -> anyhow::Result<Option<CarrierApprovalHistory>> {
    let data = sqlx::query_as(
        format!(
            "SELECT * FROM {} WHERE carrier_id = $1 ORDER BY action_at DESC, id DESC LIMIT 1",
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(carrier_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(data)
}
