use chrono::{DateTime, FixedOffset};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    model::carrier_approval_history::{ApprovalAction, CarrierApprovalHistory},
    repository::{
        carrier::get_carrier_by_id,
        carrier_approval_history::{create_history_row, get_history_for_carrier, get_latest_for_carrier},
        user::get_user_by_id,
    },
};

use super::access::AccessError;

/// Append one lifecycle action to a carrier's history. Rows are never
/// mutated afterwards; no transition table restricts which action may
/// follow which.
#[allow(clippy::too_many_arguments)]
pub async fn record_action(
    tx: &mut Transaction<'_, Postgres>,
    carrier_id: &Uuid,
    action: ApprovalAction,
    action_by_user_id: Option<Uuid>,
    notes: Option<String>,
    rejection_reason: Option<String>,
    now: Option<DateTime<FixedOffset>>,
) -> Result<CarrierApprovalHistory, AccessError> {
    let carrier = get_carrier_by_id(tx, carrier_id).await?;
    if carrier.is_none() {
        return Err(AccessError::NotFound {
            entity: "carrier",
            id: *carrier_id,
        });
    }
    if let Some(user_id) = action_by_user_id {
        let user = get_user_by_id(tx, &user_id).await?;
        if user.is_none() {
            return Err(AccessError::NotFound {
                entity: "user",
                id: user_id,
            });
        }
    }
    let row = create_history_row(
        tx,
        carrier_id,
        action,
        action_by_user_id,
        notes,
        rejection_reason,
        now,
    )
    .await?;
    Ok(row)
}

/// The action of the most-recently-timestamped history row. A carrier with
/// no history has no status yet.
pub async fn current_status(
    tx: &mut Transaction<'_, Postgres>,
    carrier_id: &Uuid,
) -> Result<Option<ApprovalAction>, AccessError> {
    let carrier = get_carrier_by_id(tx, carrier_id).await?;
    if carrier.is_none() {
        return Err(AccessError::NotFound {
            entity: "carrier",
            id: *carrier_id,
        });
    }
    let latest = get_latest_for_carrier(tx, carrier_id).await?;
    Ok(latest.map(|row| row.action))
}

/// Full log, newest first.
pub async fn history(
    tx: &mut Transaction<'_, Postgres>,
    carrier_id: &Uuid,
) -> Result<Vec<CarrierApprovalHistory>, AccessError> {
    let carrier = get_carrier_by_id(tx, carrier_id).await?;
    if carrier.is_none() {
        return Err(AccessError::NotFound {
            entity: "carrier",
            id: *carrier_id,
        });
    }
    let rows = get_history_for_carrier(tx, carrier_id).await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Local};
    use sqlx::PgPool;
    use uuid::Uuid;

    use crate::{
        core::{
            access::AccessError,
            approval::{current_status, history, record_action},
            test_utils::provision_user,
        },
        factory::carrier::CarrierFactory,
        model::carrier_approval_history::ApprovalAction,
    };

    #[sqlx::test]
    async fn test_status_follows_newest_row(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let mut db = pool.acquire().await?;
        let user = provision_user(&mut db, "manager", "password", "manager").await?;
        let mut carrier_factory = CarrierFactory::<()>::new();
        let carrier = carrier_factory.generate_one(&pool, ()).await?;

        let mut tx = pool.begin().await?;
        assert_eq!(current_status(&mut tx, &carrier.id).await.unwrap(), None);

        // When
        let t0 = Local::now().fixed_offset();
        record_action(
            &mut tx,
            &carrier.id,
            ApprovalAction::Created,
            Some(user.id),
            None,
            None,
            Some(t0),
        )
        .await
        .unwrap();
        record_action(
            &mut tx,
            &carrier.id,
            ApprovalAction::ManagerApproved,
            Some(user.id),
            Some("docs checked".to_string()),
            None,
            Some(t0 + Duration::seconds(5)),
        )
        .await
        .unwrap();
        record_action(
            &mut tx,
            &carrier.id,
            ApprovalAction::Rejected,
            Some(user.id),
            None,
            Some("insurance lapsed".to_string()),
            Some(t0 + Duration::seconds(10)),
        )
        .await
        .unwrap();

        // Expect
        let status = current_status(&mut tx, &carrier.id).await.unwrap();
        assert_eq!(status, Some(ApprovalAction::Rejected));
        let rows = history(&mut tx, &carrier.id).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].action, ApprovalAction::Rejected);
        assert_eq!(rows[2].action, ApprovalAction::Created);
        assert_eq!(rows[0].rejection_reason, Some("insurance lapsed".to_string()));
        Ok(())
    }

    #[sqlx::test]
    async fn test_record_action_unknown_carrier(pool: PgPool) -> anyhow::Result<()> {
        let mut tx = pool.begin().await?;
        let res = record_action(
            &mut tx,
            &Uuid::now_v7(),
            ApprovalAction::Created,
            None,
            None,
            None,
            None,
        )
        .await;
        assert!(matches!(
            res,
            Err(AccessError::NotFound {
                entity: "carrier",
                ..
            })
        ));
        Ok(())
    }

    #[sqlx::test]
    async fn test_record_action_unknown_user(pool: PgPool) -> anyhow::Result<()> {
        let mut carrier_factory = CarrierFactory::<()>::new();
        let carrier = carrier_factory.generate_one(&pool, ()).await?;
        let mut tx = pool.begin().await?;
        let res = record_action(
            &mut tx,
            &carrier.id,
            ApprovalAction::Created,
            Some(Uuid::now_v7()),
            None,
            None,
            None,
        )
        .await;
        assert!(matches!(
            res,
            Err(AccessError::NotFound { entity: "user", .. })
        ));
        Ok(())
    }
}
