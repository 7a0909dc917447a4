use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.carrier_user_assignments";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct CarrierUserAssignment {
    pub id: Uuid,
    pub carrier_id: Uuid,
    pub user_id: Uuid,
    pub assigned_by: Option<Uuid>,
    pub assigned_at: Option<DateTime<FixedOffset>>,
}
