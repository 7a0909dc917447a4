use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.roles";

pub const DEFAULT_GUARD_NAME: &str = "back_office";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub guard_name: String,
    pub description: Option<String>,
    pub is_system_role: bool,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}
