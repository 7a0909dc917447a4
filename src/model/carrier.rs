use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.carriers";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Carrier {
    pub id: Uuid,
    pub name: String,
    pub mc_number: Option<String>,
    pub dot_number: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}
