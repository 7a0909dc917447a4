use chrono::{DateTime, FixedOffset};
use fake::Dummy;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.carrier_approval_history";

/// Carrier lifecycle actions. Rows in the history table are append-only;
/// the newest row's action is the carrier's current status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Dummy, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalAction {
    Created,
    ManagerApproved,
    AccountsApproved,
    Rejected,
    Disabled,
    Enabled,
}

impl ApprovalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalAction::Created => "created",
            ApprovalAction::ManagerApproved => "manager_approved",
            ApprovalAction::AccountsApproved => "accounts_approved",
            ApprovalAction::Rejected => "rejected",
            ApprovalAction::Disabled => "disabled",
            ApprovalAction::Enabled => "enabled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created" => Some(ApprovalAction::Created),
            "manager_approved" => Some(ApprovalAction::ManagerApproved),
            "accounts_approved" => Some(ApprovalAction::AccountsApproved),
            "rejected" => Some(ApprovalAction::Rejected),
            "disabled" => Some(ApprovalAction::Disabled),
            "enabled" => Some(ApprovalAction::Enabled),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct CarrierApprovalHistory {
    pub id: Uuid,
    pub carrier_id: Uuid,
    pub action: ApprovalAction,
    pub action_by_user_id: Option<Uuid>,
    pub action_at: DateTime<FixedOffset>,
    pub notes: Option<String>,
    pub rejection_reason: Option<String>,
}
