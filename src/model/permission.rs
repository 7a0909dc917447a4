use chrono::{DateTime, FixedOffset};
use fake::Dummy;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.permissions";

/// What kind of UI surface a permission gates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Dummy, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PermissionKind {
    Feature,
    Route,
    Column,
}

impl PermissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionKind::Feature => "feature",
            PermissionKind::Route => "route",
            PermissionKind::Column => "column",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "feature" => Some(PermissionKind::Feature),
            "route" => Some(PermissionKind::Route),
            "column" => Some(PermissionKind::Column),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Dummy, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PermissionAction {
    View,
    Create,
    Update,
    Delete,
}

impl PermissionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionAction::View => "view",
            PermissionAction::Create => "create",
            PermissionAction::Update => "update",
            PermissionAction::Delete => "delete",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "view" => Some(PermissionAction::View),
            "create" => Some(PermissionAction::Create),
            "update" => Some(PermissionAction::Update),
            "delete" => Some(PermissionAction::Delete),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    #[sqlx(rename = "type")]
    pub kind: PermissionKind,
    pub module: String,
    pub resource: String,
    pub action: PermissionAction,
    pub description: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}
