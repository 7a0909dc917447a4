use chrono::{DateTime, FixedOffset};
use sqlx::{Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    model::{
        permission::{Permission, PermissionAction},
        role::Role,
    },
    repository::{
        permission::get_permission_by_id,
        role::{count_users_with_role, delete_role, get_role_by_id, update_role},
        role_permission::{create_role_permission, get_detail_role_permission, get_permissions_for_role},
        user::get_user_by_id,
    },
};

use super::sqlx_utils::is_unique_violation;

/// Failure kinds for access-control operations. Absence of a grant is not
/// an error: `is_authorized` answers `Ok(false)` for that, and `NotFound`
/// only for ids that do not exist.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("{entity} with id = {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PolicyViolation(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// User -> Role -> RolePermission -> Permission. The union of the single
/// role's grants; no role hierarchy, no inheritance.
pub async fn resolve_effective_permissions(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> Result<Vec<Permission>, AccessError> {
    let user = get_user_by_id(tx, user_id).await?;
    let user = user.ok_or(AccessError::NotFound {
        entity: "user",
        id: *user_id,
    })?;
    let permissions = get_permissions_for_role(tx, &user.role_id).await?;
    Ok(permissions)
}

/// Exact match on (module, resource, action). No wildcarding.
pub async fn is_authorized(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
    module: &str,
    resource: &str,
    action: PermissionAction,
) -> Result<bool, AccessError> {
    let permissions = resolve_effective_permissions(tx, user_id).await?;
    Ok(permissions
        .iter()
        .any(|p| p.module == module && p.resource == resource && p.action == action))
}

pub async fn is_system_role(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
) -> Result<bool, AccessError> {
    let role = get_role_by_id(tx, role_id).await?;
    let role = role.ok_or(AccessError::NotFound {
        entity: "role",
        id: *role_id,
    })?;
    Ok(role.is_system_role)
}

/// Guarded hard delete: system roles are never deleted, roles still held
/// by users are not deleted either. Grants cascade with the role row.
pub async fn delete_role_checked(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
) -> Result<(), AccessError> {
    let role = get_role_by_id(tx, role_id).await?;
    let role = role.ok_or(AccessError::NotFound {
        entity: "role",
        id: *role_id,
    })?;
    if role.is_system_role {
        return Err(AccessError::PolicyViolation(format!(
            "role {} is a system role and cannot be deleted",
            role.name
        )));
    }
    let dependents = count_users_with_role(tx, role_id).await?;
    if dependents > 0 {
        return Err(AccessError::Conflict(format!(
            "role {} is still assigned to {} user(s)",
            role.name, dependents
        )));
    }
    delete_role(tx, &role).await?;
    Ok(())
}

/// Guarded rename: a system role keeps its name. Description edits are
/// allowed on any role.
pub async fn rename_role_checked(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
    name: String,
    description: Option<String>,
    now: Option<DateTime<FixedOffset>>,
) -> Result<Role, AccessError> {
    let role = get_role_by_id(tx, role_id).await?;
    let mut role = role.ok_or(AccessError::NotFound {
        entity: "role",
        id: *role_id,
    })?;
    if role.is_system_role && role.name != name {
        return Err(AccessError::PolicyViolation(format!(
            "role {} is a system role and cannot be renamed",
            role.name
        )));
    }
    update_role(tx, &mut role, name, description, now).await?;
    Ok(role)
}

/// Attach a permission to a role. The storage-level unique constraint on
/// (role_id, permission_id) is the authority on duplicates; the precheck
/// only provides the friendlier message for the common case.
pub async fn grant_permission_to_role(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
    permission_id: &Uuid,
    now: Option<DateTime<FixedOffset>>,
) -> Result<(), AccessError> {
    let role = get_role_by_id(tx, role_id).await?;
    if role.is_none() {
        return Err(AccessError::NotFound {
            entity: "role",
            id: *role_id,
        });
    }
    let permission = get_permission_by_id(tx, permission_id).await?;
    if permission.is_none() {
        return Err(AccessError::NotFound {
            entity: "permission",
            id: *permission_id,
        });
    }
    let existing = get_detail_role_permission(tx, role_id, permission_id).await?;
    if existing.is_some() {
        return Err(AccessError::Conflict(format!(
            "role_permission with role_id = {}, permission_id = {} already exists",
            role_id, permission_id
        )));
    }
    match create_role_permission(tx, role_id, permission_id, now).await {
        Ok(_) => Ok(()),
        Err(err) if is_unique_violation(&err) => Err(AccessError::Conflict(format!(
            "role_permission with role_id = {}, permission_id = {} already exists",
            role_id, permission_id
        ))),
        Err(err) => Err(AccessError::Internal(err)),
    }
}

/// Grant an initial permission set in the caller's transaction; any
/// failure aborts the whole role creation with it.
pub async fn grant_permissions_to_role(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
    permission_ids: &[Uuid],
    now: Option<DateTime<FixedOffset>>,
) -> Result<(), AccessError> {
    for permission_id in permission_ids {
        grant_permission_to_role(tx, role_id, permission_id, now).await?;
    }
    Ok(())
}
