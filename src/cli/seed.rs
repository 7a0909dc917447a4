use sqlx::PgPool;

use crate::{
    core::access::grant_permission_to_role,
    model::permission::{PermissionAction, PermissionKind},
    repository::{
        permission::{create_permission, get_permission_by_name},
        role::{create_role, get_role_by_name},
        role_permission::get_detail_role_permission,
    },
};

const SYSTEM_ROLES: [(&str, &str); 4] = [
    ("admin", "Full access to every back office module"),
    ("manager", "Carrier approval and dispatch oversight"),
    ("accounts", "Invoice and settlement screens"),
    ("dispatcher", "Dispatch and carrier day-to-day screens"),
];

const MODULES: [&str; 4] = ["carrier", "dispatch", "invoice", "user_admin"];

const ACTIONS: [PermissionAction; 4] = [
    PermissionAction::View,
    PermissionAction::Create,
    PermissionAction::Update,
    PermissionAction::Delete,
];

/// Provision built-in system roles and the baseline permission matrix,
/// granting the full set to admin. Rows that already exist are skipped,
/// so re-running is safe.
pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;

    for (name, description) in SYSTEM_ROLES {
        if get_role_by_name(&mut tx, name).await?.is_none() {
            create_role(
                &mut tx,
                None,
                name.to_string(),
                None,
                Some(description.to_string()),
                true,
                None,
            )
            .await?;
            tracing::info!("seeded system role {}", name);
        }
    }

    let admin = get_role_by_name(&mut tx, "admin").await?.unwrap();
    for module in MODULES {
        for action in ACTIONS {
            let name = format!("{}_list_{}", module, action.as_str());
            let permission = match get_permission_by_name(&mut tx, &name).await? {
                Some(val) => val,
                None => {
                    create_permission(
                        &mut tx,
                        None,
                        name.clone(),
                        PermissionKind::Route,
                        module.to_string(),
                        format!("{}_list", module),
                        action,
                        None,
                        None,
                    )
                    .await?
                }
            };
            if get_detail_role_permission(&mut tx, &admin.id, &permission.id)
                .await?
                .is_none()
            {
                grant_permission_to_role(&mut tx, &admin.id, &permission.id, None)
                    .await
                    .map_err(anyhow::Error::from)?;
            }
        }
    }

    tx.commit().await?;
    Ok(())
}
