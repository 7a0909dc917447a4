use chrono::Local;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::security::hash_password,
    model::user::User,
    repository::{
        self,
        role::{create_role, get_role_by_name},
    },
};

/// Provision an account holding the named role. The role is created on
/// the fly when missing.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    password: &str,
    role_name: &str,
) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;

    let role = match get_role_by_name(&mut tx, role_name).await? {
        Some(val) => val,
        None => create_role(&mut tx, None, role_name.to_string(), None, None, false, None).await?,
    };

    let hashed_password = hash_password(password).unwrap();
    let now = Local::now().fixed_offset();
    let user = User {
        id: Uuid::now_v7(),
        user_name: username.to_string(),
        email: None,
        password: hashed_password,
        role_id: role.id,
        is_active: true,
        created_at: Some(now),
        updated_at: Some(now),
    };
    repository::user::create_user(&mut tx, &user).await?;
    tx.commit().await?;
    Ok(())
}
