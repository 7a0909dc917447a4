use super::security::{generate_refresh_token_from_user, generate_token_from_user};
use crate::core::security::hash_password;
use crate::core::session::add_session;
use crate::model::user::User;
use crate::repository::role::{create_role, get_role_by_name};
use crate::repository::user::create_user;
use crate::settings::Config;
use chrono::Local;
use fake::{Fake, Faker};
use redis::ConnectionLike;
use sqlx::pool::PoolConnection;
use sqlx::{Acquire, Postgres};
use uuid::Uuid;

pub fn generate_random<T: fake::Dummy<fake::Faker>>() -> T {
    Faker.fake()
}

/// Insert a user holding the named role, creating the role when it does
/// not exist yet.
pub async fn provision_user(
    db: &mut PoolConnection<Postgres>,
    username: &str,
    password: &str,
    role_name: &str,
) -> anyhow::Result<User> {
    let mut tx = db.begin().await?;
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
    create_user(&mut tx, &user).await?;
    tx.commit().await?;
    Ok(user)
}

pub struct TestUser {
    pub user: User,
    pub token: String,
    pub refresh_token: String,
}

pub async fn generate_test_user<C: ConnectionLike>(
    db: &mut PoolConnection<Postgres>,
    redis_conn: &mut C,
    config: Config,
    username: &str,
    password: &str,
) -> anyhow::Result<TestUser> {
    let user = provision_user(db, username, password, "back_office").await?;

    // Generate token
    let token = generate_token_from_user(user.clone(), config.clone()).await?;
    let refresh_token = generate_refresh_token_from_user(user.clone(), config.clone()).await?;
    add_session(
        redis_conn,
        &user,
        &config,
        token.clone(),
        refresh_token.clone(),
    )?;

    Ok(TestUser {
        user,
        token,
        refresh_token,
    })
}
