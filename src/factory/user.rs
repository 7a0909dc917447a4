use chrono::{DateTime, FixedOffset};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{factory::role::RoleFactory, model::user::User};

/// Inserts users behind a freshly generated role, since every user row
/// must reference one.
pub struct UserFactory<T: Clone> {
    modifier_one: fn(x: &User, ext: T) -> User,
    modifier_many: fn(x: &User, idx: usize, ext: T) -> User,
}

impl<T: Clone> Default for UserFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> UserFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &User, ext: T) -> User) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &User, idx: usize, ext: T) -> User) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<User> {
        let role = RoleFactory::<()>::new().generate_one(db, ()).await?;
        let data = UserDummy::new();
        let mut data = data.generate_one();
        data.role_id = role.id;
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(
            r#"
        INSERT INTO public.users (id, user_name, email, password, role_id, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(data.id)
        .bind(&data.user_name)
        .bind(&data.email)
        .bind(&data.password)
        .bind(data.role_id)
        .bind(data.is_active)
        .bind(data.created_at)
        .bind(data.updated_at)
        .execute(db)
        .await?;
        Ok(data.clone())
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<User>> {
        let role = RoleFactory::<()>::new().generate_one(db, ()).await?;
        let data = UserDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<User> = vec![];
        for (idx, item) in data.iter().enumerate() {
            let mut item = item.clone();
            item.role_id = role.id;
            result.push((self.modifier_many)(&item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.clone() {
            sqlx::query(
                r#"
            INSERT INTO public.users (id, user_name, email, password, role_id, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
            )
            .bind(item.id)
            .bind(&item.user_name)
            .bind(&item.email)
            .bind(&item.password)
            .bind(item.role_id)
            .bind(item.is_active)
            .bind(item.created_at)
            .bind(item.updated_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(result)
    }
}

#[allow(dead_code)]
#[derive(Debug, Default, Deserialize, Dummy, Clone)]
struct UserDummy {
    pub id: Uuid,
    pub user_name: String,
    pub email: Option<String>,
    pub password: String,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl UserDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    pub fn generate_one(&self) -> User {
        let dummy = Faker.fake::<UserDummy>();
        User {
            id: dummy.id,
            user_name: dummy.user_name,
            email: dummy.email,
            password: dummy.password,
            role_id: Uuid::nil(),
            is_active: true,
            created_at: dummy.created_at,
            updated_at: dummy.updated_at,
        }
    }

    pub fn generate_many(&self, num: u32) -> Vec<User> {
        let mut result: Vec<User> = vec![];
        for _ in 0..num {
            let dummy = Faker.fake::<Self>();
            result.push(User {
                id: dummy.id,
                user_name: dummy.user_name,
                email: dummy.email,
                password: dummy.password,
                role_id: Uuid::nil(),
                is_active: true,
                created_at: dummy.created_at,
                updated_at: dummy.updated_at,
            });
        }
        result
    }
}
