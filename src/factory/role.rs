use chrono::{DateTime, FixedOffset};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::role::{Role, DEFAULT_GUARD_NAME};

pub struct RoleFactory<T: Clone> {
    modifier_one: fn(x: &Role, ext: T) -> Role,
    modifier_many: fn(x: &Role, idx: usize, ext: T) -> Role,
}

impl<T: Clone> Default for RoleFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> RoleFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Role, ext: T) -> Role) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Role, idx: usize, ext: T) -> Role) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Role> {
        let data = RoleDummy::new();
        let data = data.generate_one();
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(
            r#"
        INSERT INTO public.roles (id, name, guard_name, description, is_system_role, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(data.id)
        .bind(&data.name)
        .bind(&data.guard_name)
        .bind(&data.description)
        .bind(data.is_system_role)
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
    ) -> anyhow::Result<Vec<Role>> {
        let data = RoleDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<Role> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.clone() {
            sqlx::query(
                r#"
            INSERT INTO public.roles (id, name, guard_name, description, is_system_role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
            )
            .bind(item.id)
            .bind(&item.name)
            .bind(&item.guard_name)
            .bind(&item.description)
            .bind(item.is_system_role)
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
struct RoleDummy {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl RoleDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    pub fn generate_one(&self) -> Role {
        let dummy = Faker.fake::<RoleDummy>();
        Role {
            id: dummy.id,
            name: dummy.name,
            guard_name: DEFAULT_GUARD_NAME.to_string(),
            description: dummy.description,
            is_system_role: false,
            created_at: dummy.created_at,
            updated_at: dummy.updated_at,
        }
    }

    pub fn generate_many(&self, num: u32) -> Vec<Role> {
        let mut result: Vec<Role> = vec![];
        for _ in 0..num {
            let dummy = Faker.fake::<Self>();
            result.push(Role {
                id: dummy.id,
                name: dummy.name,
                guard_name: DEFAULT_GUARD_NAME.to_string(),
                description: dummy.description,
                is_system_role: false,
                created_at: dummy.created_at,
                updated_at: dummy.updated_at,
            });
        }
        result
    }
}
