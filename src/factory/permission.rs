use chrono::{DateTime, FixedOffset};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::permission::{Permission, PermissionAction, PermissionKind};

pub struct PermissionFactory<T: Clone> {
    modifier_one: fn(x: &Permission, ext: T) -> Permission,
    modifier_many: fn(x: &Permission, idx: usize, ext: T) -> Permission,
}

impl<T: Clone> Default for PermissionFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> PermissionFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Permission, ext: T) -> Permission) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Permission, idx: usize, ext: T) -> Permission) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Permission> {
        let data = PermissionDummy::new();
        let data = data.generate_one();
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(
            r#"
        INSERT INTO public.permissions (id, name, type, module, resource, action, description, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(data.id)
        .bind(&data.name)
        .bind(data.kind)
        .bind(&data.module)
        .bind(&data.resource)
        .bind(data.action)
        .bind(&data.description)
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
    ) -> anyhow::Result<Vec<Permission>> {
        let data = PermissionDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<Permission> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.clone() {
            sqlx::query(
                r#"
            INSERT INTO public.permissions (id, name, type, module, resource, action, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
            )
            .bind(item.id)
            .bind(&item.name)
            .bind(item.kind)
            .bind(&item.module)
            .bind(&item.resource)
            .bind(item.action)
            .bind(&item.description)
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
#[derive(Debug, Deserialize, Dummy, Clone)]
struct PermissionDummy {
    pub id: Uuid,
    pub name: String,
    pub kind: PermissionKind,
    pub module: String,
    pub resource: String,
    pub action: PermissionAction,
    pub description: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl PermissionDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    pub fn generate_one(&self) -> Permission {
        let dummy = Faker.fake::<PermissionDummy>();
        Permission {
            id: dummy.id,
            name: dummy.name,
            kind: dummy.kind,
            module: dummy.module,
            resource: dummy.resource,
            action: dummy.action,
            description: dummy.description,
            created_at: dummy.created_at,
            updated_at: dummy.updated_at,
        }
    }

    pub fn generate_many(&self, num: u32) -> Vec<Permission> {
        let mut result: Vec<Permission> = vec![];
        for _ in 0..num {
            let dummy = Faker.fake::<Self>();
            result.push(Permission {
                id: dummy.id,
                name: dummy.name,
                kind: dummy.kind,
                module: dummy.module,
                resource: dummy.resource,
                action: dummy.action,
                description: dummy.description,
                created_at: dummy.created_at,
                updated_at: dummy.updated_at,
            });
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use crate::{
        factory::permission::PermissionFactory,
        model::permission::{Permission, PermissionAction, PermissionKind},
    };

    #[sqlx::test]
    async fn test_generate_one(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = PermissionFactory::new();
        factory.generate_one(&pool, ()).await?;

        // Expect
        let num_data: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.permissions"#)
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 1);
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_one_modified(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = PermissionFactory::<()>::new();
        factory.modified_one(|data, _| Permission {
            id: data.id,
            name: "carrier_list_view".to_string(),
            kind: PermissionKind::Route,
            module: "carrier".to_string(),
            resource: "carrier_list".to_string(),
            action: PermissionAction::View,
            description: data.description.clone(),
            created_at: data.created_at,
            updated_at: data.updated_at,
        });
        factory.generate_one(&pool, ()).await?;

        // Expect
        let res: (String, String, String, String, String) = sqlx::query_as(
            r#"SELECT name, type, module, resource, action
        FROM public.permissions"#,
        )
        .fetch_one(&pool)
        .await?;
        assert_eq!(res.0, "carrier_list_view".to_string());
        assert_eq!(res.1, "route".to_string());
        assert_eq!(res.2, "carrier".to_string());
        assert_eq!(res.3, "carrier_list".to_string());
        assert_eq!(res.4, "view".to_string());
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_many(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = PermissionFactory::new();
        factory.generate_many(&pool, 10, ()).await?;

        // Expect
        let num_data: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.permissions"#)
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 10);
        Ok(())
    }
}
