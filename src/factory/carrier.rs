use chrono::{DateTime, FixedOffset};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::carrier::Carrier;

pub struct CarrierFactory<T: Clone> {
    modifier_one: fn(x: &Carrier, ext: T) -> Carrier,
    modifier_many: fn(x: &Carrier, idx: usize, ext: T) -> Carrier,
}

impl<T: Clone> Default for CarrierFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> CarrierFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Carrier, ext: T) -> Carrier) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Carrier, idx: usize, ext: T) -> Carrier) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Carrier> {
        let data = CarrierDummy::new();
        let data = data.generate_one();
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(
            r#"
        INSERT INTO public.carriers (id, name, mc_number, dot_number, contact_email, contact_phone, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(data.id)
        .bind(&data.name)
        .bind(&data.mc_number)
        .bind(&data.dot_number)
        .bind(&data.contact_email)
        .bind(&data.contact_phone)
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
    ) -> anyhow::Result<Vec<Carrier>> {
        let data = CarrierDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<Carrier> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.clone() {
            sqlx::query(
                r#"
            INSERT INTO public.carriers (id, name, mc_number, dot_number, contact_email, contact_phone, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
            )
            .bind(item.id)
            .bind(&item.name)
            .bind(&item.mc_number)
            .bind(&item.dot_number)
            .bind(&item.contact_email)
            .bind(&item.contact_phone)
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
struct CarrierDummy {
    pub id: Uuid,
    pub name: String,
    pub mc_number: Option<String>,
    pub dot_number: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl CarrierDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    pub fn generate_one(&self) -> Carrier {
        let dummy = Faker.fake::<CarrierDummy>();
        Carrier {
            id: dummy.id,
            name: dummy.name,
            mc_number: dummy.mc_number,
            dot_number: dummy.dot_number,
            contact_email: dummy.contact_email,
            contact_phone: dummy.contact_phone,
            created_at: dummy.created_at,
            updated_at: dummy.updated_at,
        }
    }

    pub fn generate_many(&self, num: u32) -> Vec<Carrier> {
        let mut result: Vec<Carrier> = vec![];
        for _ in 0..num {
            let dummy = Faker.fake::<Self>();
            result.push(Carrier {
                id: dummy.id,
                name: dummy.name,
                mc_number: dummy.mc_number,
                dot_number: dummy.dot_number,
                contact_email: dummy.contact_email,
                contact_phone: dummy.contact_phone,
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

    use crate::factory::carrier::CarrierFactory;

    #[sqlx::test]
    async fn test_generate_one(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = CarrierFactory::new();
        factory.generate_one(&pool, ()).await?;

        // Expect
        let num_data: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.carriers"#)
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 1);
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_many(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = CarrierFactory::new();
        factory.generate_many(&pool, 5, ()).await?;

        // Expect
        let num_data: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.carriers"#)
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 5);
        Ok(())
    }
}
