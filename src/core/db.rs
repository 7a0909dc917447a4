use std::time::Duration;

use sqlx::{pool::PoolOptions, Pool, Postgres};

use crate::settings::Config;

pub async fn init_pool(config: &Config) -> Pool<Postgres> {
    PoolOptions::new()
        .min_connections(2)
        .max_connections(50)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(60))
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database")
}
