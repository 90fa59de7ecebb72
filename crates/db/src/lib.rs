pub mod memory;
pub mod mock;
pub mod models;
pub mod postgres;
pub mod schema;
pub mod seed;
pub mod storage;

pub use memory::MemStorage;
pub use postgres::PgStorage;
pub use storage::Storage;

use eyre::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}
