use std::sync::Arc;

use chrono::Utc;
use clinicbook_api::config::ApiConfig;
use clinicbook_db::{create_pool, schema::initialize_database, seed, PgStorage};
use color_eyre::eyre::Result;
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    // Seed the built-in admin account and the rolling slot window
    let storage = Arc::new(PgStorage::new(db_pool));
    seed::seed_admin_user(storage.as_ref()).await?;
    seed::seed_slots(storage.as_ref(), Utc::now()).await?;

    // Start API server
    clinicbook_api::start_server(config, storage).await?;

    Ok(())
}
