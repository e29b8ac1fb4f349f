//! Database migration command.

use clap::Args;

use stashbox_core::config::AppConfig;
use stashbox_core::error::AppError;
use stashbox_database::DatabasePool;
use stashbox_database::connection::is_memory_url;
use stashbox_database::migration::run_migrations;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {}

/// Execute migrations
pub async fn execute(_args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    if is_memory_url(&config.database.url) {
        return Err(AppError::configuration(
            "The in-memory store has no schema to migrate",
        ));
    }

    let pool = DatabasePool::connect(&config.database).await?;
    run_migrations(pool.pool()).await?;
    pool.close().await;

    output::print_success("Migrations applied");
    Ok(())
}
