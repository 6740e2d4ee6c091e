use crate::config::DatabaseConfig;
use crate::error::AppResult;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

pub type DbPool = DatabaseConnection;

pub async fn create_pool(config: &DatabaseConfig) -> AppResult<DbPool> {
    let mut options = ConnectOptions::new(config.url.clone());
    options.sqlx_logging_level(log::LevelFilter::Debug);

    if config.is_in_memory() {
        // 内存库随连接销毁，固定单连接且不回收
        let keep_alive = Duration::from_secs(60 * 60 * 24 * 365);
        options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(keep_alive)
            .max_lifetime(keep_alive);
    } else {
        options.max_connections(config.max_connections);
    }

    let pool = Database::connect(options).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &DbPool) -> AppResult<()> {
    Migrator::up(pool, None).await?;
    Ok(())
}
