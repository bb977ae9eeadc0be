use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Highest schema version this build knows how to apply.
pub fn latest_version() -> Option<i64> {
    MIGRATOR.migrations.iter().map(|migration| migration.version).max()
}
