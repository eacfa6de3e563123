use rocket_db_pools::{sqlx, Database};
use sqlx::migrate::{MigrateError, Migrator};

#[derive(Database)]
#[database("six_cities_db")]
pub struct SixCitiesDb(sqlx::PgPool);

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply any pending schema migrations.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}
