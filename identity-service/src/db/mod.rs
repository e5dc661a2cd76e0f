//! PostgreSQL connection management.

use crate::config::DatabaseConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Create a PostgreSQL connection pool.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    tracing::info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.url)
        .await?;

    tracing::info!("Successfully connected to PostgreSQL");

    Ok(pool)
}

/// Apply the bundled schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Admin, AdminRole, Permissions};
    use crate::services::{Database, Repository};

    fn local_config() -> DatabaseConfig {
        DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/identity_test".to_string()),
            max_connections: 5,
            min_connections: 1,
        }
    }

    #[tokio::test]
    #[ignore] // Requires running PostgreSQL
    async fn test_admin_round_trip() {
        let pool = create_pool(&local_config()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let db = Database::new(pool);

        let admin = Admin::new(
            format!("pg-{}", uuid::Uuid::new_v4()),
            format!("{}@example.com", uuid::Uuid::new_v4()),
            "hash".into(),
            AdminRole::Manager,
            Permissions::all(),
        );
        db.insert_admin(&admin).await.unwrap();

        let stored = db.find_admin_by_id(admin.admin_id).await.unwrap().unwrap();
        assert_eq!(stored.username, admin.username);
        assert_eq!(stored.permissions(), Permissions::all());
    }
}
