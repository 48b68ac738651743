use crate::config::{DatabaseConfig, DatabaseTarget};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when working with the database
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to create database pool: {0}")]
    PoolCreation(sqlx::Error),

    #[error("Database query error: {0}")]
    QueryError(sqlx::Error),

    #[error("Database connection timeout")]
    ConnectionTimeout,

    #[error("Database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => DatabaseError::ConnectionTimeout,
            other => DatabaseError::QueryError(other),
        }
    }
}

/// Build connect options for the configured target.
///
/// The `POSTGRES_*` form connects without TLS, the way the bot has always
/// talked to its database. A full URL keeps whatever `sslmode` it carries.
pub fn connect_options(target: &DatabaseTarget) -> Result<PgConnectOptions, DatabaseError> {
    match target {
        DatabaseTarget::Url(url) => PgConnectOptions::from_str(url)
            .map_err(|e| DatabaseError::Config(format!("invalid DATABASE_URL: {}", e))),
        DatabaseTarget::Parts {
            host,
            port,
            user,
            password,
            name,
        } => Ok(PgConnectOptions::new()
            .host(host)
            .port(*port)
            .username(user)
            .password(password)
            .database(name)
            .ssl_mode(PgSslMode::Disable)),
    }
}

/// Create a PostgreSQL connection pool and make sure the server answers
///
/// # Returns
/// * `Ok(PgPool)` - Successfully created connection pool
/// * `Err(DatabaseError)` - Bad configuration or unreachable database
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    let options = connect_options(&config.target)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .test_before_acquire(config.test_before_acquire)
        .connect_with(options)
        .await
        .map_err(DatabaseError::PoolCreation)?;

    // Test the connection
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(DatabaseError::PoolCreation)?;

    Ok(pool)
}

/// Apply the schema.
///
/// With `None` the migrations compiled into the binary are used, otherwise
/// they are read from the given directory.
pub async fn run_migrations(
    pool: &PgPool,
    migrations_path: Option<&str>,
) -> Result<(), DatabaseError> {
    match migrations_path {
        Some(path) => {
            let migrator = sqlx::migrate::Migrator::new(Path::new(path))
                .await
                .map_err(DatabaseError::Migration)?;
            migrator.run(pool).await.map_err(DatabaseError::Migration)?;
        }
        None => {
            sqlx::migrate!("./migrations")
                .run(pool)
                .await
                .map_err(DatabaseError::Migration)?;
        }
    }

    Ok(())
}
