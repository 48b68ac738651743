//! Random Coffee bot
//!
//! Registers participants on `/start` and pairs everyone up on `/match`.
//! Any startup failure ends the process; nothing is retried.

use random_coffee::bot::Bot;
use random_coffee::database::{create_pool, run_migrations};
use random_coffee::messages::Messages;
use random_coffee::poller::UpdatePoller;
use random_coffee::repositories::UserRepository;
use random_coffee::telegram::TelegramClient;
use random_coffee::{AppConfig, AppError, AppResult};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("random_coffee={},sqlx=warn,reqwest=warn", config.log_level).into()
    });
    if config.is_production() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting Random Coffee bot...");
    info!("Environment: {}", config.environment);
    info!("Language: {}", config.locale);

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");

    let pool = create_pool(&config.database).await.map_err(|e| {
        let err = AppError::Database(e);
        if err.is_connection_error() {
            error!("Database is unreachable: {}", err);
        } else {
            error!("Failed to create database pool: {}", err);
        }
        err
    })?;

    info!(
        "Database connection pool created (max connections: {})",
        config.database.max_connections
    );

    run_migrations(&pool, None).await.map_err(|e| {
        error!("Database migration failed: {}", e);
        AppError::Database(e)
    })?;

    let store = Arc::new(UserRepository::new(pool));
    match store.count().await {
        Ok(count) => info!("Database schema ready ({} registered participants)", count),
        Err(e) => error!("Database schema ready, but counting participants failed: {}", e),
    }

    // =========================================================================
    // PLATFORM SETUP
    // =========================================================================
    let client = Arc::new(TelegramClient::new(&config.telegram)?);

    let me = client.get_me().await.map_err(|e| {
        error!("Telegram authorization failed: {}", e);
        AppError::Telegram(e)
    })?;
    info!("Authorized as @{}", me.username.as_deref().unwrap_or(&me.first_name));

    // =========================================================================
    // WORKER
    // =========================================================================
    let mut bot = Bot::new(store, client.clone(), Messages::new(config.locale));
    if let Some(username) = me.username {
        bot = bot.with_username(username);
    }

    let (sender, receiver) = mpsc::channel(config.queue_capacity);
    let poller_handle = tokio::spawn(UpdatePoller::new(client, sender).start());

    info!("Listening for commands, press Ctrl+C to stop");

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    bot.serve(receiver, poller_handle, ctrl_c).await?;

    info!("Random Coffee bot shutdown complete");
    Ok(())
}
