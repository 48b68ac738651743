use crate::messages::Locale;
use std::env;
use std::time::Duration;

/// Where the database lives: an explicit URL, or the individual
/// `POSTGRES_*` parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Url(String),
    Parts {
        host: String,
        port: u16,
        user: String,
        password: String,
        name: String,
    },
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub target: DatabaseTarget,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// Telegram Bot API configuration
#[derive(Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub api_url: String,
    pub poll_timeout_secs: u64,
    pub send_timeout_secs: u64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub telegram: TelegramConfig,
    pub locale: Locale,
    pub queue_capacity: usize,
    pub log_level: String,
    pub environment: String,
}

fn from_process_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String, String> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(format!("{} environment variable is required", name)),
    }
}

fn parsed_or<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T {
    lookup(name)
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

impl DatabaseTarget {
    /// Read `DATABASE_URL`, falling back to the `POSTGRES_*` variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(&from_process_env)
    }

    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        if let Some(url) = lookup("DATABASE_URL") {
            if !url.trim().is_empty() {
                return Ok(DatabaseTarget::Url(url));
            }
        }

        let port = required(lookup, "POSTGRES_PORT")?;
        let port = port
            .parse::<u16>()
            .map_err(|_| format!("POSTGRES_PORT is not a valid port: {}", port))?;

        Ok(DatabaseTarget::Parts {
            host: required(lookup, "POSTGRES_HOST")?,
            port,
            user: required(lookup, "POSTGRES_USER")?,
            password: required(lookup, "POSTGRES_PASSWORD")?,
            name: required(lookup, "POSTGRES_DB")?,
        })
    }
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(&from_process_env)
    }

    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let target = DatabaseTarget::from_lookup(lookup)?;

        let max_connections = parsed_or(lookup, "DATABASE_MAX_CONNECTIONS", 10u32);
        let acquire_timeout_secs = parsed_or(lookup, "DATABASE_ACQUIRE_TIMEOUT_SECS", 30u64);
        let idle_timeout_secs = parsed_or(lookup, "DATABASE_IDLE_TIMEOUT_SECS", 600u64); // 10 minutes
        let max_lifetime_secs = parsed_or(lookup, "DATABASE_MAX_LIFETIME_SECS", 1800u64); // 30 minutes
        let test_before_acquire = parsed_or(lookup, "DATABASE_TEST_BEFORE_ACQUIRE", true);

        if max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            target,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
        })
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            target: DatabaseTarget::Url("postgres://localhost/random_coffee".to_string()),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl TelegramConfig {
    pub const DEFAULT_API_URL: &'static str = "https://api.telegram.org";

    /// Create Telegram config from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(&from_process_env)
    }

    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let token = required(lookup, "TELEGRAM_BOT_TOKEN")?;

        let api_url = lookup("TELEGRAM_API_URL")
            .unwrap_or_else(|| Self::DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let poll_timeout_secs = parsed_or(lookup, "TELEGRAM_POLL_TIMEOUT_SECS", 60u64);
        let send_timeout_secs = parsed_or(lookup, "TELEGRAM_SEND_TIMEOUT_SECS", 10u64);

        if send_timeout_secs == 0 {
            return Err("TELEGRAM_SEND_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            token,
            api_url,
            poll_timeout_secs,
            send_timeout_secs,
        })
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }
}

// Hand-written so the bot token never ends up in logs.
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("send_timeout_secs", &self.send_timeout_secs)
            .finish()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: Self::DEFAULT_API_URL.to_string(),
            poll_timeout_secs: 60,
            send_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(&from_process_env)
    }

    /// Same as `from_env`, reading values through `lookup`
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let database = DatabaseConfig::from_lookup(lookup)?;
        let telegram = TelegramConfig::from_lookup(lookup)?;

        let locale = match lookup("BOT_LANGUAGE") {
            Some(lang) => lang.parse::<Locale>()?,
            None => Locale::default(),
        };

        let queue_capacity = parsed_or(lookup, "UPDATE_QUEUE_CAPACITY", 100usize);
        if queue_capacity == 0 {
            return Err("UPDATE_QUEUE_CAPACITY must be greater than 0".to_string());
        }

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        Ok(Self {
            database,
            telegram,
            locale,
            queue_capacity,
            log_level: log_level.to_lowercase(),
            environment: environment.to_lowercase(),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            telegram: TelegramConfig::default(),
            locale: Locale::default(),
            queue_capacity: 100,
            log_level: "info".to_string(),
            environment: "development".to_string(),
        }
    }
}
