//! Random Coffee bot library
//!
//! This module exposes the bot components for use by tests and the binary.

pub mod bot;
pub mod commands;
pub mod config;
pub mod database;
pub mod dispatcher;
pub mod error;
pub mod messages;
pub mod models;
pub mod poller;
pub mod repositories;
pub mod services;
pub mod telegram;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};
