//! Domain models for the Random Coffee bot.

pub mod user;

pub use user::{UserId, UserProfile};
