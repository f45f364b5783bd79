//! Telegram bot handler tree configuration
//!
//! The dispatcher schema only parses updates; behavior lives in the route
//! handlers registered on [`crate::telegram::router::Router`], so tests drive
//! the same handlers without a Telegram connection.

pub mod commands;
mod schema;
pub mod speech;
pub mod translate;
mod types;
pub mod uploads;

pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
