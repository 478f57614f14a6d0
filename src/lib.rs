pub mod accounts;
pub mod api;
pub mod auth;
pub mod config;
pub mod content;
pub mod database;
pub mod engagement;
pub mod error;
pub mod moderation;
pub mod notifications;
pub mod telemetry;
pub mod utils;
