pub mod auth;
pub mod config;
pub mod plan;
pub mod tasks;
