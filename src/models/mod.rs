//! Database models and configuration.

pub mod access_override;
#[cfg(feature = "server")]
pub mod config;
pub mod patient;
