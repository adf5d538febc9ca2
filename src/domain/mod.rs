//! Domain aggregates exposed by the service layer.

pub mod access_override;
pub mod auth;
pub mod patient;
pub mod types;
