//! Inbound request bodies and their validation.

pub mod access_override;
pub mod patient;
