//! Use cases shared by the HTTP routes.
//!
//! Each function checks the caller's role, validates the request and only
//! then touches storage.

use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::{HubId, UserId};

pub mod access_overrides;
pub mod errors;
pub mod patients;

pub use errors::{ServiceError, ServiceResult};

/// Role required for any access to the service.
pub const SERVICE_ACCESS_ROLE: &str = "access";
/// Role allowed to manage patients, see every override and review them.
pub const SERVICE_ADMIN_ROLE: &str = "access_admin";

/// Fails with [`ServiceError::Unauthorized`] unless `user` has `role`.
pub fn ensure_role(user: &AuthenticatedUser, role: &str) -> ServiceResult<()> {
    if user.has_role(role) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

/// Hub and user the caller acts as. Malformed claims are treated as missing rights.
pub(crate) fn caller_scope(user: &AuthenticatedUser) -> ServiceResult<(HubId, UserId)> {
    let hub_id = user.hub_id().map_err(|_| ServiceError::Unauthorized)?;
    let user_id = user.user_id().map_err(|_| ServiceError::Unauthorized)?;
    Ok((hub_id, user_id))
}
