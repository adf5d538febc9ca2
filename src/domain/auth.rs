//! Identity of the caller as carried in the bearer token.

use serde::{Deserialize, Serialize};

use crate::domain::types::{HubId, TypeConstraintError, UserId};

/// Claims decoded from the caller's bearer token.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Numeric user identifier issued by the auth service.
    pub sub: String,
    pub email: String,
    pub hub_id: i32,
    pub name: String,
    pub roles: Vec<String>,
    pub exp: usize,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> Result<UserId, TypeConstraintError> {
        let raw = self.sub.parse::<i32>().map_err(|_| {
            TypeConstraintError::InvalidValue(format!("invalid subject `{}`", self.sub))
        })?;
        UserId::new(raw)
    }

    pub fn hub_id(&self) -> Result<HubId, TypeConstraintError> {
        HubId::new(self.hub_id)
    }

    pub fn has_role(&self, role: &str) -> bool {
        check_role(role, &self.roles)
    }
}

/// Returns `true` when `role` is present in `roles`.
pub fn check_role(role: &str, roles: &[String]) -> bool {
    roles.iter().any(|r| r == role)
}
