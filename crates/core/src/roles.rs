//! Well-known principal role name constants.
//!
//! These must match the `CHECK` constraint on `principals.role`.

use crate::error::CoreError;
use crate::validation::validate_one_of;

pub const ROLE_ADMINISTRATOR: &str = "administrator";
pub const ROLE_SENIOR_COLLABORATOR: &str = "senior_collaborator";
pub const ROLE_COLLABORATOR: &str = "collaborator";
pub const ROLE_NONE: &str = "none";

/// All valid principal roles.
pub const VALID_ROLES: &[&str] = &[
    ROLE_ADMINISTRATOR,
    ROLE_SENIOR_COLLABORATOR,
    ROLE_COLLABORATOR,
    ROLE_NONE,
];

/// Role given to freshly registered identities.
pub const DEFAULT_ROLE: &str = ROLE_COLLABORATOR;

pub fn validate_role(role: &str) -> Result<(), CoreError> {
    validate_one_of("role", role, VALID_ROLES)
}
