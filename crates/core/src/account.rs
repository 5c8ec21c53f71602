//! Monetization accounts and their memberships.

use crate::error::CoreError;
use crate::validation::{validate_one_of, validate_required_text};

pub const ACCOUNT_TYPE_AGENCY: &str = "agency";
pub const ACCOUNT_TYPE_TALENT: &str = "talent";
pub const ACCOUNT_TYPE_GENERAL: &str = "general";

pub const VALID_ACCOUNT_TYPES: &[&str] =
    &[ACCOUNT_TYPE_AGENCY, ACCOUNT_TYPE_TALENT, ACCOUNT_TYPE_GENERAL];

pub const MEMBER_ROLE_OWNER: &str = "owner";
pub const MEMBER_ROLE_MEMBER: &str = "member";

pub const VALID_MEMBER_ROLES: &[&str] = &[MEMBER_ROLE_OWNER, MEMBER_ROLE_MEMBER];

pub const MAX_ACCOUNT_NAME_LEN: usize = 64;

pub fn validate_account_name(name: &str) -> Result<(), CoreError> {
    validate_required_text("Account name", name, MAX_ACCOUNT_NAME_LEN)
}

pub fn validate_account_type(account_type: &str) -> Result<(), CoreError> {
    validate_one_of("account_type", account_type, VALID_ACCOUNT_TYPES)
}

pub fn validate_member_role(role: &str) -> Result<(), CoreError> {
    validate_one_of("member role", role, VALID_MEMBER_ROLES)
}

/// Refuse a membership change that would leave the account without an owner.
///
/// `current_role` is the role of the membership being changed and
/// `new_role` is `None` when the membership is being removed.
pub fn ensure_owner_remains(
    owner_count: i64,
    current_role: &str,
    new_role: Option<&str>,
) -> Result<(), CoreError> {
    let loses_owner = current_role == MEMBER_ROLE_OWNER && new_role != Some(MEMBER_ROLE_OWNER);
    if loses_owner && owner_count <= 1 {
        return Err(CoreError::Conflict(
            "Cannot remove the last owner of an account".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removing_last_owner_refused() {
        let err = ensure_owner_remains(1, MEMBER_ROLE_OWNER, None).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[test]
    fn demoting_last_owner_refused() {
        assert!(ensure_owner_remains(1, MEMBER_ROLE_OWNER, Some(MEMBER_ROLE_MEMBER)).is_err());
    }

    #[test]
    fn removing_one_of_two_owners_allowed() {
        assert!(ensure_owner_remains(2, MEMBER_ROLE_OWNER, None).is_ok());
    }

    #[test]
    fn removing_plain_member_allowed() {
        assert!(ensure_owner_remains(1, MEMBER_ROLE_MEMBER, None).is_ok());
    }

    #[test]
    fn keeping_owner_role_allowed() {
        assert!(ensure_owner_remains(1, MEMBER_ROLE_OWNER, Some(MEMBER_ROLE_OWNER)).is_ok());
    }

    #[test]
    fn account_name_validation() {
        assert!(validate_account_name("JYP Entertainment").is_ok());
        assert!(validate_account_name(" ").is_err());
        assert!(validate_account_name(&"a".repeat(65)).is_err());
    }

    #[test]
    fn account_type_validation() {
        assert!(validate_account_type(ACCOUNT_TYPE_TALENT).is_ok());
        assert!(validate_account_type("label").is_err());
    }
}
