//! Flat role → permitted action lookup for the wiki.

use crate::error::CoreError;
use crate::roles::{ROLE_ADMINISTRATOR, ROLE_COLLABORATOR, ROLE_SENIOR_COLLABORATOR};

/// An action on wiki content that is subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WikiAction {
    CreateDraft,
    EditDraft,
    Submit,
    Approve,
    Reject,
    Publish,
    Translate,
}

impl WikiAction {
    pub fn as_str(self) -> &'static str {
        match self {
            WikiAction::CreateDraft => "create_draft",
            WikiAction::EditDraft => "edit_draft",
            WikiAction::Submit => "submit",
            WikiAction::Approve => "approve",
            WikiAction::Reject => "reject",
            WikiAction::Publish => "publish",
            WikiAction::Translate => "translate",
        }
    }
}

/// Whether `role` may perform `action`.
///
/// Unknown roles (including `none`) are denied everything.
pub fn can(role: &str, action: WikiAction) -> bool {
    match role {
        ROLE_ADMINISTRATOR => true,
        ROLE_SENIOR_COLLABORATOR => !matches!(action, WikiAction::Publish | WikiAction::Translate),
        ROLE_COLLABORATOR => matches!(
            action,
            WikiAction::CreateDraft | WikiAction::EditDraft | WikiAction::Submit
        ),
        _ => false,
    }
}

/// Like [`can`], but returns a `Forbidden` error naming the action.
pub fn authorize(role: &str, action: WikiAction) -> Result<(), CoreError> {
    if can(role, action) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Role '{role}' is not allowed to {}",
            action.as_str()
        )))
    }
}

/// Whether `role` may edit drafts written by other identities.
pub fn can_edit_others_drafts(role: &str) -> bool {
    matches!(role, ROLE_ADMINISTRATOR | ROLE_SENIOR_COLLABORATOR)
}
